use quill_api::{ContentError, ContentResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{constant, slug};

/// Tag实体
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// 带已发布文章数量的标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    #[serde(flatten)]
    pub tag: Tag,
    pub post_count: u64,
}

/// 规范化后的标签名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagName {
    pub name: String,
    pub slug: String,
}

impl TagName {
    /// 去除首尾空白并计算slug；空名称或slug为空时返回 `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return None;
        }
        let slug = slug::slugify(name);
        if slug.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            slug,
        })
    }
}

/// 超长的标签名整体拒绝，不做截断或丢弃
pub fn validate_tag_names<S: AsRef<str>>(names: &[S]) -> ContentResult<()> {
    let too_long = names
        .iter()
        .filter_map(|raw| TagName::parse(raw.as_ref()))
        .any(|tag| {
            tag.name.chars().count() > constant::MAX_TAG_LENGTH
                || tag.slug.chars().count() > constant::MAX_TAG_LENGTH
        });
    if too_long {
        Err(ContentError::invalid(format!(
            "Tag must be at most {} characters",
            constant::MAX_TAG_LENGTH
        )))
    } else {
        Ok(())
    }
}

/// 将一组原始标签名规范化，并按slug去重
///
/// 多个名称映射到同一slug时只保留第一个出现的显示名；
/// 若该slug的标签已存在，显示名以已存在的为准。
pub fn normalize_tag_names<I, S>(names: I) -> Vec<TagName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter_map(|raw| TagName::parse(raw.as_ref()))
        .filter(|tag| seen.insert(tag.slug.clone()))
        .collect()
}
