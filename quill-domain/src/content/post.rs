use chrono::{DateTime, Utc};
use quill_api::{ContentError, ContentResult, Owned};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::constant;
use super::tag::validate_tag_names;

/// 文章状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// 新建文章时的发布时间
    pub fn initial_published_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            PostStatus::Published => Some(now),
            PostStatus::Draft => None,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(ContentError::invalid(format!("Invalid post status: {}", other))),
        }
    }
}

/// Post实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Owned for Post {
    fn owner_id(&self) -> Option<i32> {
        Some(self.author_id)
    }
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// 状态迁移
    ///
    /// 首次进入 `published` 时记录 `published_at`，之后的任何状态变化都不会清除或覆盖它。
    /// 返回本次是否写入了发布时间。
    pub fn apply_status(&mut self, next: PostStatus, now: DateTime<Utc>) -> bool {
        let first_publish = next == PostStatus::Published
            && self.status != PostStatus::Published
            && self.published_at.is_none();
        if first_publish {
            self.published_at = Some(now);
        }
        self.status = next;
        first_publish
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// 默认摘要：超过长度上限时截断并追加省略号
pub fn derive_excerpt(content: &str) -> String {
    if content.chars().count() > constant::EXCERPT_LENGTH {
        let mut excerpt: String = content.chars().take(constant::EXCERPT_LENGTH).collect();
        excerpt.push_str(constant::EXCERPT_ELLIPSIS);
        excerpt
    } else {
        content.to_string()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require_text(value: &str, field: &str) -> ContentResult<()> {
    if value.trim().is_empty() {
        Err(ContentError::invalid(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

fn limit_length(value: &str, max: usize, field: &str) -> ContentResult<()> {
    if value.trim().chars().count() > max {
        Err(ContentError::invalid(format!(
            "{} must be at most {} characters",
            field, max
        )))
    } else {
        Ok(())
    }
}

fn validate_title(title: &str) -> ContentResult<()> {
    require_text(title, "Title")?;
    limit_length(title, constant::MAX_TITLE_LENGTH, "Title")
}

fn validate_image(image: Option<&str>) -> ContentResult<()> {
    match image {
        Some(path) => limit_length(path, constant::MAX_IMAGE_PATH_LENGTH, "Featured image"),
        None => Ok(()),
    }
}

/// 创建文章的输入
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
}

impl NewPost {
    pub fn validate(&self) -> ContentResult<()> {
        validate_title(&self.title)?;
        require_text(&self.content, "Content")?;
        validate_image(self.featured_image.as_deref())?;
        validate_tag_names(&self.tags)
    }

    /// 显式提供的非空摘要优先，否则由内容派生
    pub fn resolved_excerpt(&self) -> String {
        non_blank(self.excerpt.clone()).unwrap_or_else(|| derive_excerpt(&self.content))
    }

    pub fn featured_image(&self) -> Option<String> {
        non_blank(self.featured_image.clone())
    }
}

/// 显式的部分更新结构
///
/// 外层 `None` 表示不修改该字段；对可空字段，`Some(None)` 表示清空。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub excerpt: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub featured_image: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// 字段出现即为 `Some`，即便值为 `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PostChanges {
    pub fn validate(&self) -> ContentResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            require_text(content, "Content")?;
        }
        if let Some(image) = &self.featured_image {
            validate_image(image.as_deref())?;
        }
        match &self.tags {
            Some(tags) => validate_tag_names(tags),
            None => Ok(()),
        }
    }

    /// 规范化后的新封面：空白字符串视为清空
    pub fn featured_image(&self) -> Option<Option<String>> {
        self.featured_image.clone().map(non_blank)
    }

    pub fn excerpt(&self) -> Option<Option<String>> {
        self.excerpt.clone().map(non_blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quill_api::ErrorKind;

    fn draft(now: DateTime<Utc>) -> Post {
        Post {
            id: 1,
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            content: "Body".to_string(),
            excerpt: None,
            featured_image: None,
            status: PostStatus::Draft,
            author_id: 7,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert_eq!("published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        let err = "archived".parse::<PostStatus>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(PostStatus::Published.to_string(), "published");
    }

    #[test]
    fn test_first_publish_stamps_once() {
        let t0 = Utc::now();
        let mut post = draft(t0);

        assert!(post.apply_status(PostStatus::Published, t0));
        assert_eq!(post.published_at, Some(t0));

        // 已发布状态下再次发布
        assert!(!post.apply_status(PostStatus::Published, t0 + Duration::minutes(1)));
        assert_eq!(post.published_at, Some(t0));

        // 回到草稿后再发布
        post.apply_status(PostStatus::Draft, t0 + Duration::minutes(2));
        assert_eq!(post.published_at, Some(t0));
        assert!(!post.apply_status(PostStatus::Published, t0 + Duration::minutes(3)));
        assert_eq!(post.published_at, Some(t0));
        assert!(post.is_published());
    }

    #[test]
    fn test_initial_published_at() {
        let now = Utc::now();
        assert_eq!(PostStatus::Published.initial_published_at(now), Some(now));
        assert_eq!(PostStatus::Draft.initial_published_at(now), None);
    }

    #[test]
    fn test_derive_excerpt() {
        let short = "short content";
        assert_eq!(derive_excerpt(short), short);

        let long = "é".repeat(250);
        let excerpt = derive_excerpt(&long);
        assert_eq!(excerpt.chars().count(), 203);
        assert!(excerpt.ends_with("..."));

        let exact = "x".repeat(200);
        assert_eq!(derive_excerpt(&exact), exact);
    }

    #[test]
    fn test_new_post_excerpt_and_validation() {
        let mut input = NewPost {
            title: "Title".to_string(),
            content: "a".repeat(300),
            author_id: 1,
            excerpt: Some("   ".to_string()),
            tags: Vec::new(),
            featured_image: Some(String::new()),
            status: PostStatus::Draft,
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.resolved_excerpt().len(), 203);
        assert_eq!(input.featured_image(), None);

        input.excerpt = Some("Hand written".to_string());
        assert_eq!(input.resolved_excerpt(), "Hand written");

        input.title = "  ".to_string();
        assert_eq!(input.validate().unwrap_err().to_string(), "Title is required");
    }

    #[test]
    fn test_changes_deserialize_null_vs_absent() {
        let changes: PostChanges =
            serde_json::from_str(r#"{"featured_image": null, "status": "published"}"#).unwrap();
        assert_eq!(changes.featured_image, Some(None));
        assert_eq!(changes.excerpt, None);
        assert_eq!(changes.status, Some(PostStatus::Published));
        assert_eq!(changes.featured_image(), Some(None));

        let empty: PostChanges = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.title, None);
        assert_eq!(empty.tags, None);
        assert_eq!(empty.featured_image(), None);
    }

    #[test]
    fn test_changes_validation() {
        let changes = PostChanges {
            content: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(changes.validate().unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_length_limits() {
        let mut input = NewPost {
            title: "t".repeat(200),
            content: "Body".to_string(),
            author_id: 1,
            excerpt: None,
            tags: vec!["x".repeat(50)],
            featured_image: Some(format!("/uploads/{}", "i".repeat(200))),
            status: PostStatus::Draft,
        };
        assert!(input.validate().is_ok());

        input.title = "é".repeat(201);
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "Title must be at most 200 characters"
        );

        input.title = "Fine".to_string();
        input.tags.push("y".repeat(51));
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "Tag must be at most 50 characters"
        );

        let changes = PostChanges {
            featured_image: Some(Some("p".repeat(256))),
            ..Default::default()
        };
        assert_eq!(changes.validate().unwrap_err().kind(), ErrorKind::Invalid);

        let changes = PostChanges {
            title: Some("t".repeat(201)),
            ..Default::default()
        };
        assert_eq!(changes.validate().unwrap_err().kind(), ErrorKind::Invalid);
    }
}
