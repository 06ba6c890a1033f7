//! Slug生成
//!
//! 只负责把文本转换为URL安全的形式；唯一性由拥有该slug的服务在事务内解决。

use regex::Regex;
use std::sync::OnceLock;

fn non_slug_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s-]").expect("slug character class is a valid regex"))
}

fn separator_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-\s]+").expect("slug separator class is a valid regex"))
}

/// 文本 → slug
///
/// 小写、去除首尾空白、删除 {单词字符, 空白, 连字符} 以外的字符，
/// 再把连续的空白/连字符折叠为单个连字符。不做长度截断。
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = non_slug_chars().replace_all(lowered.trim(), "");
    separator_runs().replace_all(&stripped, "-").into_owned()
}

/// 第 `n` 个候选slug：`base`, `base-1`, `base-2`, ...
pub fn candidate(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}

/// 去掉唯一性探测追加的 `-N` 后缀
pub fn strip_numeric_suffix(slug: &str) -> &str {
    match slug.rsplit_once('-') {
        Some((head, tail))
            if !head.is_empty() && !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) =>
        {
            head
        }
        _ => slug,
    }
}

/// 标题修改后是否需要重新生成slug
///
/// 当前slug本身或去掉 `-N` 后缀后的基础部分与新标题的原始slug一致时保持不变。
/// 这是近似判断，不是内容哈希。
pub fn needs_regeneration(current_slug: &str, raw_slug: &str) -> bool {
    current_slug != raw_slug && strip_numeric_suffix(current_slug) != raw_slug
}
