pub mod admin;
pub mod auth;
pub mod comments;
pub mod posts;
pub mod user;

use quill_domain::{NewPost, PostStatus};
use serde::Deserialize;

/// 创建文章请求体
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
}

impl CreatePostRequest {
    pub fn into_new_post(self, author_id: i32) -> NewPost {
        NewPost {
            title: self.title,
            content: self.content,
            author_id,
            excerpt: self.excerpt,
            tags: self.tags,
            featured_image: self.featured_image,
            status: self.status,
        }
    }
}

/// 只包含正文的评论请求体
#[derive(Debug, Deserialize)]
pub struct CommentContent {
    pub content: String,
}
