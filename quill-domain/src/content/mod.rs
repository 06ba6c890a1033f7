pub mod slug;
pub mod post;
pub mod tag;
pub mod comment;

pub use post::{Post, PostStatus, NewPost, PostChanges};
pub use tag::{Tag, TagName, TagSummary};
pub use comment::{Comment, CommentStatus, CommentAuthor, CommentDraft, GuestComment, ModerationAction};

/// 内容管理相关的常量
pub mod constant {
    // Post相关
    pub const EXCERPT_LENGTH: usize = 200;
    pub const EXCERPT_ELLIPSIS: &str = "...";
    pub const FALLBACK_POST_SLUG: &str = "post";
    pub const MAX_TITLE_LENGTH: usize = 200;
    pub const MAX_IMAGE_PATH_LENGTH: usize = 255;

    // Tag相关
    pub const MAX_TAG_LENGTH: usize = 50;

    // Comment相关
    pub const MIN_COMMENT_LENGTH: usize = 5;
    pub const MIN_GUEST_NAME_LENGTH: usize = 2;
    pub const MAX_GUEST_NAME_LENGTH: usize = 100;
    pub const MAX_GUEST_EMAIL_LENGTH: usize = 120;
}
