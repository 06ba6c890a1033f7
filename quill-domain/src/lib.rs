pub mod content;
pub mod security;

pub use security::{NewUser, User};

pub use content::{
    Post, PostStatus, NewPost, PostChanges,
    Tag, TagName, TagSummary,
    Comment, CommentStatus, CommentAuthor, CommentDraft, GuestComment, ModerationAction,
};
