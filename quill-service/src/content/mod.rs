pub mod comment_service;
pub mod post_service;
pub mod tag_resolver;

pub use comment_service::{
    CommentFilter, CommentService, CommentView, DefaultCommentService, ModerationDetail,
};
pub use post_service::{DefaultPostService, PostFilter, PostService, PostView, TaggedPosts};
pub use tag_resolver::TagResolver;
