pub mod admin_service;
pub mod content;
pub mod security;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin_service::{AdminService, DashboardStats, DefaultAdminService, UserStats};

pub use content::{
    CommentFilter, CommentService, CommentView, DefaultCommentService, DefaultPostService,
    ModerationDetail, PostFilter, PostService, PostView, TagResolver, TaggedPosts,
};

pub use security::{
    DefaultPasswordService, DefaultUserService, PasswordAlgorithm, PasswordService, UserService,
};
