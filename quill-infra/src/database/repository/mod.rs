//! 显式的数据访问方法
//!
//! 关联数据（标签、评论数、作者）通过批量方法按需读取，不做隐式懒加载。

pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use comment::{CommentQuery, CommentRepository};
pub use post::{PostQuery, PostRepository, PostRow};
pub use tag::TagRepository;
pub use user::{UserRepository, UserRow};
