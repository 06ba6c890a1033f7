pub mod entity;
pub mod error;
pub mod manager;
pub mod repository;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod tests;

pub use error::{is_unique_violation, StorageResultExt};
pub use manager::{DatabaseManager, DatabaseOptions};
pub use repository::{
    CommentQuery, CommentRepository, PostQuery, PostRepository, PostRow, TagRepository,
    UserRepository, UserRow,
};
pub use unit_of_work::UnitOfWork;
