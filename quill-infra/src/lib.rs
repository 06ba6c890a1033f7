pub mod attachment;
pub mod database;
pub mod security;

pub use attachment::{ImageStore, LocalImageStore};
pub use database::{DatabaseManager, DatabaseOptions, StorageResultExt, UnitOfWork};
pub use security::JwtService;
