pub mod password_service;
pub mod user_service;

pub use password_service::{DefaultPasswordService, PasswordAlgorithm, PasswordService};
pub use user_service::{DefaultUserService, UserService};
