use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuillError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for QuillError {
    fn from(err: String) -> Self {
        QuillError::Internal(err)
    }
}

impl From<&str> for QuillError {
    fn from(err: &str) -> Self {
        QuillError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuillError>;
