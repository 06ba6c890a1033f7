use quill_api::{ContentError, ContentResult};
use sea_orm::{DbErr, SqlErr};

/// 将存储层错误转换为内容层错误
pub trait StorageResultExt<T> {
    /// 任意存储错误 → `StorageFailure`
    fn or_storage_failure(self) -> ContentResult<T>;

    /// 唯一约束冲突 → `Conflict`，其余 → `StorageFailure`
    fn or_conflict(self, what: &str) -> ContentResult<T>;
}

impl<T> StorageResultExt<T> for Result<T, DbErr> {
    fn or_storage_failure(self) -> ContentResult<T> {
        self.map_err(|e| ContentError::storage(e.to_string()))
    }

    fn or_conflict(self, what: &str) -> ContentResult<T> {
        self.map_err(|e| {
            if is_unique_violation(&e) {
                ContentError::conflict(format!("{} already exists", what))
            } else {
                ContentError::storage(e.to_string())
            }
        })
    }
}

/// 是否为唯一约束冲突
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
