use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::error::StorageResultExt;
use quill_api::ContentResult;

/// 一次服务调用的工作单元
///
/// 对外只有 `commit`/`rollback` 两种效果；未提交即被丢弃时整体回滚。
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    pub async fn begin(db: &DatabaseConnection) -> ContentResult<Self> {
        let txn = db.begin().await.or_storage_failure()?;
        Ok(Self { txn })
    }

    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// 开启保存点，失败时只回滚保存点内的写入
    pub async fn savepoint(&self) -> ContentResult<DatabaseTransaction> {
        self.txn.begin().await.or_storage_failure()
    }

    pub async fn commit(self) -> ContentResult<()> {
        self.txn.commit().await.or_storage_failure()
    }

    pub async fn rollback(self) -> ContentResult<()> {
        self.txn.rollback().await.or_storage_failure()
    }
}
