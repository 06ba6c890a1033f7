use chrono::{DateTime, Utc};
use quill_api::{ContentResult, Page, PageRequest};
use quill_domain::User;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

use crate::database::entity::user;
use crate::database::error::StorageResultExt;

/// 新用户的持久化字段
#[derive(Debug, Clone)]
pub struct UserRow {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> ContentResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(conn)
            .await
            .or_storage_failure()?;
        Ok(model.map(User::from))
    }

    pub async fn find_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> ContentResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await
            .or_storage_failure()?;
        Ok(model.map(User::from))
    }

    pub async fn email_taken<C: ConnectionTrait>(conn: &C, email: &str) -> ContentResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(conn)
            .await
            .or_storage_failure()?;
        Ok(count > 0)
    }

    pub async fn username_taken<C: ConnectionTrait>(conn: &C, username: &str) -> ContentResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(conn)
            .await
            .or_storage_failure()?;
        Ok(count > 0)
    }

    /// 插入用户；email或username冲突时返回 `Conflict`
    pub async fn insert<C: ConnectionTrait>(conn: &C, row: UserRow) -> ContentResult<User> {
        let model = user::ActiveModel {
            email: Set(row.email),
            username: Set(row.username),
            password_hash: Set(row.password_hash),
            is_admin: Set(row.is_admin),
            created_at: Set(row.created_at),
            ..Default::default()
        }
        .insert(conn)
        .await
        .or_conflict("User")?;
        Ok(User::from(model))
    }

    /// 批量读取用户，用于解析作者信息
    pub async fn find_by_ids<C: ConnectionTrait>(
        conn: &C,
        ids: &[i32],
    ) -> ContentResult<HashMap<i32, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(conn)
            .await
            .or_storage_failure()?;
        Ok(models
            .into_iter()
            .map(|model| (model.id, User::from(model)))
            .collect())
    }

    /// 按注册时间倒序分页
    pub async fn page<C: ConnectionTrait>(conn: &C, request: PageRequest) -> ContentResult<Page<User>> {
        let paginator = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .paginate(conn, request.per_page);
        let total = paginator.num_items().await.or_storage_failure()?;
        let items = paginator
            .fetch_page(request.page_index())
            .await
            .or_storage_failure()?
            .into_iter()
            .map(User::from)
            .collect();
        Ok(Page::new(items, total, request))
    }

    pub async fn count<C: ConnectionTrait>(conn: &C) -> ContentResult<u64> {
        user::Entity::find().count(conn).await.or_storage_failure()
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> ContentResult<()> {
        user::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .or_storage_failure()?;
        Ok(())
    }
}
