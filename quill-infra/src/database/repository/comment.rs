use chrono::{DateTime, Utc};
use quill_api::{ContentResult, Page, PageRequest};
use quill_domain::{Comment, CommentAuthor, CommentDraft, CommentStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

use crate::database::entity::comment;
use crate::database::error::StorageResultExt;

/// 评论列表过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentQuery {
    pub post_id: Option<i32>,
    pub author_id: Option<i32>,
    pub status: Option<CommentStatus>,
}

pub struct CommentRepository;

impl CommentRepository {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> ContentResult<Option<Comment>> {
        comment::Entity::find_by_id(id)
            .one(conn)
            .await
            .or_storage_failure()?
            .map(Comment::try_from)
            .transpose()
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        post_id: i32,
        draft: CommentDraft,
        now: DateTime<Utc>,
    ) -> ContentResult<Comment> {
        let (author_id, guest_name, guest_email) = match draft.author {
            CommentAuthor::User { user_id } => (Some(user_id), None, None),
            CommentAuthor::Guest { name, email } => (None, Some(name), Some(email)),
        };
        let model = comment::ActiveModel {
            post_id: Set(post_id),
            author_id: Set(author_id),
            guest_name: Set(guest_name),
            guest_email: Set(guest_email),
            content: Set(draft.content),
            status: Set(draft.status.as_str().to_string()),
            created_at: Set(now),
            moderated_at: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await
        .or_storage_failure()?;
        Comment::try_from(model)
    }

    /// 写回内容、状态与审核时间；作者身份不可变
    pub async fn update<C: ConnectionTrait>(conn: &C, comment: &Comment) -> ContentResult<Comment> {
        let model = comment::ActiveModel {
            id: Set(comment.id),
            content: Set(comment.content.clone()),
            status: Set(comment.status.as_str().to_string()),
            moderated_at: Set(comment.moderated_at),
            ..Default::default()
        }
        .update(conn)
        .await
        .or_storage_failure()?;
        Comment::try_from(model)
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> ContentResult<()> {
        comment::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .or_storage_failure()?;
        Ok(())
    }

    /// 按创建时间倒序分页
    pub async fn page<C: ConnectionTrait>(
        conn: &C,
        query: &CommentQuery,
        request: PageRequest,
    ) -> ContentResult<Page<Comment>> {
        let mut select = comment::Entity::find();
        if let Some(post_id) = query.post_id {
            select = select.filter(comment::Column::PostId.eq(post_id));
        }
        if let Some(author_id) = query.author_id {
            select = select.filter(comment::Column::AuthorId.eq(author_id));
        }
        if let Some(status) = query.status {
            select = select.filter(comment::Column::Status.eq(status.as_str()));
        }
        let paginator = select
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .paginate(conn, request.per_page);
        let total = paginator.num_items().await.or_storage_failure()?;
        let items = paginator
            .fetch_page(request.page_index())
            .await
            .or_storage_failure()?
            .into_iter()
            .map(Comment::try_from)
            .collect::<ContentResult<Vec<_>>>()?;
        Ok(Page::new(items, total, request))
    }

    /// 文章下已通过的评论，最新在前
    pub async fn approved_for_post<C: ConnectionTrait>(
        conn: &C,
        post_id: i32,
    ) -> ContentResult<Vec<Comment>> {
        comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Status.eq(CommentStatus::Approved.as_str()))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(conn)
            .await
            .or_storage_failure()?
            .into_iter()
            .map(Comment::try_from)
            .collect()
    }

    /// 批量统计多篇文章的已通过评论数
    pub async fn count_approved_for_posts<C: ConnectionTrait>(
        conn: &C,
        post_ids: &[i32],
    ) -> ContentResult<HashMap<i32, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = comment::Entity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids.to_vec()))
            .filter(comment::Column::Status.eq(CommentStatus::Approved.as_str()))
            .group_by(comment::Column::PostId)
            .into_tuple::<(i32, i64)>()
            .all(conn)
            .await
            .or_storage_failure()?;
        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }

    pub async fn count_by_status<C: ConnectionTrait>(
        conn: &C,
        status: CommentStatus,
    ) -> ContentResult<u64> {
        comment::Entity::find()
            .filter(comment::Column::Status.eq(status.as_str()))
            .count(conn)
            .await
            .or_storage_failure()
    }

    pub async fn count_by_author<C: ConnectionTrait>(conn: &C, author_id: i32) -> ContentResult<u64> {
        comment::Entity::find()
            .filter(comment::Column::AuthorId.eq(author_id))
            .count(conn)
            .await
            .or_storage_failure()
    }

    pub async fn delete_by_author<C: ConnectionTrait>(conn: &C, author_id: i32) -> ContentResult<u64> {
        let result = comment::Entity::delete_many()
            .filter(comment::Column::AuthorId.eq(author_id))
            .exec(conn)
            .await
            .or_storage_failure()?;
        Ok(result.rows_affected)
    }
}
