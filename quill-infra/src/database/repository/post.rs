use chrono::{DateTime, Utc};
use quill_api::{ContentResult, Page, PageRequest};
use quill_domain::{Post, PostStatus};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::database::entity::{comment, post, post_tag};
use crate::database::error::StorageResultExt;

/// 新文章的持久化字段
#[derive(Debug, Clone)]
pub struct PostRow {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// 文章列表过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub author_id: Option<i32>,
    pub tag_id: Option<i32>,
}

pub struct PostRepository;

impl PostRepository {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> ContentResult<Option<Post>> {
        post::Entity::find_by_id(id)
            .one(conn)
            .await
            .or_storage_failure()?
            .map(Post::try_from)
            .transpose()
    }

    pub async fn find_by_slug<C: ConnectionTrait>(
        conn: &C,
        slug: &str,
        published_only: bool,
    ) -> ContentResult<Option<Post>> {
        let mut select = post::Entity::find().filter(post::Column::Slug.eq(slug));
        if published_only {
            select = select.filter(post::Column::Status.eq(PostStatus::Published.as_str()));
        }
        select
            .one(conn)
            .await
            .or_storage_failure()?
            .map(Post::try_from)
            .transpose()
    }

    /// slug是否已被其他文章占用
    pub async fn slug_taken<C: ConnectionTrait>(
        conn: &C,
        slug: &str,
        exclude_id: Option<i32>,
    ) -> ContentResult<bool> {
        let mut select = post::Entity::find().filter(post::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            select = select.filter(post::Column::Id.ne(id));
        }
        let count = select.count(conn).await.or_storage_failure()?;
        Ok(count > 0)
    }

    /// 插入文章；slug冲突时返回 `Conflict`
    pub async fn insert<C: ConnectionTrait>(conn: &C, row: PostRow) -> ContentResult<Post> {
        let model = post::ActiveModel {
            title: Set(row.title),
            slug: Set(row.slug),
            content: Set(row.content),
            excerpt: Set(row.excerpt),
            featured_image: Set(row.featured_image),
            status: Set(row.status.as_str().to_string()),
            author_id: Set(row.author_id),
            created_at: Set(row.created_at),
            updated_at: Set(row.created_at),
            published_at: Set(row.published_at),
            ..Default::default()
        }
        .insert(conn)
        .await
        .or_conflict("Post slug")?;
        Post::try_from(model)
    }

    /// 整行写回；slug冲突时返回 `Conflict`
    pub async fn update<C: ConnectionTrait>(conn: &C, post: &Post) -> ContentResult<Post> {
        let model = post::ActiveModel {
            id: Set(post.id),
            title: Set(post.title.clone()),
            slug: Set(post.slug.clone()),
            content: Set(post.content.clone()),
            excerpt: Set(post.excerpt.clone()),
            featured_image: Set(post.featured_image.clone()),
            status: Set(post.status.as_str().to_string()),
            author_id: Set(post.author_id),
            created_at: Set(post.created_at),
            updated_at: Set(post.updated_at),
            published_at: Set(post.published_at),
        }
        .update(conn)
        .await
        .or_conflict("Post slug")?;
        Post::try_from(model)
    }

    /// 删除文章及其评论、标签关联
    pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> ContentResult<()> {
        comment::Entity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(conn)
            .await
            .or_storage_failure()?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(conn)
            .await
            .or_storage_failure()?;
        post::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .or_storage_failure()?;
        Ok(())
    }

    pub async fn page<C: ConnectionTrait>(
        conn: &C,
        query: &PostQuery,
        request: PageRequest,
    ) -> ContentResult<Page<Post>> {
        let mut select = post::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(post::Column::Status.eq(status.as_str()));
        }
        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(tag_id) = query.tag_id {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(post_tag::Entity)
                        .and_where(post_tag::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            );
        }
        select = match query.status {
            Some(PostStatus::Published) => select.order_by_desc(post::Column::PublishedAt),
            _ => select.order_by_desc(post::Column::CreatedAt),
        }
        .order_by_desc(post::Column::Id);

        let paginator = select.paginate(conn, request.per_page);
        let total = paginator.num_items().await.or_storage_failure()?;
        let items = paginator
            .fetch_page(request.page_index())
            .await
            .or_storage_failure()?
            .into_iter()
            .map(Post::try_from)
            .collect::<ContentResult<Vec<_>>>()?;
        Ok(Page::new(items, total, request))
    }

    pub async fn count<C: ConnectionTrait>(conn: &C) -> ContentResult<u64> {
        post::Entity::find().count(conn).await.or_storage_failure()
    }

    pub async fn count_by_author<C: ConnectionTrait>(conn: &C, author_id: i32) -> ContentResult<u64> {
        post::Entity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(conn)
            .await
            .or_storage_failure()
    }

    /// 作者名下所有文章的id与封面图
    pub async fn featured_images_by_author<C: ConnectionTrait>(
        conn: &C,
        author_id: i32,
    ) -> ContentResult<Vec<(i32, Option<String>)>> {
        post::Entity::find()
            .select_only()
            .column(post::Column::Id)
            .column(post::Column::FeaturedImage)
            .filter(post::Column::AuthorId.eq(author_id))
            .into_tuple::<(i32, Option<String>)>()
            .all(conn)
            .await
            .or_storage_failure()
    }
}
