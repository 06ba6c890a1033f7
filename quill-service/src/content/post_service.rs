use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_api::{authorize_mutation, Caller, ContentError, ContentResult, Page, PageRequest};
use quill_domain::content::post::derive_excerpt;
use quill_domain::content::{constant, slug};
use quill_domain::{NewPost, Post, PostChanges, PostStatus, Tag, TagSummary};
use quill_infra::database::{
    CommentRepository, PostQuery, PostRepository, PostRow, TagRepository, UserRepository,
};
use quill_infra::{ImageStore, StorageResultExt, UnitOfWork};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction};
use serde::Serialize;
use std::sync::Arc;

use crate::content::tag_resolver::TagResolver;

/// 唯一约束冲突后最多重试的候选slug数
const MAX_SLUG_CONFLICT_RETRIES: u32 = 5;

/// 文章投影
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub author_id: i32,
    pub author: Option<String>,
    pub tags: Vec<Tag>,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// 文章列表过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<i32>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            author_id: None,
        }
    }
}

/// 某个标签下的已发布文章
#[derive(Debug, Clone, Serialize)]
pub struct TaggedPosts {
    pub tag: Tag,
    #[serde(flatten)]
    pub posts: Page<PostView>,
}

/// Post服务trait
#[async_trait]
pub trait PostService: Send + Sync {
    /// 创建文章
    async fn create_post(&self, input: NewPost) -> ContentResult<PostView>;

    /// 部分更新文章
    async fn update_post(
        &self,
        post_id: i32,
        caller: &Caller,
        changes: PostChanges,
    ) -> ContentResult<PostView>;

    /// 删除文章，并释放其封面图
    async fn delete_post(&self, post_id: i32, caller: &Caller) -> ContentResult<()>;

    /// 分页列出文章（不含正文）
    async fn list_posts(&self, filter: PostFilter, request: PageRequest) -> ContentResult<Page<PostView>>;

    /// 分页列出某标签下的已发布文章
    async fn list_posts_by_tag(&self, tag_slug: &str, request: PageRequest) -> ContentResult<TaggedPosts>;

    async fn get_post_by_slug(&self, slug: &str, published_only: bool) -> ContentResult<PostView>;

    async fn get_post_by_id(&self, post_id: i32) -> ContentResult<PostView>;

    /// 解析（必要时创建）标签
    async fn resolve_tags_for_names(&self, names: &[String]) -> ContentResult<Vec<Tag>>;

    /// 全部标签及其已发布文章数
    async fn list_tags(&self) -> ContentResult<Vec<TagSummary>>;
}

/// 默认Post服务实现
pub struct DefaultPostService {
    db: Arc<DatabaseConnection>,
    images: Arc<dyn ImageStore>,
}

impl DefaultPostService {
    pub fn new(db: Arc<DatabaseConnection>, images: Arc<dyn ImageStore>) -> Self {
        Self { db, images }
    }

    /// 提交后释放不再引用的图片；失败只记录日志
    fn release_image(&self, post_id: i32, path: &str) {
        if let Err(e) = self.images.release(path) {
            tracing::warn!(post_id, path, error = %e, "Failed to release featured image");
        }
    }

    async fn project<C: ConnectionTrait>(
        &self,
        conn: &C,
        posts: Vec<Post>,
        include_content: bool,
    ) -> ContentResult<Vec<PostView>> {
        let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let mut author_ids: Vec<i32> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut tags = TagRepository::tags_for_posts(conn, &post_ids).await?;
        let counts = CommentRepository::count_approved_for_posts(conn, &post_ids).await?;
        let authors = UserRepository::find_by_ids(conn, &author_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                author: authors.get(&post.author_id).map(|u| u.username.clone()),
                tags: tags.remove(&post.id).unwrap_or_default(),
                comment_count: counts.get(&post.id).copied().unwrap_or(0),
                content: include_content.then(|| post.content.clone()),
                id: post.id,
                title: post.title,
                slug: post.slug,
                excerpt: post.excerpt,
                featured_image: post.featured_image,
                status: post.status,
                author_id: post.author_id,
                created_at: post.created_at,
                updated_at: post.updated_at,
                published_at: post.published_at,
            })
            .collect())
    }

    async fn project_one(&self, post: Post) -> ContentResult<PostView> {
        self.project(self.db.as_ref(), vec![post], true)
            .await?
            .pop()
            .ok_or_else(|| ContentError::storage("post projection was empty"))
    }

    async fn project_page(&self, page: Page<Post>) -> ContentResult<Page<PostView>> {
        let request = PageRequest::new(page.current_page, page.per_page);
        let total = page.total;
        let items = self.project(self.db.as_ref(), page.items, false).await?;
        Ok(Page::new(items, total, request))
    }
}

/// 标题 → slug基础部分
fn base_slug(title: &str) -> String {
    let raw = slug::slugify(title);
    if raw.is_empty() {
        constant::FALLBACK_POST_SLUG.to_string()
    } else {
        raw
    }
}

/// 以给定slug落库的写操作
#[async_trait]
trait SlugWriter: Send + Sync {
    /// 检查slug占用时需要排除的文章
    fn exclude_id(&self) -> Option<i32>;

    async fn write(&self, conn: &DatabaseTransaction, slug: String) -> ContentResult<Post>;
}

enum SlugWrite {
    Insert(PostRow),
    Update(Post),
}

#[async_trait]
impl SlugWriter for SlugWrite {
    fn exclude_id(&self) -> Option<i32> {
        match self {
            SlugWrite::Insert(_) => None,
            SlugWrite::Update(post) => Some(post.id),
        }
    }

    async fn write(&self, conn: &DatabaseTransaction, slug: String) -> ContentResult<Post> {
        match self {
            SlugWrite::Insert(row) => {
                let mut row = row.clone();
                row.slug = slug;
                PostRepository::insert(conn, row).await
            }
            SlugWrite::Update(post) => {
                let mut post = post.clone();
                post.slug = slug;
                PostRepository::update(conn, &post).await
            }
        }
    }
}

/// 线性探测 `base`, `base-1`, ... 并在保存点内写入
///
/// 预检查只是优化；唯一索引才是最终裁决，冲突时回滚保存点并尝试下一个候选。
async fn persist_with_unique_slug<W: SlugWriter>(
    uow: &UnitOfWork,
    base: &str,
    write: W,
) -> ContentResult<Post> {
    let exclude_id = write.exclude_id();
    let mut suffix = 0u32;
    let mut conflicts = 0u32;
    loop {
        let candidate = slug::candidate(base, suffix);
        if PostRepository::slug_taken(uow.conn(), &candidate, exclude_id).await? {
            suffix += 1;
            continue;
        }

        let savepoint = uow.savepoint().await?;
        match write.write(&savepoint, candidate.clone()).await {
            Ok(post) => {
                savepoint.commit().await.or_storage_failure()?;
                tracing::debug!(post_id = post.id, slug = %post.slug, "Slug allocated");
                return Ok(post);
            }
            Err(ContentError::Conflict(_)) if conflicts < MAX_SLUG_CONFLICT_RETRIES => {
                savepoint.rollback().await.or_storage_failure()?;
                conflicts += 1;
                suffix += 1;
                tracing::warn!(slug = %candidate, attempt = conflicts, "Slug taken concurrently, retrying");
            }
            Err(ContentError::Conflict(_)) => {
                savepoint.rollback().await.or_storage_failure()?;
                return Err(ContentError::conflict(format!(
                    "could not allocate a unique slug for '{}'",
                    base
                )));
            }
            Err(e) => {
                savepoint.rollback().await.or_storage_failure()?;
                return Err(e);
            }
        }
    }
}

#[async_trait]
impl PostService for DefaultPostService {
    async fn create_post(&self, input: NewPost) -> ContentResult<PostView> {
        input.validate()?;
        if UserRepository::find_by_id(self.db.as_ref(), input.author_id)
            .await?
            .is_none()
        {
            return Err(ContentError::not_found("Author"));
        }

        let now = Utc::now();
        let row = PostRow {
            title: input.title.trim().to_string(),
            slug: String::new(),
            excerpt: Some(input.resolved_excerpt()),
            featured_image: input.featured_image(),
            status: input.status,
            author_id: input.author_id,
            created_at: now,
            published_at: input.status.initial_published_at(now),
            content: input.content.clone(),
        };

        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let post = persist_with_unique_slug(&uow, &base_slug(&input.title), SlugWrite::Insert(row)).await?;
        let tags = TagResolver::resolve(&uow, &input.tags).await?;
        let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
        TagRepository::replace_for_post(uow.conn(), post.id, &tag_ids).await?;
        uow.commit().await?;

        tracing::info!(post_id = post.id, slug = %post.slug, status = %post.status, "Post created");
        self.project_one(post).await
    }

    async fn update_post(
        &self,
        post_id: i32,
        caller: &Caller,
        changes: PostChanges,
    ) -> ContentResult<PostView> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let existing = PostRepository::find_by_id(uow.conn(), post_id).await?;
        let mut post = authorize_mutation(existing, caller, "Post")?;
        changes.validate()?;

        let now = Utc::now();
        let previous_image = post.featured_image.clone();
        let mut new_slug_base = None;

        if let Some(title) = &changes.title {
            post.title = title.trim().to_string();
            let raw = base_slug(title);
            if slug::needs_regeneration(&post.slug, &raw) {
                new_slug_base = Some(raw);
            }
        }
        if let Some(content) = &changes.content {
            post.content = content.clone();
        }
        if let Some(excerpt) = changes.excerpt() {
            post.excerpt = Some(excerpt.unwrap_or_else(|| derive_excerpt(&post.content)));
        }
        if let Some(image) = changes.featured_image() {
            post.featured_image = image;
        }
        if let Some(status) = changes.status {
            if post.apply_status(status, now) {
                tracing::info!(post_id, "Post published");
            }
        }
        post.touch(now);

        let post = match new_slug_base {
            Some(base) => persist_with_unique_slug(&uow, &base, SlugWrite::Update(post)).await?,
            None => PostRepository::update(uow.conn(), &post).await?,
        };
        if let Some(names) = &changes.tags {
            let tags = TagResolver::resolve(&uow, names).await?;
            let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
            TagRepository::replace_for_post(uow.conn(), post.id, &tag_ids).await?;
        }
        uow.commit().await?;

        if let Some(old) = previous_image {
            if post.featured_image.as_deref() != Some(old.as_str()) {
                self.release_image(post.id, &old);
            }
        }

        tracing::info!(post_id, slug = %post.slug, "Post updated");
        self.project_one(post).await
    }

    async fn delete_post(&self, post_id: i32, caller: &Caller) -> ContentResult<()> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let existing = PostRepository::find_by_id(uow.conn(), post_id).await?;
        let post = authorize_mutation(existing, caller, "Post")?;
        PostRepository::delete(uow.conn(), post.id).await?;
        uow.commit().await?;

        if let Some(image) = &post.featured_image {
            self.release_image(post.id, image);
        }
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    async fn list_posts(&self, filter: PostFilter, request: PageRequest) -> ContentResult<Page<PostView>> {
        let query = PostQuery {
            status: filter.status,
            author_id: filter.author_id,
            tag_id: None,
        };
        let page = PostRepository::page(self.db.as_ref(), &query, request).await?;
        self.project_page(page).await
    }

    async fn list_posts_by_tag(&self, tag_slug: &str, request: PageRequest) -> ContentResult<TaggedPosts> {
        let tag = TagRepository::find_by_slug(self.db.as_ref(), tag_slug)
            .await?
            .ok_or_else(|| ContentError::not_found("Tag"))?;
        let query = PostQuery {
            status: Some(PostStatus::Published),
            author_id: None,
            tag_id: Some(tag.id),
        };
        let page = PostRepository::page(self.db.as_ref(), &query, request).await?;
        Ok(TaggedPosts {
            tag,
            posts: self.project_page(page).await?,
        })
    }

    async fn get_post_by_slug(&self, slug: &str, published_only: bool) -> ContentResult<PostView> {
        let post = PostRepository::find_by_slug(self.db.as_ref(), slug, published_only)
            .await?
            .ok_or_else(|| ContentError::not_found("Post"))?;
        self.project_one(post).await
    }

    async fn get_post_by_id(&self, post_id: i32) -> ContentResult<PostView> {
        let post = PostRepository::find_by_id(self.db.as_ref(), post_id)
            .await?
            .ok_or_else(|| ContentError::not_found("Post"))?;
        self.project_one(post).await
    }

    async fn resolve_tags_for_names(&self, names: &[String]) -> ContentResult<Vec<Tag>> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let tags = TagResolver::resolve(&uow, names).await?;
        uow.commit().await?;
        Ok(tags)
    }

    async fn list_tags(&self) -> ContentResult<Vec<TagSummary>> {
        TagRepository::list_with_published_counts(self.db.as_ref()).await
    }
}
