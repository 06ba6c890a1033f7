use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_api::{
    authorize_mutation, require_admin, Caller, ContentError, ContentResult, Page, PageRequest,
};
use quill_domain::{
    Comment, CommentAuthor, CommentDraft, CommentStatus, GuestComment, ModerationAction, Post,
};
use quill_infra::database::{CommentQuery, CommentRepository, PostRepository, UserRepository};
use quill_infra::UnitOfWork;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;
use std::sync::Arc;

/// 审核视图额外暴露的字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModerationDetail {
    pub guest_email: Option<String>,
    pub author_email: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
}

/// 评论投影
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub post_id: i32,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    pub is_guest: bool,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub detail: Option<ModerationDetail>,
}

/// 评论列表过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub post_id: Option<i32>,
    pub author_id: Option<i32>,
    pub status: Option<CommentStatus>,
}

/// Comment服务trait
#[async_trait]
pub trait CommentService: Send + Sync {
    /// 访客评论，进入待审核
    async fn create_guest_comment(&self, post_id: i32, input: GuestComment) -> ContentResult<CommentView>;

    /// 已认证用户评论，自动通过
    async fn create_authored_comment(
        &self,
        post_id: i32,
        author_id: i32,
        content: &str,
    ) -> ContentResult<CommentView>;

    /// 管理员审核：`approve` 或 `reject`
    async fn moderate_comment(
        &self,
        comment_id: i32,
        caller: &Caller,
        action: &str,
    ) -> ContentResult<CommentView>;

    /// 修改内容（所有者或管理员）
    async fn update_comment(
        &self,
        comment_id: i32,
        caller: &Caller,
        content: &str,
    ) -> ContentResult<CommentView>;

    async fn delete_comment(&self, comment_id: i32, caller: &Caller) -> ContentResult<()>;

    /// 审核/所有者视图的分页列表
    async fn list_comments(
        &self,
        filter: CommentFilter,
        request: PageRequest,
    ) -> ContentResult<Page<CommentView>>;

    /// 公开视图：文章下已通过的评论
    async fn list_approved_for_post(&self, post_id: i32) -> ContentResult<Vec<CommentView>>;

    async fn pending_count(&self) -> ContentResult<u64>;
}

/// 默认Comment服务实现
pub struct DefaultCommentService {
    db: Arc<DatabaseConnection>,
}

impl DefaultCommentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 目标文章必须存在且已发布
    async fn commentable_post<C: ConnectionTrait>(conn: &C, post_id: i32) -> ContentResult<Post> {
        let post = PostRepository::find_by_id(conn, post_id)
            .await?
            .ok_or_else(|| ContentError::not_found("Post"))?;
        if !post.is_published() {
            return Err(ContentError::invalid("Cannot comment on unpublished posts"));
        }
        Ok(post)
    }

    async fn insert(&self, post_id: i32, build: impl FnOnce() -> ContentResult<CommentDraft>) -> ContentResult<Comment> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        Self::commentable_post(uow.conn(), post_id).await?;
        let draft = build()?;
        let comment = CommentRepository::insert(uow.conn(), post_id, draft, Utc::now()).await?;
        uow.commit().await?;
        tracing::info!(
            comment_id = comment.id,
            post_id,
            status = %comment.status,
            "Comment created"
        );
        Ok(comment)
    }

    async fn project<C: ConnectionTrait>(
        conn: &C,
        comments: Vec<Comment>,
        with_detail: bool,
    ) -> ContentResult<Vec<CommentView>> {
        let mut author_ids: Vec<i32> = comments.iter().filter_map(|c| c.author.user_id()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = UserRepository::find_by_ids(conn, &author_ids).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let (author_id, author_name, guest_email, author_email) = match &comment.author {
                    CommentAuthor::User { user_id } => {
                        let user = authors.get(user_id);
                        (
                            Some(*user_id),
                            user.map(|u| u.username.clone()),
                            None,
                            user.map(|u| u.email.clone()),
                        )
                    }
                    CommentAuthor::Guest { name, email } => {
                        (None, Some(name.clone()), Some(email.clone()), None)
                    }
                };
                CommentView {
                    id: comment.id,
                    post_id: comment.post_id,
                    author_id,
                    author_name,
                    is_guest: comment.author.is_guest(),
                    content: comment.content,
                    status: comment.status,
                    created_at: comment.created_at,
                    detail: with_detail.then_some(ModerationDetail {
                        guest_email,
                        author_email,
                        moderated_at: comment.moderated_at,
                    }),
                }
            })
            .collect())
    }

    async fn project_one(&self, comment: Comment, with_detail: bool) -> ContentResult<CommentView> {
        Self::project(self.db.as_ref(), vec![comment], with_detail)
            .await?
            .pop()
            .ok_or_else(|| ContentError::storage("comment projection was empty"))
    }
}

#[async_trait]
impl CommentService for DefaultCommentService {
    async fn create_guest_comment(&self, post_id: i32, input: GuestComment) -> ContentResult<CommentView> {
        let comment = self.insert(post_id, || CommentDraft::guest(&input)).await?;
        self.project_one(comment, false).await
    }

    async fn create_authored_comment(
        &self,
        post_id: i32,
        author_id: i32,
        content: &str,
    ) -> ContentResult<CommentView> {
        let comment = self
            .insert(post_id, || CommentDraft::authored(author_id, content))
            .await?;
        self.project_one(comment, false).await
    }

    async fn moderate_comment(
        &self,
        comment_id: i32,
        caller: &Caller,
        action: &str,
    ) -> ContentResult<CommentView> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let mut comment = CommentRepository::find_by_id(uow.conn(), comment_id)
            .await?
            .ok_or_else(|| ContentError::not_found("Comment"))?;
        require_admin(caller)?;
        let action: ModerationAction = action.parse()?;

        comment.moderate(action, Utc::now());
        let comment = CommentRepository::update(uow.conn(), &comment).await?;
        uow.commit().await?;

        tracing::info!(comment_id, status = %comment.status, moderator = caller.user_id, "Comment moderated");
        self.project_one(comment, true).await
    }

    async fn update_comment(
        &self,
        comment_id: i32,
        caller: &Caller,
        content: &str,
    ) -> ContentResult<CommentView> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let existing = CommentRepository::find_by_id(uow.conn(), comment_id).await?;
        let mut comment = authorize_mutation(existing, caller, "Comment")?;
        comment.edit_content(content)?;
        let comment = CommentRepository::update(uow.conn(), &comment).await?;
        uow.commit().await?;

        tracing::info!(comment_id, editor = caller.user_id, "Comment updated");
        self.project_one(comment, caller.is_admin).await
    }

    async fn delete_comment(&self, comment_id: i32, caller: &Caller) -> ContentResult<()> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        let existing = CommentRepository::find_by_id(uow.conn(), comment_id).await?;
        let comment = authorize_mutation(existing, caller, "Comment")?;
        CommentRepository::delete(uow.conn(), comment.id).await?;
        uow.commit().await?;

        tracing::info!(comment_id, "Comment deleted");
        Ok(())
    }

    async fn list_comments(
        &self,
        filter: CommentFilter,
        request: PageRequest,
    ) -> ContentResult<Page<CommentView>> {
        let query = CommentQuery {
            post_id: filter.post_id,
            author_id: filter.author_id,
            status: filter.status,
        };
        let page = CommentRepository::page(self.db.as_ref(), &query, request).await?;
        let total = page.total;
        let items = Self::project(self.db.as_ref(), page.items, true).await?;
        Ok(Page::new(items, total, request))
    }

    async fn list_approved_for_post(&self, post_id: i32) -> ContentResult<Vec<CommentView>> {
        let comments = CommentRepository::approved_for_post(self.db.as_ref(), post_id).await?;
        Self::project(self.db.as_ref(), comments, false).await
    }

    async fn pending_count(&self) -> ContentResult<u64> {
        CommentRepository::count_by_status(self.db.as_ref(), CommentStatus::Pending).await
    }
}
