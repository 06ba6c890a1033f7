use async_trait::async_trait;
use quill_api::ContentResult;
use quill_domain::CommentStatus;
use quill_infra::database::{CommentRepository, PostRepository, UserRepository};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;

/// 管理后台统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub pending_comments: u64,
}

/// 单个用户的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_posts: u64,
    pub total_comments: u64,
}

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn dashboard_stats(&self) -> ContentResult<DashboardStats>;

    async fn user_stats(&self, user_id: i32) -> ContentResult<UserStats>;
}

pub struct DefaultAdminService {
    db: Arc<DatabaseConnection>,
}

impl DefaultAdminService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminService for DefaultAdminService {
    async fn dashboard_stats(&self) -> ContentResult<DashboardStats> {
        let conn = self.db.as_ref();
        Ok(DashboardStats {
            total_users: UserRepository::count(conn).await?,
            total_posts: PostRepository::count(conn).await?,
            pending_comments: CommentRepository::count_by_status(conn, CommentStatus::Pending).await?,
        })
    }

    async fn user_stats(&self, user_id: i32) -> ContentResult<UserStats> {
        let conn = self.db.as_ref();
        Ok(UserStats {
            total_posts: PostRepository::count_by_author(conn, user_id).await?,
            total_comments: CommentRepository::count_by_author(conn, user_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CommentService;
    use crate::test_support::Fixture;

    #[tokio::test]
    async fn test_dashboard_and_user_stats() {
        let fx = Fixture::new().await;
        let ann = fx.user("ann", false).await;
        let post = fx.published_post(ann.id, "Stats post").await;
        fx.comments
            .create_guest_comment(post.id, fx.guest("Nice stats post"))
            .await
            .unwrap();
        fx.comments
            .create_authored_comment(post.id, ann.id, "My own comment")
            .await
            .unwrap();

        let admin = DefaultAdminService::new(fx.db.clone());
        let stats = admin.dashboard_stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_users: 1,
                total_posts: 1,
                pending_comments: 1,
            }
        );

        let mine = admin.user_stats(ann.id).await.unwrap();
        assert_eq!(mine.total_posts, 1);
        assert_eq!(mine.total_comments, 1);
    }
}
