use quill_infra::JwtService;
use quill_service::{AdminService, CommentService, PostService, UserService};
use std::sync::Arc;

/// 应用状态
/// 包含所有需要的服务实例
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: Arc<JwtService>,
    pub user_service: Arc<dyn UserService>,
    pub post_service: Arc<dyn PostService>,
    pub comment_service: Arc<dyn CommentService>,
    pub admin_service: Arc<dyn AdminService>,
}
