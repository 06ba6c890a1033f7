use quill_infra::{DatabaseManager, ImageStore, JwtService, LocalImageStore};
use quill_service::{
    AdminService, CommentService, DefaultAdminService, DefaultCommentService,
    DefaultPasswordService, DefaultPostService, DefaultUserService, PasswordAlgorithm,
    PasswordService, PostService, UserService,
};
use quill_web::AppState;
use std::sync::Arc;

use crate::config::Config;

fn password_algorithm(name: &str) -> PasswordAlgorithm {
    match name.to_ascii_lowercase().as_str() {
        "argon2" => PasswordAlgorithm::Argon2,
        "bcrypt" => PasswordAlgorithm::Bcrypt,
        other => {
            tracing::warn!(algorithm = other, "Unknown password algorithm, using bcrypt");
            PasswordAlgorithm::Bcrypt
        }
    }
}

/// 组装服务并构建应用状态
pub fn init_app_state(config: &Config, db_manager: &DatabaseManager) -> AppState {
    let db = db_manager.primary_db();

    let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(
        config.uploads.directory.clone(),
        config.uploads.url_prefix.clone(),
    ));

    let password_service: Arc<dyn PasswordService> = Arc::new(
        DefaultPasswordService::new(password_algorithm(&config.security.password_algorithm))
            .with_bcrypt_cost(config.security.bcrypt_cost),
    );

    let jwt_service = Arc::new(JwtService::new(
        &config.security.jwt_secret,
        config.security.jwt_issuer.clone(),
        config.security.jwt_expiration,
    ));

    let user_service: Arc<dyn UserService> = Arc::new(DefaultUserService::new(
        db.clone(),
        password_service,
        images.clone(),
        config.security.admin_registration_code.clone(),
    ));
    let post_service: Arc<dyn PostService> =
        Arc::new(DefaultPostService::new(db.clone(), images));
    let comment_service: Arc<dyn CommentService> =
        Arc::new(DefaultCommentService::new(db.clone()));
    let admin_service: Arc<dyn AdminService> = Arc::new(DefaultAdminService::new(db));

    AppState {
        jwt_service,
        user_service,
        post_service,
        comment_service,
        admin_service,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_algorithm_names() {
        assert_eq!(password_algorithm("Argon2"), PasswordAlgorithm::Argon2);
        assert_eq!(password_algorithm("bcrypt"), PasswordAlgorithm::Bcrypt);
        assert_eq!(password_algorithm("md5"), PasswordAlgorithm::Bcrypt);
    }
}
