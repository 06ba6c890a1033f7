use async_trait::async_trait;
use chrono::Utc;
use quill_api::{require_admin, Caller, ContentError, ContentResult, Page, PageRequest};
use quill_domain::{NewUser, User};
use quill_infra::database::{CommentRepository, PostRepository, UserRepository, UserRow};
use quill_infra::{ImageStore, UnitOfWork};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::password_service::PasswordService;

/// User服务trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// 注册普通用户
    async fn register(&self, input: NewUser) -> ContentResult<User>;

    /// 使用管理员注册码注册管理员
    async fn register_admin(&self, input: NewUser, admin_code: &str) -> ContentResult<User>;

    /// 校验邮箱与密码
    async fn authenticate(&self, email: &str, password: &str) -> ContentResult<User>;

    async fn get_user(&self, user_id: i32) -> ContentResult<User>;

    async fn list_users(&self, request: PageRequest) -> ContentResult<Page<User>>;

    /// 删除用户及其全部文章和评论（仅管理员，不能删除自己）
    async fn delete_user(&self, caller: &Caller, user_id: i32) -> ContentResult<()>;
}

pub struct DefaultUserService {
    db: Arc<DatabaseConnection>,
    passwords: Arc<dyn PasswordService>,
    images: Arc<dyn ImageStore>,
    admin_registration_code: Option<String>,
}

impl DefaultUserService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        passwords: Arc<dyn PasswordService>,
        images: Arc<dyn ImageStore>,
        admin_registration_code: Option<String>,
    ) -> Self {
        Self {
            db,
            passwords,
            images,
            admin_registration_code: admin_registration_code.filter(|code| !code.is_empty()),
        }
    }

    async fn create(&self, input: NewUser, is_admin: bool) -> ContentResult<User> {
        let input = input.normalized()?;

        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        if UserRepository::email_taken(uow.conn(), &input.email).await? {
            return Err(ContentError::invalid("Email already registered"));
        }
        if UserRepository::username_taken(uow.conn(), &input.username).await? {
            return Err(ContentError::invalid("Username already taken"));
        }
        let password_hash = self
            .passwords
            .hash(&input.password)
            .await
            .map_err(|e| ContentError::storage(e.to_string()))?;

        let user = UserRepository::insert(
            uow.conn(),
            UserRow {
                email: input.email,
                username: input.username,
                password_hash,
                is_admin,
                created_at: Utc::now(),
            },
        )
        .await?;
        uow.commit().await?;

        tracing::info!(user_id = user.id, is_admin, "User registered");
        Ok(user)
    }
}

#[async_trait]
impl UserService for DefaultUserService {
    async fn register(&self, input: NewUser) -> ContentResult<User> {
        self.create(input, false).await
    }

    async fn register_admin(&self, input: NewUser, admin_code: &str) -> ContentResult<User> {
        let required = self
            .admin_registration_code
            .as_deref()
            .ok_or_else(|| ContentError::forbidden("Admin registration is disabled"))?;
        if admin_code != required {
            return Err(ContentError::forbidden("Invalid admin code"));
        }
        self.create(input, true).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> ContentResult<User> {
        let email = email.trim().to_lowercase();
        let invalid = || ContentError::invalid("Invalid email or password");

        let user = UserRepository::find_by_email(self.db.as_ref(), &email)
            .await?
            .ok_or_else(invalid)?;
        let matches = self
            .passwords
            .verify(password, &user.password_hash)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = user.id, error = %e, "Stored password hash could not be verified");
                false
            });
        if !matches {
            return Err(invalid());
        }
        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> ContentResult<User> {
        UserRepository::find_by_id(self.db.as_ref(), user_id)
            .await?
            .ok_or_else(|| ContentError::not_found("User"))
    }

    async fn list_users(&self, request: PageRequest) -> ContentResult<Page<User>> {
        UserRepository::page(self.db.as_ref(), request).await
    }

    async fn delete_user(&self, caller: &Caller, user_id: i32) -> ContentResult<()> {
        let uow = UnitOfWork::begin(self.db.as_ref()).await?;
        if UserRepository::find_by_id(uow.conn(), user_id).await?.is_none() {
            return Err(ContentError::not_found("User"));
        }
        require_admin(caller)?;
        if caller.user_id == user_id {
            return Err(ContentError::forbidden("Cannot delete your own account"));
        }

        let posts = PostRepository::featured_images_by_author(uow.conn(), user_id).await?;
        for (post_id, _) in &posts {
            PostRepository::delete(uow.conn(), *post_id).await?;
        }
        let comments = CommentRepository::delete_by_author(uow.conn(), user_id).await?;
        UserRepository::delete(uow.conn(), user_id).await?;
        uow.commit().await?;

        for (post_id, image) in posts {
            if let Some(path) = image {
                if let Err(e) = self.images.release(&path) {
                    tracing::warn!(post_id, path = %path, error = %e, "Failed to release featured image");
                }
            }
        }
        tracing::info!(user_id, deleted_by = caller.user_id, comments, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CommentFilter, CommentService, PostService};
    use crate::security::{DefaultPasswordService, PasswordAlgorithm};
    use crate::test_support::{Fixture, ADMIN_CODE};
    use quill_api::ErrorKind;
    use quill_domain::PostStatus;

    #[tokio::test]
    async fn test_register_normalizes_and_rejects_duplicates() {
        let fx = Fixture::new().await;
        let user = fx
            .users
            .register(NewUser {
                email: "  Ann@Example.COM ".to_string(),
                username: " ann ".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.username, "ann");
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "secret1");

        let err = fx.users.register(Fixture::new_user("ann")).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");

        let mut input = Fixture::new_user("other");
        input.username = "ann".to_string();
        let err = fx.users.register(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Username already taken");

        let mut input = Fixture::new_user("short");
        input.password = "123".to_string();
        let err = fx.users.register(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[tokio::test]
    async fn test_register_admin_requires_code() {
        let fx = Fixture::new().await;
        let err = fx
            .users
            .register_admin(Fixture::new_user("root"), "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied: Invalid admin code");

        let admin = fx
            .users
            .register_admin(Fixture::new_user("root"), ADMIN_CODE)
            .await
            .unwrap();
        assert!(admin.is_admin);

        let disabled = DefaultUserService::new(
            fx.db.clone(),
            Arc::new(DefaultPasswordService::new(PasswordAlgorithm::Bcrypt)),
            fx.images.clone(),
            Some(String::new()),
        );
        let err = disabled
            .register_admin(Fixture::new_user("root2"), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let fx = Fixture::new().await;
        let ann = fx.user("ann", false).await;

        let found = fx.users.authenticate(" ANN@example.com", "secret1").await.unwrap();
        assert_eq!(found.id, ann.id);

        let err = fx.users.authenticate("ann@example.com", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        let err = fx.users.authenticate("ghost@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let fx = Fixture::new().await;
        let ann = fx.user("ann", false).await;
        let bob = fx.user("bob", false).await;
        let root = fx.user("root", true).await;

        let mut input = Fixture::new_post(ann.id, "Going away", PostStatus::Published);
        input.featured_image = Some("/uploads/posts/gone.jpg".to_string());
        let post = fx.posts.create_post(input).await.unwrap();
        let kept = fx.published_post(bob.id, "Staying").await;
        fx.comments
            .create_authored_comment(post.id, bob.id, "Bob on Ann's post")
            .await
            .unwrap();
        fx.comments
            .create_authored_comment(kept.id, ann.id, "Ann on Bob's post")
            .await
            .unwrap();

        let err = fx.users.delete_user(&Caller::user(bob.id), ann.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        let err = fx.users.delete_user(&Caller::admin(root.id), root.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Access denied: Cannot delete your own account");
        let err = fx.users.delete_user(&Caller::admin(root.id), 404).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fx.users.delete_user(&Caller::admin(root.id), ann.id).await.unwrap();

        assert_eq!(fx.users.get_user(ann.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(fx.posts.get_post_by_id(post.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(fx.images.released(), vec!["/uploads/posts/gone.jpg"]);

        let remaining = fx
            .comments
            .list_comments(CommentFilter::default(), PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(remaining.total, 0);

        let users = fx.users.list_users(PageRequest::new(1, 20)).await.unwrap();
        assert_eq!(users.total, 2);
    }
}
