use quill_domain::{GuestComment, NewPost, NewUser, PostStatus, User};
use quill_infra::{DatabaseManager, DatabaseOptions, ImageStore};
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};

use crate::content::{DefaultCommentService, DefaultPostService, PostService, PostView};
use crate::security::{DefaultPasswordService, DefaultUserService, PasswordAlgorithm, UserService};

pub(crate) const ADMIN_CODE: &str = "let-me-in";

pub(crate) async fn memory_db() -> DatabaseConnection {
    let manager = DatabaseManager::connect(&DatabaseOptions::in_memory())
        .await
        .unwrap();
    manager.primary_db().as_ref().clone()
}

/// 记录释放请求的图片存储
#[derive(Default)]
pub(crate) struct RecordingImageStore {
    released: Mutex<Vec<String>>,
}

impl RecordingImageStore {
    pub(crate) fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

impl ImageStore for RecordingImageStore {
    fn release(&self, public_path: &str) -> anyhow::Result<()> {
        self.released.lock().unwrap().push(public_path.to_string());
        Ok(())
    }
}

pub(crate) struct Fixture {
    pub db: Arc<DatabaseConnection>,
    pub images: Arc<RecordingImageStore>,
    pub posts: DefaultPostService,
    pub comments: DefaultCommentService,
    pub users: DefaultUserService,
}

impl Fixture {
    pub(crate) async fn new() -> Self {
        let db = Arc::new(memory_db().await);
        let images = Arc::new(RecordingImageStore::default());
        let passwords =
            Arc::new(DefaultPasswordService::new(PasswordAlgorithm::Bcrypt).with_bcrypt_cost(4));
        Self {
            posts: DefaultPostService::new(db.clone(), images.clone()),
            comments: DefaultCommentService::new(db.clone()),
            users: DefaultUserService::new(
                db.clone(),
                passwords,
                images.clone(),
                Some(ADMIN_CODE.to_string()),
            ),
            db,
            images,
        }
    }

    pub(crate) fn new_user(name: &str) -> NewUser {
        NewUser {
            email: format!("{}@example.com", name),
            username: name.to_string(),
            password: "secret1".to_string(),
        }
    }

    pub(crate) async fn user(&self, name: &str, is_admin: bool) -> User {
        let input = Self::new_user(name);
        if is_admin {
            self.users.register_admin(input, ADMIN_CODE).await.unwrap()
        } else {
            self.users.register(input).await.unwrap()
        }
    }

    pub(crate) fn new_post(author_id: i32, title: &str, status: PostStatus) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: format!("Body of {}", title),
            author_id,
            excerpt: None,
            tags: Vec::new(),
            featured_image: None,
            status,
        }
    }

    pub(crate) async fn published_post(&self, author_id: i32, title: &str) -> PostView {
        self.posts
            .create_post(Self::new_post(author_id, title, PostStatus::Published))
            .await
            .unwrap()
    }

    pub(crate) async fn draft_post(&self, author_id: i32, title: &str) -> PostView {
        self.posts
            .create_post(Self::new_post(author_id, title, PostStatus::Draft))
            .await
            .unwrap()
    }

    pub(crate) fn guest(&self, content: &str) -> GuestComment {
        GuestComment {
            guest_name: "Visitor".to_string(),
            guest_email: "visitor@example.com".to_string(),
            content: content.to_string(),
        }
    }
}
