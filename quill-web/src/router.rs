use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, comments, posts, user};
use crate::security::auth_middleware;
use crate::AppState;

/// 组装全部路由
///
/// `/api/posts/:slug` 与 `/api/posts/:slug/comments` 共用同一个路径参数名；
/// 评论路由中该段是文章id。
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes())
        .route("/api/posts", get(posts::list_posts))
        .route("/api/posts/tags", get(posts::list_tags))
        .route("/api/posts/tags/:slug", get(posts::list_posts_by_tag))
        .route("/api/posts/:slug", get(posts::get_post))
        .route(
            "/api/posts/:slug/comments",
            get(comments::list_post_comments).post(comments::create_guest_comment),
        )
        .nest("/api/user", user_routes())
        .nest("/api/admin", admin_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/register-admin", post(auth::register_admin))
        .route("/login", post(auth::login))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(user::dashboard))
        .route("/posts", get(user::list_my_posts).post(user::create_my_post))
        .route(
            "/posts/:id",
            get(user::get_my_post)
                .put(user::update_my_post)
                .delete(user::delete_my_post),
        )
        .route("/posts/:id/comments", post(user::create_my_comment))
        .route("/comments", get(user::list_my_comments))
        .route(
            "/comments/:id",
            put(user::update_my_comment).delete(user::delete_my_comment),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/posts", get(admin::list_posts).post(admin::create_post))
        .route(
            "/posts/:id",
            get(admin::get_post)
                .put(admin::update_post)
                .delete(admin::delete_post),
        )
        .route("/comments", get(admin::list_comments))
        .route(
            "/comments/:id",
            put(admin::update_comment).delete(admin::delete_comment),
        )
        .route("/comments/:id/moderate", put(admin::moderate_comment))
        .route("/users", get(admin::list_users))
        .route("/users/:id", axum::routing::delete(admin::delete_user))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
