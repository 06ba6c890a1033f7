use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_api::{Page, PerPageBounds};
use quill_domain::{PostChanges, User};
use quill_service::{CommentFilter, CommentView, PostFilter, PostView};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{CommentContent, CreatePostRequest};
use crate::error::ApiResult;
use crate::extractors::{AdminCaller, ListParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub action: String,
}

/// 管理后台概览
/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
) -> ApiResult<Json<Value>> {
    let user = state.user_service.get_user(caller.user_id).await?;
    let stats = state.admin_service.dashboard_stats().await?;
    Ok(Json(json!({ "user": user, "stats": stats })))
}

/// 全部文章（可按状态过滤）
/// GET /api/admin/posts
pub async fn list_posts(
    State(state): State<AppState>,
    AdminCaller(_): AdminCaller,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<PostView>>> {
    let filter = PostFilter {
        status: params.parsed_status()?,
        author_id: None,
    };
    let page = state
        .post_service
        .list_posts(filter, params.page_request(PerPageBounds::POSTS))
        .await?;
    Ok(Json(page))
}

/// GET /api/admin/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    AdminCaller(_): AdminCaller,
    Path(post_id): Path<i32>,
) -> ApiResult<Json<PostView>> {
    Ok(Json(state.post_service.get_post_by_id(post_id).await?))
}

/// POST /api/admin/posts
pub async fn create_post(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Json(input): Json<CreatePostRequest>,
) -> ApiResult<Response> {
    let post = state
        .post_service
        .create_post(input.into_new_post(caller.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Post created", "post": post }))).into_response())
}

/// PUT /api/admin/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(post_id): Path<i32>,
    Json(changes): Json<PostChanges>,
) -> ApiResult<Json<Value>> {
    let post = state.post_service.update_post(post_id, &caller, changes).await?;
    Ok(Json(json!({ "message": "Post updated", "post": post })))
}

/// DELETE /api/admin/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(post_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.post_service.delete_post(post_id, &caller).await?;
    Ok(Json(json!({ "message": "Post deleted" })))
}

/// 审核队列
/// GET /api/admin/comments
pub async fn list_comments(
    State(state): State<AppState>,
    AdminCaller(_): AdminCaller,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<CommentView>>> {
    let filter = CommentFilter {
        post_id: params.post_id,
        author_id: None,
        status: params.parsed_status()?,
    };
    let page = state
        .comment_service
        .list_comments(filter, params.page_request(PerPageBounds::COMMENTS))
        .await?;
    Ok(Json(page))
}

/// PUT /api/admin/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(comment_id): Path<i32>,
    Json(input): Json<CommentContent>,
) -> ApiResult<Json<Value>> {
    let comment = state
        .comment_service
        .update_comment(comment_id, &caller, &input.content)
        .await?;
    Ok(Json(json!({ "message": "Comment updated", "comment": comment })))
}

/// 审核评论：`approve` 或 `reject`
/// PUT /api/admin/comments/:id/moderate
pub async fn moderate_comment(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(comment_id): Path<i32>,
    Json(input): Json<ModerationRequest>,
) -> ApiResult<Json<Value>> {
    let comment = state
        .comment_service
        .moderate_comment(comment_id, &caller, &input.action)
        .await?;
    Ok(Json(json!({
        "message": format!("Comment {}", comment.status),
        "comment": comment,
    })))
}

/// DELETE /api/admin/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(comment_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.comment_service.delete_comment(comment_id, &caller).await?;
    Ok(Json(json!({ "message": "Comment deleted" })))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    AdminCaller(_): AdminCaller,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<User>>> {
    let page = state
        .user_service
        .list_users(params.page_request(PerPageBounds::USERS))
        .await?;
    Ok(Json(page))
}

/// 删除用户及其文章和评论
/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.user_service.delete_user(&caller, user_id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}
