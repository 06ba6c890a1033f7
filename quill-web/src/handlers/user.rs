use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_api::{is_admin, ContentError, Page, PerPageBounds};
use quill_domain::PostChanges;
use quill_service::{CommentFilter, CommentView, PostFilter, PostView};
use serde_json::{json, Value};

use super::{CommentContent, CreatePostRequest};
use crate::error::ApiResult;
use crate::extractors::{CurrentCaller, ListParams};
use crate::AppState;

/// 当前用户的概览
/// GET /api/user/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
) -> ApiResult<Json<Value>> {
    let user = state.user_service.get_user(caller.user_id).await?;
    let stats = state.admin_service.user_stats(caller.user_id).await?;
    Ok(Json(json!({ "user": user, "stats": stats })))
}

/// 我的文章（任意状态）
/// GET /api/user/posts
pub async fn list_my_posts(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<PostView>>> {
    let filter = PostFilter {
        status: params.parsed_status()?,
        author_id: Some(caller.user_id),
    };
    let page = state
        .post_service
        .list_posts(filter, params.page_request(PerPageBounds::POSTS))
        .await?;
    Ok(Json(page))
}

/// GET /api/user/posts/:id
pub async fn get_my_post(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(post_id): Path<i32>,
) -> ApiResult<Json<PostView>> {
    let post = state.post_service.get_post_by_id(post_id).await?;
    if post.author_id != caller.user_id && !is_admin(&caller) {
        return Err(ContentError::forbidden("Post is owned by another user").into());
    }
    Ok(Json(post))
}

/// POST /api/user/posts
pub async fn create_my_post(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Json(input): Json<CreatePostRequest>,
) -> ApiResult<Response> {
    let post = state
        .post_service
        .create_post(input.into_new_post(caller.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Post created", "post": post }))).into_response())
}

/// PUT /api/user/posts/:id
pub async fn update_my_post(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(post_id): Path<i32>,
    Json(changes): Json<PostChanges>,
) -> ApiResult<Json<Value>> {
    let post = state.post_service.update_post(post_id, &caller, changes).await?;
    Ok(Json(json!({ "message": "Post updated", "post": post })))
}

/// DELETE /api/user/posts/:id
pub async fn delete_my_post(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(post_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.post_service.delete_post(post_id, &caller).await?;
    Ok(Json(json!({ "message": "Post deleted" })))
}

/// 我的评论（含审核信息）
/// GET /api/user/comments
pub async fn list_my_comments(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<CommentView>>> {
    let filter = CommentFilter {
        post_id: params.post_id,
        author_id: Some(caller.user_id),
        status: params.parsed_status()?,
    };
    let page = state
        .comment_service
        .list_comments(filter, params.page_request(PerPageBounds::COMMENTS))
        .await?;
    Ok(Json(page))
}

/// 以当前用户身份评论，自动通过
/// POST /api/user/posts/:id/comments
pub async fn create_my_comment(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(post_id): Path<i32>,
    Json(input): Json<CommentContent>,
) -> ApiResult<Response> {
    let comment = state
        .comment_service
        .create_authored_comment(post_id, caller.user_id, &input.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Comment posted", "comment": comment })),
    )
        .into_response())
}

/// PUT /api/user/comments/:id
pub async fn update_my_comment(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(comment_id): Path<i32>,
    Json(input): Json<CommentContent>,
) -> ApiResult<Json<Value>> {
    let comment = state
        .comment_service
        .update_comment(comment_id, &caller, &input.content)
        .await?;
    Ok(Json(json!({ "message": "Comment updated", "comment": comment })))
}

/// DELETE /api/user/comments/:id
pub async fn delete_my_comment(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(comment_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.comment_service.delete_comment(comment_id, &caller).await?;
    Ok(Json(json!({ "message": "Comment deleted" })))
}
