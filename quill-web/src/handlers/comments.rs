use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_domain::GuestComment;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

/// 文章下已通过的评论
/// GET /api/posts/:id/comments
pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let comments = state.comment_service.list_approved_for_post(post_id).await?;
    Ok(Json(json!({ "comments": comments })))
}

/// 访客评论，进入审核队列
/// POST /api/posts/:id/comments
pub async fn create_guest_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    Json(input): Json<GuestComment>,
) -> ApiResult<Response> {
    let comment = state
        .comment_service
        .create_guest_comment(post_id, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment submitted and awaiting moderation",
            "comment": comment,
        })),
    )
        .into_response())
}
