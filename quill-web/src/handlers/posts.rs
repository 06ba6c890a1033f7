use axum::extract::{Path, Query, State};
use axum::Json;
use quill_api::{ContentError, Page, PerPageBounds};
use quill_service::{PostFilter, PostView, TaggedPosts};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::extractors::{ListParams, OptionalCaller};
use crate::AppState;

/// 已发布文章列表
/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<PostView>>> {
    let request = params.page_request(PerPageBounds::POSTS);
    let page = state
        .post_service
        .list_posts(PostFilter::published(), request)
        .await?;
    Ok(Json(page))
}

/// 按slug获取文章
/// GET /api/posts/:slug
///
/// 草稿只对其作者可见。
pub async fn get_post(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
    Path(slug): Path<String>,
) -> ApiResult<Json<PostView>> {
    match state.post_service.get_post_by_slug(&slug, true).await {
        Ok(post) => Ok(Json(post)),
        Err(ContentError::NotFound(what)) => {
            let Some(caller) = caller else {
                return Err(ContentError::NotFound(what).into());
            };
            let post = state.post_service.get_post_by_slug(&slug, false).await?;
            if post.author_id == caller.user_id {
                Ok(Json(post))
            } else {
                Err(ContentError::NotFound(what).into())
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// 全部标签及已发布文章数
/// GET /api/posts/tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let tags = state.post_service.list_tags().await?;
    Ok(Json(json!({ "tags": tags })))
}

/// 标签下的已发布文章
/// GET /api/posts/tags/:slug
pub async fn list_posts_by_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<TaggedPosts>> {
    let request = params.page_request(PerPageBounds::POSTS);
    let tagged = state.post_service.list_posts_by_tag(&slug, request).await?;
    Ok(Json(tagged))
}
