use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_api::ContentError;
use quill_domain::NewUser;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminRegistration {
    #[serde(flatten)]
    pub user: NewUser,
    pub admin_code: String,
}

/// 注册
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> ApiResult<Response> {
    let user = state.user_service.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    )
        .into_response())
}

/// 管理员注册
/// POST /api/auth/register-admin
pub async fn register_admin(
    State(state): State<AppState>,
    Json(input): Json<AdminRegistration>,
) -> ApiResult<Response> {
    let user = state
        .user_service
        .register_admin(input.user, &input.admin_code)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Admin registered successfully", "user": user })),
    )
        .into_response())
}

/// 登录，返回访问令牌
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<Response> {
    let user = state
        .user_service
        .authenticate(&input.email, &input.password)
        .await
        .map_err(|e| match e {
            ContentError::Invalid(message) => ApiError::Unauthorized(message),
            other => ApiError::from(other),
        })?;

    let access_token = state.jwt_service.generate(user.id).map_err(|e| {
        ApiError::from(ContentError::storage(format!("token generation failed: {}", e)))
    })?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(json!({
        "message": "Login successful",
        "access_token": access_token,
        "expires_in": state.jwt_service.expiration(),
        "user": user,
    }))
    .into_response())
}
