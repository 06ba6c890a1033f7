use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_api::{ContentError, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// 路由层错误
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Content(#[from] ContentError),

    /// 缺少或无效的令牌，以及登录失败
    #[error("{0}")]
    Unauthorized(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Content(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::Invalid => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Content(ContentError::StorageFailure(detail)) => {
                tracing::error!(error = %detail, "Storage failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ContentError::not_found("Post"), StatusCode::NOT_FOUND),
            (ContentError::forbidden("nope"), StatusCode::FORBIDDEN),
            (ContentError::invalid("bad"), StatusCode::BAD_REQUEST),
            (ContentError::conflict("slug"), StatusCode::CONFLICT),
            (ContentError::storage("disk"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
        assert_eq!(
            ApiError::unauthorized("Missing token").status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_storage_detail_hidden() {
        let response = ApiError::from(ContentError::storage("connection reset")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
