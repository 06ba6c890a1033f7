use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use quill_api::{Caller, ErrorKind};

use crate::{ApiError, AppState};

/// 认证中间件
/// 校验Bearer令牌并加载用户，将 [`Caller`] 注入请求扩展
///
/// 令牌缺失、无效或用户已不存在时不拒绝请求（公开端点同样经过这里），由提取器决定是否返回401；
/// 加载用户时的存储故障直接返回500。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        match state.jwt_service.verify(token) {
            Ok(user_id) => match state.user_service.get_user(user_id).await {
                Ok(user) => {
                    request.extensions_mut().insert(Caller {
                        user_id: user.id,
                        is_admin: user.is_admin,
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(user_id, "Token subject no longer exists");
                }
                Err(e) => {
                    tracing::error!(user_id, error = %e, "Failed to load token subject");
                    return ApiError::from(e).into_response();
                }
            },
            Err(e) => tracing::debug!(error = %e, "Rejected bearer token"),
        }
    }

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
