use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use quill_api::{require_admin, Caller, ContentResult, PageRequest, PerPageBounds};
use serde::Deserialize;
use std::convert::Infallible;
use std::str::FromStr;

use crate::error::ApiError;

/// 当前调用方提取器
/// 从请求扩展中提取认证中间件写入的调用方，缺失时返回401
pub struct CurrentCaller(pub Caller);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .map(CurrentCaller)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// 可选调用方（访客为 `None`）
pub struct OptionalCaller(pub Option<Caller>);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for OptionalCaller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalCaller(parts.extensions.get::<Caller>().copied()))
    }
}

/// 管理员调用方：未认证401，非管理员403
pub struct AdminCaller(pub Caller);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentCaller(caller) = CurrentCaller::from_request_parts(parts, state).await?;
        require_admin(&caller)?;
        Ok(AdminCaller(caller))
    }
}

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
    pub post_id: Option<i32>,
}

impl ListParams {
    pub fn page_request(&self, bounds: PerPageBounds) -> PageRequest {
        bounds.clamp(self.page, self.per_page)
    }

    /// 解析 `status` 过滤条件；空字符串视为未提供
    pub fn parsed_status<T>(&self) -> ContentResult<Option<T>>
    where
        T: FromStr<Err = quill_api::ContentError>,
    {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}
