pub mod app_state;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod security;

pub use app_state::AppState;
pub use error::{ApiError, ApiResult};
pub use extractors::{AdminCaller, CurrentCaller, ListParams, OptionalCaller};
pub use router::create_router;
pub use security::auth_middleware;
