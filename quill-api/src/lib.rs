pub mod error;
pub mod pagination;
pub mod security;

pub use error::{ContentError, ContentResult, ErrorKind};

pub use pagination::{Page, PageRequest, PerPageBounds};

pub use security::{authorize_mutation, is_admin, is_owner, require_admin, Caller, Owned};
