pub mod caller;
pub mod guard;

pub use caller::Caller;
pub use guard::{authorize_mutation, is_admin, is_owner, require_admin, Owned};
