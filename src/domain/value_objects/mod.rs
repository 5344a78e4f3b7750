pub mod post_id;
pub mod principal;
pub mod query_key;
pub mod user_role;

pub use post_id::PostId;
pub use principal::Principal;
pub use query_key::{QueryFilter, QueryKey, QueryKind};
pub use user_role::UserRole;
