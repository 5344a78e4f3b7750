pub mod backend;
pub mod cache;
pub mod identity;

pub use backend::SocialBackend;
pub use cache::{QueryData, QueryStore, QueryValue};
pub use identity::{IdentityProvider, LoginStatus};
