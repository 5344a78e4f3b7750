pub mod invalidation;
pub mod post_service;
pub mod profile_service;
pub mod query_client;
pub mod role_service;
pub mod search_service;
pub mod session_service;

pub use invalidation::InvalidationSet;
pub use post_service::PostService;
pub use profile_service::ProfileService;
pub use query_client::QueryClient;
pub use role_service::RoleService;
pub use search_service::SearchService;
pub use session_service::SessionService;
