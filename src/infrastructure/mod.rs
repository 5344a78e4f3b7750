pub mod backend;
pub mod cache;
pub mod identity;

pub use backend::InMemoryBackend;
pub use cache::MemoryQueryCache;
pub use identity::StaticIdentityProvider;
