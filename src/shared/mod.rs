pub mod config;
pub mod error;
pub mod validation;

pub use config::{CacheConfig, ClientConfig, SearchConfig};
pub use error::{AppError, Result};
pub use validation::ValidationFailureKind;
