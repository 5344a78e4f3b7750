pub mod entities;
pub mod value_objects;

pub use entities::{Comment, ExternalBlob, Post, Profile, UploadProgress};
pub use value_objects::{PostId, Principal, QueryFilter, QueryKey, QueryKind, UserRole};
