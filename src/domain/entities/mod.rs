pub mod external_blob;
pub mod post;
pub mod profile;

pub use external_blob::{ExternalBlob, UploadProgress};
pub use post::{Comment, Post};
pub use profile::Profile;
