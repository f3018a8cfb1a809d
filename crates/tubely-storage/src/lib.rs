//! Tubely Storage Library
//!
//! Persistence targets for uploaded media behind one `Storage` contract:
//! a local filesystem directory, a volatile in-process cache and a remote object
//! store. The orchestrator only ever sees `Storage`; which backend serves a flow is
//! a configuration decision made in `factory`.
//!
//! # Object names
//!
//! Every persisted object is named by `naming::ContentName`: 32 random bytes,
//! URL-safe base64, plus an extension derived from the validated media type.

pub mod body;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod naming;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

/// Route under which the filesystem backend's objects are served.
pub const ASSETS_ROUTE: &str = "/assets";
/// Route under which cached thumbnails are served, one per owning record.
pub const CACHE_ROUTE: &str = "/api/thumbnails";

// Re-export commonly used types
pub use body::{copy_body, MediaBody};
pub use factory::{create_storage, ConfiguredStorage};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::{CachedAsset, MemoryStorage};
pub use naming::ContentName;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{PutObject, Staging, Storage, StorageError, StorageReference, StorageResult};
pub use tubely_core::StorageBackend;
