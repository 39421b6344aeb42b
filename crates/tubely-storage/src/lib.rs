//! Tubely Storage Library
//!
//! Two destinations for uploaded media:
//!
//! - videos go to object storage through the `Storage` trait (`S3Storage`)
//! - thumbnails go to a local directory served by the API (`LocalAssetStorage`)
//!
//! # Storage key format
//!
//! Video keys are `{wide|tall|other}/{random-name}{ext}`. The random name is
//! 32 bytes of randomness, base64url-encoded without padding. Keys are never
//! derived from client-supplied file names. Key generation lives in `keys` so
//! every caller builds them the same way.

pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use keys::{extension_for_media_type, media_type_essence, random_asset_name, video_storage_key};
pub use local::LocalAssetStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
