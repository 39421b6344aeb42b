//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// URL prefix the local asset directory is served under
pub const ASSETS_ROUTE: &str = "/assets";

/// Multipart field carrying the video bytes
pub const VIDEO_FIELD: &str = "video";

/// Multipart field carrying the thumbnail bytes
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Allowance for multipart boundaries and part headers on top of the file
/// ceiling when checking request sizes.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Issuer expected in access tokens
pub const JWT_ISSUER: &str = "tubely-access";
