//! Shared key and file-name generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use tubely_core::AspectRatio;

const RANDOM_NAME_BYTES: usize = 32;

/// Random, URL-safe file name (no extension).
pub fn random_asset_name() -> String {
    let mut bytes = [0u8; RANDOM_NAME_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Lower-cased media type with any parameters removed.
///
/// `"Video/MP4; codecs=avc1"` becomes `"video/mp4"`.
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn extension_for_media_type(content_type: &str) -> &'static str {
    match media_type_essence(content_type).as_str() {
        "video/mp4" => ".mp4",
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        _ => ".bin",
    }
}

/// Object key for a video: `{aspect-prefix}/{random-name}{ext}`.
pub fn video_storage_key(aspect: AspectRatio, content_type: &str) -> String {
    format!(
        "{}/{}{}",
        aspect.prefix(),
        random_asset_name(),
        extension_for_media_type(content_type)
    )
}
