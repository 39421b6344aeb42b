use crate::error::ProcessingError;
use crate::probe::{MediaInspector, VideoDimensions};
use std::path::Path;
use tubely_core::AspectRatio;

const RATIO_TOLERANCE: f64 = 0.01;
const WIDE_RATIO: f64 = 16.0 / 9.0;
const TALL_RATIO: f64 = 9.0 / 16.0;

/// Bucket dimensions into wide (16:9), tall (9:16) or other.
pub fn classify_aspect_ratio(dimensions: VideoDimensions) -> AspectRatio {
    let ratio = f64::from(dimensions.width) / f64::from(dimensions.height);

    if (ratio - WIDE_RATIO).abs() < RATIO_TOLERANCE {
        AspectRatio::Wide
    } else if (ratio - TALL_RATIO).abs() < RATIO_TOLERANCE {
        AspectRatio::Tall
    } else {
        AspectRatio::Other
    }
}

/// Inspect a staged video and classify its orientation.
pub async fn classify_video(
    inspector: &dyn MediaInspector,
    path: &Path,
) -> Result<AspectRatio, ProcessingError> {
    let dimensions = inspector.inspect(path).await?;
    let aspect = classify_aspect_ratio(dimensions);
    tracing::debug!(
        width = dimensions.width,
        height = dimensions.height,
        aspect = %aspect,
        "Classified video aspect ratio"
    );
    Ok(aspect)
}
