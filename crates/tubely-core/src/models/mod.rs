pub mod video;

pub use video::{AspectRatio, Video, VideoResponse};
