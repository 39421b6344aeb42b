//! Database repositories
//
// Video records (the only entity the upload pipeline touches)
pub mod video;

pub use video::{get_owned_video, VideoRepository, VideoStore};
