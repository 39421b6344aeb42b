use crate::auth::authenticate;
use crate::error::HttpAppError;
use crate::handlers::parse_video_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use tubely_core::VideoResponse;
use tubely_db::get_owned_video;

#[tracing::instrument(skip(state, headers), fields(operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = authenticate(&headers, state.identity.as_ref())?;

    let video = get_owned_video(state.videos.as_ref(), video_id, user_id).await?;

    Ok(Json(VideoResponse::from(video)))
}
