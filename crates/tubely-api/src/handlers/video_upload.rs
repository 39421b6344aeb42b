use crate::auth::authenticate;
use crate::constants::VIDEO_FIELD;
use crate::error::{multipart_error, HttpAppError};
use crate::handlers::{check_declared_length, parse_video_id};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tubely_core::{AppError, VideoResponse};

/// `POST /api/videos/{video_id}/video`
///
/// Ownership is settled before the multipart body is touched, so rejected
/// callers never cause a file to be staged.
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = authenticate(&headers, state.identity.as_ref())?;

    let video = state.ingestor.load_owned_video(video_id, user_id).await?;

    check_declared_length(&headers, state.ingestor.max_upload_bytes())?;

    let mut multipart = multipart?;
    let field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some(VIDEO_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(AppError::BadRequest(format!(
                    "Missing multipart field '{}'",
                    VIDEO_FIELD
                ))
                .into())
            }
        }
    };

    let content_type = field.content_type().unwrap_or_default().to_string();
    tracing::debug!(video_id = %video_id, content_type = %content_type, "Receiving video upload");

    let video = state
        .ingestor
        .ingest(video, &content_type, field.map_err(multipart_error))
        .await?;

    Ok(Json(VideoResponse::from(video)))
}
