use crate::auth::authenticate;
use crate::constants::THUMBNAIL_FIELD;
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
use tubely_processing::collect_capped;

/// `POST /api/videos/{video_id}/thumbnail`
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_thumbnail"))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = authenticate(&headers, state.identity.as_ref())?;

    let video = state.ingestor.load_owned_video(video_id, user_id).await?;

    let max_bytes = state.thumbnails.max_bytes();
    check_declared_length(&headers, max_bytes)?;

    let mut multipart = multipart?;
    let field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some(THUMBNAIL_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(AppError::BadRequest(format!(
                    "Missing multipart field '{}'",
                    THUMBNAIL_FIELD
                ))
                .into())
            }
        }
    };

    let content_type = field.content_type().unwrap_or_default().to_string();
    let data = collect_capped(field.map_err(multipart_error), max_bytes).await?;

    let video = state.thumbnails.store(video, &content_type, &data).await?;

    Ok(Json(VideoResponse::from(video)))
}
