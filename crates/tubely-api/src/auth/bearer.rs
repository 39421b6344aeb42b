use super::jwt::IdentityVerifier;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use tubely_core::AppError;
use uuid::Uuid;

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Couldn't find JWT".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed authorization header".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AppError::Unauthorized(
            "Authorization scheme must be Bearer".to_string(),
        ));
    }

    Ok(token.trim())
}

/// Resolve the calling user from request headers.
pub fn authenticate(headers: &HeaderMap, verifier: &dyn IdentityVerifier) -> Result<Uuid, AppError> {
    let token = bearer_token(headers)?;
    verifier.verify(token)
}
