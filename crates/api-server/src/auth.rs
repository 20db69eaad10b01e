use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::AppState;

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;

/// Hash a key with SHA-256 so the comparison always runs over two
/// fixed-length digests, whatever the provided key looks like.
fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

pub(crate) fn keys_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (hash_key(provided), hash_key(expected));
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Shared-secret check on every protected route.
///
/// The `Authorization` header must equal the configured key exactly: no
/// scheme prefix, no trimming. Runs before body extraction, so rejected
/// requests never reach the store or an upstream provider.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let api_key = extract_api_key(&headers)?;

    if !keys_match(api_key, &state.settings.auth_api_key) {
        tracing::warn!("Invalid API key attempted: {}", mask_api_key(api_key));
        return Err(AuthError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}

pub(crate) fn extract_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty())
        .ok_or(AuthError::MissingApiKey)
}

/// Mask API key for logging (show first 4 and last 4 characters)
pub(crate) fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

#[derive(Debug)]
pub enum AuthError {
    MissingApiKey,
    InvalidApiKey,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingApiKey => write!(f, "Missing API key"),
            AuthError::InvalidApiKey => write!(f, "Invalid API key"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "error": "Could not validate API key",
            })),
        )
            .into_response()
    }
}
