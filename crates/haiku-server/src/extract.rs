//! Request extraction: strict JSON bodies and identifier path segments.
//!
//! [`StrictJson`] is a stricter sibling of `axum::Json`. It rejects bodies
//! that are not declared as `application/json`, bodies over
//! [`MAX_BODY_BYTES`], unknown fields, and anything after the first JSON
//! value. Every rejection carries a message meant for the client.

use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
};
use haiku_core::{IdError, NoteId, UserId};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::ApiError;

/// Maximum accepted request body size (1 MiB).
pub const MAX_BODY_BYTES: usize = 1_048_576;

const JSON_MEDIA_TYPE: &str = "application/json";

// ============================================================================
// Decode errors
// ============================================================================

/// Reason a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Content-Type is present and not `application/json`.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Body exceeds the size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Body is empty, malformed, or does not match the expected shape.
    #[error("{0}")]
    BadRequest(String),
}

impl DecodeError {
    fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn too_large() -> Self {
        Self::PayloadTooLarge("Request body must not be larger than 1MB".to_string())
    }

    /// HTTP status for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        match self {
            Self::UnsupportedMediaType(msg) | Self::PayloadTooLarge(msg) | Self::BadRequest(msg) => {
                msg
            }
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Check that an optional Content-Type value names `application/json`.
///
/// A missing or blank header is accepted. Parameters such as `charset` are
/// ignored.
pub fn require_json_content_type(content_type: Option<&str>) -> Result<(), DecodeError> {
    let Some(value) = content_type.filter(|v| !v.trim().is_empty()) else {
        return Ok(());
    };

    let media_type = value.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
        Ok(())
    } else {
        Err(DecodeError::UnsupportedMediaType(
            "Content-Type header is not application/json".to_string(),
        ))
    }
}

/// Decode exactly one JSON value of type `T` from `body`.
///
/// Checks run in order: content type, size, emptiness, syntax and shape,
/// then trailing data.
pub fn decode_body<T>(content_type: Option<&str>, body: &[u8], limit: usize) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    require_json_content_type(content_type)?;

    if body.len() > limit {
        return Err(DecodeError::too_large());
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::bad_request("Request body must not be empty"));
    }

    let mut de = serde_json::Deserializer::from_slice(body);
    let value: T = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let field = err.path().to_string();
        classify(body, &field, err.inner())
    })?;

    de.end().map_err(|_| {
        DecodeError::bad_request("Request body must only contain a single JSON object")
    })?;

    Ok(value)
}

fn classify(body: &[u8], field: &str, err: &serde_json::Error) -> DecodeError {
    let position = byte_offset(body, err.line(), err.column());

    match err.classify() {
        Category::Syntax => DecodeError::bad_request(format!(
            "Request body contains badly-formed JSON (at position {})",
            position
        )),
        Category::Eof => DecodeError::bad_request("Request body contains badly-formed JSON"),
        Category::Data => {
            let msg = err.to_string();
            if let Some(name) = unknown_field_name(&msg) {
                DecodeError::bad_request(format!("Request body contains unknown field \"{}\"", name))
            } else if field != "." {
                DecodeError::bad_request(format!(
                    "Request body contains an invalid value for the \"{}\" field (at position {})",
                    field, position
                ))
            } else {
                DecodeError::bad_request(format!("Request body is invalid: {}", strip_location(&msg)))
            }
        }
        Category::Io => DecodeError::bad_request("Request body could not be read"),
    }
}

/// Extract `name` from serde's "unknown field `name`, expected ..." message.
fn unknown_field_name(msg: &str) -> Option<&str> {
    let rest = msg.strip_prefix("unknown field `")?;
    rest.split('`').next()
}

/// Drop the " at line L column C" suffix serde_json appends to data errors.
fn strip_location(msg: &str) -> &str {
    msg.rfind(" at line ").map_or(msg, |idx| &msg[..idx])
}

/// Convert serde_json's 1-based line and column into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        body.iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(body.len())
    };
    (line_start + column).min(body.len())
}

// ============================================================================
// Extractors
// ============================================================================

/// JSON body extractor with strict decoding rules.
#[derive(Debug, Clone)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = match req.headers().get(CONTENT_TYPE) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| {
                        DecodeError::UnsupportedMediaType(
                            "Content-Type header is not application/json".to_string(),
                        )
                    })?
                    .to_owned(),
            ),
            None => None,
        };

        // Fail fast before buffering the body.
        require_json_content_type(content_type.as_deref())?;

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                DecodeError::too_large()
            } else {
                tracing::debug!(error = %rejection, "Failed to buffer request body");
                DecodeError::bad_request("Request body could not be read")
            }
        })?;

        decode_body(content_type.as_deref(), &body, MAX_BODY_BYTES)
            .map(StrictJson)
            .map_err(ApiError::from)
    }
}

/// Validated `{user}` path segment.
#[derive(Debug, Clone)]
pub struct UserPath(pub UserId);

impl<S> FromRequestParts<S> for UserPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(user) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(parse_path_id("user", &user)?))
    }
}

/// Validated `{user}` and `{note}` path segments.
#[derive(Debug, Clone)]
pub struct NotePath(pub UserId, pub NoteId);

impl<S> FromRequestParts<S> for NotePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((user, note)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(parse_path_id("user", &user)?, parse_path_id("note", &note)?))
    }
}

/// Parse an identifier taken from the request path.
///
/// `what` names the segment in the error message, e.g. "user" or "note".
pub fn parse_path_id<T>(what: &str, raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = IdError>,
{
    raw.parse().map_err(|e: IdError| {
        tracing::warn!(segment = what, error = %e, "Invalid id in path");
        match e {
            IdError::Empty => ApiError::BadRequest(format!("empty {} id", what)),
            other => ApiError::BadRequest(format!("invalid {} id: {}", what, other)),
        }
    })
}
