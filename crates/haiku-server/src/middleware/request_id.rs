//! Request ID middleware for tracing requests.

use axum::{extract::Request, middleware::Next, response::Response};
use http::{HeaderName, HeaderValue};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use tracing::Span;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Random bytes behind each generated request id.
const REQUEST_ID_BYTES: usize = 16;

/// Generate random hex request IDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestHex;

impl MakeRequestId for MakeRequestHex {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = match haiku_core::random_token(REQUEST_ID_BYTES) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Could not generate request id");
                return None;
            }
        };
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Tower layer for request ID generation.
pub type RequestIdLayer = SetRequestIdLayer<MakeRequestHex>;

/// Create a new request ID layer.
///
/// An `x-request-id` sent by the client is kept as is.
pub fn request_id_layer() -> RequestIdLayer {
    SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestHex)
}

/// Middleware that propagates request ID to response headers.
pub async fn propagate_request_id(request: Request, next: Next) -> Response {
    let request_id = request.headers().get(REQUEST_ID_HEADER).cloned();

    let mut response = next.run(request).await;

    if let Some(id) = request_id {
        response.headers_mut().insert(REQUEST_ID_HEADER, id);
    }

    response
}

/// Span for `TraceLayer` that records the request id next to method and path.
pub fn make_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
