//! Liveness endpoint.

use axum::{Router, http::StatusCode, routing::get};

use crate::state::AppState;

/// GET /ping - Answer 200 with an empty body.
async fn ping() -> StatusCode {
    StatusCode::OK
}

/// Build ping routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping() {
        assert_eq!(ping().await, StatusCode::OK);
    }
}
