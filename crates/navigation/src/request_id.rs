//! Request ID middleware for correlating seed runs with their requests.
//!
//! Every request runs inside a `request` span carrying its ID, so the seeder's
//! per-table log lines can be traced back to the `/seed` call that caused
//! them. The ID is echoed in the X-Request-ID response header.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied ID that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Returns the client's request ID if it is usable.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let id = headers.get(&REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    if id.is_empty() || id.len() > MAX_REQUEST_ID_LEN {
        return None;
    }
    Some(id.to_string())
}

/// Middleware that tags each request with an ID, reusing the client's if sent.
pub async fn request_id_middleware(request: Request, next: Next) -> Response<Body> {
    // Blank or oversized IDs are replaced with a fresh one
    let request_id =
        incoming_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        tracing::info!("Request started");

        let mut response = next.run(request).await;

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), value);
        }

        tracing::info!(status = %response.status().as_u16(), "Request completed");

        response
    }
    .instrument(span)
    .await
}
