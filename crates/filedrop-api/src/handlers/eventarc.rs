//! Receiver for Cloud Storage notifications delivered by Eventarc.
//!
//! Every delivery is acknowledged with `204 No Content`, including malformed
//! or truncated payloads.

use axum::{
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use filedrop_core::{CloudEventContext, ObjectEvent, ObjectNotification};
use tracing::{debug, instrument};

use crate::AppState;

/// Handles `POST <eventarc_path>`.
///
/// The sink's summary is the only line logged above DEBUG per request.
///
/// Reads `data.bucket` and `data.name`, hands one `ObjectEvent` to the
/// configured sink and answers `204` with an empty body. Missing fields,
/// invalid JSON and unreadable bodies do not change the response.
#[instrument(
    name = "receive_notification",
    skip_all,
    fields(
        ce_id = header_or(&headers, "ce-id", "none"),
        content_length = header_or(&headers, "content-length", "unknown"),
    )
)]
pub async fn receive_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Could not read notification body, acknowledging anyway"
            );
            Bytes::new()
        },
    };

    let notification = ObjectNotification::from_slice(&body);
    if notification.is_empty() {
        debug!(payload_size = body.len(), "Notification carries no bucket or object name");
    }

    let context = CloudEventContext::from_lookup(|name| {
        headers.get(name).and_then(|value| value.to_str().ok())
    });

    let event = ObjectEvent { notification, context, received_at: state.clock.now_utc() };
    state.sink.object_received(&event).await;

    debug!("Notification acknowledged");
    StatusCode::NO_CONTENT
}

fn header_or<'a>(headers: &'a HeaderMap, name: &str, fallback: &'a str) -> &'a str {
    headers.get(name).and_then(|value| value.to_str().ok()).unwrap_or(fallback)
}
