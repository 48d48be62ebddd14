use actix_web::{HttpResponse, http::header, web};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::auth::middleware::AuthenticatedUser;
use crate::events::ServerEvent;
use crate::state::AppState;

/// GET /api/events — server-sent events for the caller's bookings and new listings.
pub async fn stream(user: AuthenticatedUser, state: web::Data<AppState>) -> HttpResponse {
    let user_id = user.0.id;
    let rx = state.events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.concerns(user_id) => {
            Some(Ok::<web::Bytes, actix_web::Error>(event_to_bytes(&event)))
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(%user_id, "event stream lagged: {e}");
            None
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}

fn event_to_bytes(event: &ServerEvent) -> web::Bytes {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    web::Bytes::from(format!("event: update\ndata: {payload}\n\n"))
}
