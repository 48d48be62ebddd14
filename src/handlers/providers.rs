use actix_web::{HttpResponse, Responder, ResponseError, web};
use uuid::Uuid;

use crate::auth::authorization::require_provider;
use crate::auth::middleware::AuthenticatedUser;
use crate::bookings;
use crate::state::AppState;

/// GET /api/providers/{id}/services — a provider's active listings.
pub async fn services(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.catalog.by_provider(path.into_inner()).await {
        Ok(services) => HttpResponse::Ok().json(services),
        Err(e) => e.error_response(),
    }
}

/// GET /api/providers/me/stats — dashboard figures for the calling provider.
pub async fn my_stats(user: AuthenticatedUser, state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = require_provider(&user.0) {
        return e.error_response();
    }

    let today = chrono::Utc::now().date_naive();
    match bookings::provider_dashboard(&state.db, user.0.id, today).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}
