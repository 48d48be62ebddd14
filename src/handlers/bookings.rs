use actix_web::{HttpResponse, Responder, ResponseError, web};
use uuid::Uuid;

use crate::auth::authorization::require_provider;
use crate::auth::middleware::AuthenticatedUser;
use crate::bookings::{self, BookingBucket};
use crate::error::ServiceError;
use crate::events::ServerEvent;
use crate::models::bookings::{
    Booking, BookingListQuery, BookingStatus, CreateBooking, RequestsQuery, UpdateBookingStatus,
};
use crate::state::AppState;

/// POST /api/bookings — request a booking. Always created as pending.
pub async fn create(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<CreateBooking>,
) -> impl Responder {
    match bookings::create_booking(&state.db, &user.0, body.into_inner()).await {
        Ok(booking) => {
            state.events.publish(ServerEvent::booking_created(&booking));
            HttpResponse::Created().json(booking)
        }
        Err(e) => e.error_response(),
    }
}

/// GET /api/bookings — the caller's own bookings, newest request first.
/// Query params: ?bucket=upcoming|past|cancelled
pub async fn list_mine(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    query: web::Query<BookingListQuery>,
) -> impl Responder {
    let bucket = match query.bucket.as_deref().map(str::parse::<BookingBucket>) {
        Some(Err(e)) => return ServiceError::Validation(e).error_response(),
        Some(Ok(bucket)) => Some(bucket),
        None => None,
    };

    match bookings::list_for_user(&state.db, user.0.id).await {
        Ok(list) => match bucket {
            Some(bucket) => {
                let today = chrono::Utc::now().date_naive();
                HttpResponse::Ok().json(bookings::in_bucket(list, bucket, today))
            }
            None => HttpResponse::Ok().json(list),
        },
        Err(e) => e.error_response(),
    }
}

/// GET /api/bookings/requests — bookings addressed to the calling provider.
/// Query params: ?pending=true for the pending-only view
pub async fn requests(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    query: web::Query<RequestsQuery>,
) -> impl Responder {
    if let Err(e) = require_provider(&user.0) {
        return e.error_response();
    }

    let result = if query.pending {
        bookings::pending_requests(&state.db, user.0.id).await
    } else {
        bookings::list_for_provider(&state.db, user.0.id).await
    };

    match result {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => e.error_response(),
    }
}

/// GET /api/bookings/{id} — visible to the customer and the provider only.
pub async fn get(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match bookings::get_for_party(&state.db, &user.0, path.into_inner()).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(e) => e.error_response(),
    }
}

/// POST /api/bookings/{id}/approve
pub async fn approve(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let result = bookings::approve(&state.db, &user.0, path.into_inner()).await;
    respond_with_status_change(&state, result).await
}

/// POST /api/bookings/{id}/reject
pub async fn reject(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let result = bookings::reject(&state.db, &user.0, path.into_inner()).await;
    respond_with_status_change(&state, result).await
}

/// PUT /api/bookings/{id}/status — move along the lifecycle (start, complete, cancel, ...).
pub async fn set_status(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBookingStatus>,
) -> impl Responder {
    let next: BookingStatus = body.into_inner().status;
    let result = bookings::transition(&state.db, &user.0, path.into_inner(), next).await;
    respond_with_status_change(&state, result).await
}

async fn respond_with_status_change(
    state: &AppState,
    result: Result<Booking, ServiceError>,
) -> HttpResponse {
    match result {
        Ok(booking) => {
            // Cached listings embed the provider's completed-job count.
            if booking.status == BookingStatus::Completed {
                state.catalog.invalidate().await;
            }
            state.events.publish(ServerEvent::status_changed(&booking));
            HttpResponse::Ok().json(booking)
        }
        Err(e) => e.error_response(),
    }
}
