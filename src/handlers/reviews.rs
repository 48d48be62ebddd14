use actix_web::{HttpResponse, Responder, ResponseError, web};

use crate::auth::middleware::AuthenticatedUser;
use crate::models::reviews::CreateReview;
use crate::state::AppState;

/// POST /api/reviews
pub async fn create(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<CreateReview>,
) -> impl Responder {
    match state.catalog.add_review(&user.0, body.into_inner()).await {
        Ok(review) => HttpResponse::Created().json(review),
        Err(e) => e.error_response(),
    }
}
