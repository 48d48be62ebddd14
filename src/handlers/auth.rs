use actix_web::{HttpResponse, Responder, ResponseError, web};

use crate::auth::middleware::{AuthenticatedUser, VerifiedIdentity};
use crate::models::users::Registration;
use crate::state::AppState;

/// GET /api/auth/me — the reconciled user behind the bearer token.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}

/// POST /api/auth/register — persist the role and contact details chosen at sign-up.
pub async fn register(
    identity: VerifiedIdentity,
    state: web::Data<AppState>,
    body: web::Json<Registration>,
) -> impl Responder {
    match state.identity.register(&identity.0, body.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.error_response(),
    }
}
