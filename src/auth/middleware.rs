use actix_web::FromRequest;
use actix_web::{Error, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use std::future::Future;
use std::pin::Pin;

use crate::auth::identity::IdentityAssertion;
use crate::models::users::User;
use crate::state::AppState;

/// The caller's verified token, before any lookup in the `users` table.
pub struct VerifiedIdentity(pub IdentityAssertion);

impl FromRequest for VerifiedIdentity {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let bearer = BearerAuth::extract(&req).await.map_err(|_| {
                actix_web::error::ErrorUnauthorized("Authorization header must be: Bearer <token>")
            })?;

            let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Application state not configured")
            })?;

            let claims = state.verifier.verify(bearer.token()).await.map_err(|e| {
                tracing::debug!("Rejected token: {e}");
                actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}"))
            })?;

            Ok(VerifiedIdentity(IdentityAssertion::from_claims(&claims)))
        })
    }
}

/// The reconciled marketplace user for this request.
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let VerifiedIdentity(assertion) = VerifiedIdentity::extract(&req).await?;

            let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Application state not configured")
            })?;

            let reconciled = state
                .identity
                .reconcile(Some(assertion))
                .await
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("Not signed in"))?;

            Ok(AuthenticatedUser(reconciled.user))
        })
    }
}
