use actix_web::{HttpResponse, Responder, ResponseError, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::users as user_db;
use crate::error::ServiceError;
use crate::models::users::{self, UpdateProfile, User};
use crate::state::AppState;

/// PUT /api/users/me — partial profile update for the caller.
pub async fn update_me(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfile>,
) -> impl Responder {
    match update_profile(&state.db, user.0, body.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => e.error_response(),
    }
}

async fn update_profile(
    db: &DatabaseConnection,
    user: User,
    input: UpdateProfile,
) -> Result<User, ServiceError> {
    // A first-time caller may not have been written through yet.
    let row = user_db::ensure_user(db, users::Model::from(user)).await?;

    user_db::update_profile(db, row.id, input)
        .await?
        .map(User::from)
        .ok_or_else(|| ServiceError::not_found(format!("User {}", row.id)))
}

/// GET /api/users/{id} — a user by local id.
pub async fn get_user(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    let found = user_db::get_user_by_id(&state.db, id)
        .await
        .map_err(ServiceError::from)
        .and_then(|row| row.ok_or_else(|| ServiceError::not_found(format!("User {id}"))));

    match found {
        Ok(row) => HttpResponse::Ok().json(User::from(row)),
        Err(e) => e.error_response(),
    }
}
