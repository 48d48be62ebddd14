use actix_web::{HttpResponse, Responder, ResponseError, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ServiceError;
use crate::events::ServerEvent;
use crate::models::services::{CreateService, ServiceQuery, UpdateService};
use crate::search::{self, SearchParams};
use crate::state::AppState;

/// GET /api/services — cached catalog, filtered and sorted in memory.
/// Query params: ?query=&category=&location=&city=&state=&rating=&priceRange=100-200&sort=rating
pub async fn list(state: web::Data<AppState>, params: web::Query<SearchParams>) -> impl Responder {
    let (filters, sort) = match params.into_inner().parse() {
        Ok(parsed) => parsed,
        Err(e) => return e.error_response(),
    };

    let all = state.catalog.get_all(None).await;
    HttpResponse::Ok().json(search::search(&all, &filters, sort))
}

/// GET /api/services/search — store-side filtered query, never cached.
pub async fn search_live(
    state: web::Data<AppState>,
    query: web::Query<ServiceQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let services = state.catalog.get_all(Some(&query)).await;
    HttpResponse::Ok().json(services.as_slice())
}

/// POST /api/services — list a new service.
pub async fn create(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<CreateService>,
) -> impl Responder {
    match state.catalog.create(Some(&user.0), body.into_inner()).await {
        Ok(service) => {
            state.events.publish(ServerEvent::service_created(&service));
            HttpResponse::Created().json(service)
        }
        Err(e) => e.error_response(),
    }
}

/// GET /api/services/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.get_by_id(id).await {
        Ok(Some(service)) => HttpResponse::Ok().json(service),
        Ok(None) => ServiceError::not_found(format!("Service {id}")).error_response(),
        Err(e) => e.error_response(),
    }
}

/// PUT /api/services/{id} — partial update by the owning provider.
pub async fn update(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateService>,
) -> impl Responder {
    match state
        .catalog
        .update(&user.0, path.into_inner(), body.into_inner())
        .await
    {
        Ok(service) => HttpResponse::Ok().json(service),
        Err(e) => e.error_response(),
    }
}

/// GET /api/services/{id}/reviews — newest first, empty when unavailable.
pub async fn reviews(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    HttpResponse::Ok().json(state.catalog.reviews_for(path.into_inner()).await)
}
