use actix_web::{HttpResponse, Responder, web};

use crate::db::categories as category_db;
use crate::models::categories::{self, Category};
use crate::state::AppState;

/// GET /api/categories — active categories, or the unsaved defaults when none
/// are stored or the store is unreachable.
pub async fn list(state: web::Data<AppState>) -> impl Responder {
    match category_db::get_active_categories(&state.db).await {
        Ok(rows) if !rows.is_empty() => {
            let list: Vec<Category> = rows.into_iter().map(Category::from).collect();
            HttpResponse::Ok().json(list)
        }
        Ok(_) => HttpResponse::Ok().json(categories::default_drafts()),
        Err(e) => {
            tracing::warn!("Failed to load categories, serving defaults: {e}");
            HttpResponse::Ok().json(categories::default_drafts())
        }
    }
}
