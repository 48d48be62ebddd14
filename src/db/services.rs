use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::db::{categories as category_db, users as user_db};
use crate::models::services::{self, NewService, Service, ServiceQuery, UpdateService};

/// Insert a new service. Both references must already be resolved.
pub async fn insert_service(
    db: &DatabaseConnection,
    input: NewService,
) -> Result<services::Model, DbErr> {
    let now = chrono::Utc::now();

    let new_service = services::ActiveModel {
        id: Set(Uuid::new_v4()),
        provider_id: Set(input.provider_id),
        category_id: Set(input.category_id),
        title: Set(input.title),
        description: Set(input.description),
        price: Set(input.price),
        price_type: Set(input.price_type),
        duration: Set(input.duration),
        images: Set(input.images.into()),
        availability: Set(input.availability.into()),
        location: Set(input.location),
        city: Set(input.city),
        state: Set(input.state),
        tags: Set(input.tags.into()),
        rating: Set(0.0),
        review_count: Set(0),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_service.insert(db).await
}

/// Fetch active services matching the store-side predicates, newest first.
///
/// Free text is a case-insensitive substring match over title and description.
/// An unknown category name matches nothing.
pub async fn get_all_services(
    db: &DatabaseConnection,
    filters: &ServiceQuery,
) -> Result<Vec<services::Model>, DbErr> {
    let mut query = services::Entity::find().filter(services::Column::IsActive.eq(true));

    if let Some(name) = non_blank(&filters.category) {
        match category_db::get_category_by_name(db, name).await? {
            Some(category) => {
                query = query.filter(services::Column::CategoryId.eq(category.id));
            }
            None => return Ok(Vec::new()),
        }
    }
    if let Some(city) = non_blank(&filters.city) {
        query = query.filter(services::Column::City.eq(city));
    }
    if let Some(state) = non_blank(&filters.state) {
        query = query.filter(services::Column::State.eq(state));
    }
    if let Some(text) = non_blank(&filters.query) {
        query = query.filter(
            Condition::any()
                .add(contains_ignoring_case(services::Column::Title, text))
                .add(contains_ignoring_case(services::Column::Description, text)),
        );
    }

    query
        .order_by_desc(services::Column::CreatedAt)
        .all(db)
        .await
}

/// `LOWER(column) LIKE '%text%'`, with `%` and `_` in `text` matched literally.
///
/// Postgres `LIKE` is case-sensitive and SQLite has no `ILIKE`, so both sides
/// are lowered instead.
fn contains_ignoring_case(column: services::Column, text: &str) -> Expr {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Func::lower(Expr::col(column)).like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}

/// Fetch a single service by ID.
pub async fn get_service_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<services::Model>, DbErr> {
    services::Entity::find_by_id(id).one(db).await
}

/// Fetch all active services for a given provider, newest first.
pub async fn get_services_by_provider(
    db: &DatabaseConnection,
    provider_id: Uuid,
) -> Result<Vec<services::Model>, DbErr> {
    services::Entity::find()
        .filter(services::Column::ProviderId.eq(provider_id))
        .filter(services::Column::IsActive.eq(true))
        .order_by_desc(services::Column::CreatedAt)
        .all(db)
        .await
}

/// Partial update. Returns `None` when the service does not exist.
pub async fn update_service(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateService,
) -> Result<Option<services::Model>, DbErr> {
    let Some(service) = services::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: services::ActiveModel = service.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(price) = input.price {
        active.price = Set(price);
    }
    if let Some(price_type) = input.price_type {
        active.price_type = Set(price_type);
    }
    if let Some(duration) = input.duration {
        active.duration = Set(Some(duration));
    }
    if let Some(location) = input.location {
        active.location = Set(location);
    }
    if let Some(city) = input.city {
        active.city = Set(Some(city));
    }
    if let Some(state) = input.state {
        active.state = Set(Some(state));
    }
    if let Some(images) = input.images {
        active.images = Set(images.into());
    }
    if let Some(availability) = input.availability {
        active.availability = Set(availability.into());
    }
    if let Some(tags) = input.tags {
        active.tags = Set(tags.into());
    }
    if let Some(is_active) = input.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map(Some)
}

/// Store a recomputed rating aggregate.
pub async fn set_rating_summary(
    db: &DatabaseConnection,
    id: Uuid,
    rating: f64,
    review_count: i32,
) -> Result<Option<services::Model>, DbErr> {
    let Some(service) = services::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: services::ActiveModel = service.into();
    active.rating = Set(rating);
    active.review_count = Set(review_count);
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map(Some)
}

/// Map rows to listings, joining category names and provider summaries in two
/// batched queries.
pub async fn attach_relations(
    db: &DatabaseConnection,
    rows: Vec<services::Model>,
) -> Result<Vec<Service>, DbErr> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids: HashSet<Uuid> = rows.iter().map(|s| s.category_id).collect();
    let provider_ids: HashSet<Uuid> = rows.iter().map(|s| s.provider_id).collect();

    let categories: HashMap<Uuid, _> =
        category_db::get_categories_by_ids(db, category_ids.into_iter().collect())
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
    let providers: HashMap<Uuid, _> =
        user_db::get_users_by_ids(db, provider_ids.into_iter().collect())
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let category = categories.get(&row.category_id);
            let provider = providers.get(&row.provider_id);
            Service::from(row).with_relations(category, provider)
        })
        .collect())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
