use sea_orm::*;
use uuid::Uuid;

use crate::models::categories;

/// Fetch all active categories, ordered by name.
pub async fn get_active_categories(
    db: &DatabaseConnection,
) -> Result<Vec<categories::Model>, DbErr> {
    categories::Entity::find()
        .filter(categories::Column::IsActive.eq(true))
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await
}

/// Fetch a single category by ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<categories::Model>, DbErr> {
    categories::Entity::find_by_id(id).one(db).await
}

pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<categories::Model>, DbErr> {
    categories::Entity::find()
        .filter(categories::Column::Name.eq(name))
        .one(db)
        .await
}

/// Return the category with this name, creating it first if it is not stored yet.
pub async fn find_or_create_by_name(
    db: &DatabaseConnection,
    name: &str,
    icon: Option<&str>,
    description: Option<&str>,
) -> Result<categories::Model, DbErr> {
    if let Some(existing) = get_category_by_name(db, name).await? {
        return Ok(existing);
    }

    let new_category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        icon: Set(icon.map(str::to_string)),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
    };

    new_category.insert(db).await
}

/// Fetch several categories at once.
pub async fn get_categories_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<Vec<categories::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    categories::Entity::find()
        .filter(categories::Column::Id.is_in(ids))
        .all(db)
        .await
}
