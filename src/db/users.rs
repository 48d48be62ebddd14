use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, Roles, UpdateProfile, UpsertUser};

/// Fetch a user by the identity provider's id.
pub async fn get_user_by_auth_id(
    db: &DatabaseConnection,
    auth_id: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::AuthId.eq(auth_id))
        .one(db)
        .await
}

/// Fetch a single user by local ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Insert a full user row as given (ids and timestamps included).
pub async fn insert_user(db: &DatabaseConnection, row: users::Model) -> Result<users::Model, DbErr> {
    row.into_active_model().reset_all().insert(db).await
}

/// Create or update the user keyed by `auth_id`.
///
/// Without a role this only fills in a missing row; an existing row is returned
/// untouched. With a role it is a claim: an unconfirmed row takes the role and
/// becomes confirmed, while a row confirmed with a different role is returned
/// unchanged. Callers compare the returned role with the one they asked for.
pub async fn upsert_by_auth_id(
    db: &DatabaseConnection,
    input: UpsertUser,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = get_user_by_auth_id(db, &input.auth_id).await? {
        return apply_upsert(db, existing, input).await;
    }

    match new_user(&input).insert(db).await {
        Ok(row) => Ok(row),
        // A concurrent write created the row between the lookup and the insert.
        Err(e) => match get_user_by_auth_id(db, &input.auth_id).await? {
            Some(existing) => apply_upsert(db, existing, input).await,
            None => Err(e),
        },
    }
}

fn new_user(input: &UpsertUser) -> users::ActiveModel {
    let now = chrono::Utc::now();

    users::ActiveModel {
        id: Set(users::local_id_for(&input.auth_id)),
        auth_id: Set(input.auth_id.clone()),
        name: Set(input.name.clone()),
        email: Set(input.email.clone()),
        avatar: Set(input.avatar.clone()),
        role: Set(input.role.clone().unwrap_or(Roles::Client)),
        role_confirmed: Set(input.role.is_some()),
        phone: Set(input.phone.clone()),
        location: Set(None),
        city: Set(input.city.clone()),
        state: Set(input.state.clone()),
        verified: Set(input.verified),
        bio: Set(None),
        experience_years: Set(0),
        specialties: Set(Default::default()),
        skills: Set(Default::default()),
        completed_jobs: Set(0),
        rating: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

async fn apply_upsert(
    db: &DatabaseConnection,
    existing: users::Model,
    input: UpsertUser,
) -> Result<users::Model, DbErr> {
    let Some(role) = input.role else {
        return Ok(existing);
    };
    if existing.role_confirmed && existing.role != role {
        return Ok(existing);
    }

    let mut active: users::ActiveModel = existing.into();
    active.role = Set(role);
    active.role_confirmed = Set(true);
    active.name = Set(input.name);
    active.email = Set(input.email);
    active.verified = Set(input.verified);
    if input.avatar.is_some() {
        active.avatar = Set(input.avatar);
    }
    if input.phone.is_some() {
        active.phone = Set(input.phone);
    }
    if input.city.is_some() {
        active.city = Set(input.city);
    }
    if input.state.is_some() {
        active.state = Set(input.state);
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await
}

/// Recount a provider's completed bookings into their profile.
pub async fn set_completed_jobs(
    db: &DatabaseConnection,
    id: Uuid,
    completed_jobs: i32,
) -> Result<(), DbErr> {
    users::Entity::update_many()
        .col_expr(users::Column::CompletedJobs, Expr::value(completed_jobs))
        .filter(users::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Store a provider's average rating across all their reviews.
pub async fn set_rating(db: &DatabaseConnection, id: Uuid, rating: f64) -> Result<(), DbErr> {
    users::Entity::update_many()
        .col_expr(users::Column::Rating, Expr::value(rating))
        .filter(users::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Refresh the fields the identity provider owns. Role and profile are untouched.
pub async fn refresh_identity_fields(
    db: &DatabaseConnection,
    id: Uuid,
    email: String,
    verified: bool,
) -> Result<Option<users::Model>, DbErr> {
    let Some(user) = users::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: users::ActiveModel = user.into();
    active.email = Set(email);
    active.verified = Set(verified);
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map(Some)
}

/// Partial profile update. Returns `None` when the user does not exist.
pub async fn update_profile(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateProfile,
) -> Result<Option<users::Model>, DbErr> {
    let Some(user) = users::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: users::ActiveModel = user.into();

    if let Some(name) = input.name {
        active.name = Set(name);
    }
    if let Some(phone) = input.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(location) = input.location {
        active.location = Set(Some(location));
    }
    if let Some(city) = input.city {
        active.city = Set(Some(city));
    }
    if let Some(state) = input.state {
        active.state = Set(Some(state));
    }
    if let Some(bio) = input.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(years) = input.experience_years {
        active.experience_years = Set(years);
    }
    if let Some(specialties) = input.specialties {
        active.specialties = Set(specialties.into());
    }
    if let Some(skills) = input.skills {
        active.skills = Set(skills.into());
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map(Some)
}

/// Fetch several users at once, keyed by id.
pub async fn get_users_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<Vec<users::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await
}

/// Make sure `user` has a stored row, inserting it as given when missing.
///
/// Identities reconciled from a token may not have been written through yet;
/// anything that references the user by foreign key goes through here first.
pub async fn ensure_user(db: &DatabaseConnection, user: users::Model) -> Result<users::Model, DbErr> {
    if let Some(existing) = get_user_by_id(db, user.id).await? {
        return Ok(existing);
    }

    let id = user.id;
    match insert_user(db, user).await {
        Ok(inserted) => Ok(inserted),
        // Lost a race with the identity write-through.
        Err(e) => get_user_by_id(db, id).await?.ok_or(e),
    }
}
