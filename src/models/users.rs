use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::StringList;

/// The `Roles` enum maps to a Postgres TEXT column stored as lowercase strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Roles {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "provider")]
    Provider,
}

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Identifier issued by the identity provider (the JWT `sub`).
    #[sea_orm(unique)]
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Roles,
    /// Set once the role was chosen at sign-up (or by a first listing). A
    /// confirmed role never changes.
    pub role_confirmed: bool,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub verified: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub experience_years: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub specialties: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: StringList,
    pub completed_jobs: i32,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::services::Entity")]
    Services,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Deterministic local id for an external identity.
///
/// The fallback identity synthesized before the row exists and the row written
/// through afterwards share this id.
pub fn local_id_for(auth_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, auth_id.as_bytes())
}

// ── View model ──

/// Application-facing user. Field names follow what the frontend reads
/// (`experienceYears`, `joinedDate`, ...) rather than the column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Roles,
    pub role_confirmed: bool,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub verified: bool,
    pub bio: Option<String>,
    pub experience_years: i32,
    pub specialties: Vec<String>,
    pub skills: Vec<String>,
    pub completed_jobs: i32,
    pub rating: f64,
    pub joined_date: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl User {
    pub fn is_provider(&self) -> bool {
        self.role == Roles::Provider
    }
}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            auth_id: m.auth_id,
            name: m.name,
            email: m.email,
            avatar: m.avatar,
            role: m.role,
            role_confirmed: m.role_confirmed,
            phone: m.phone,
            location: m.location,
            city: m.city,
            state: m.state,
            verified: m.verified,
            bio: m.bio,
            experience_years: m.experience_years,
            specialties: m.specialties.into(),
            skills: m.skills.into(),
            completed_jobs: m.completed_jobs,
            rating: m.rating,
            joined_date: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<User> for Model {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            auth_id: u.auth_id,
            name: u.name,
            email: u.email,
            avatar: u.avatar,
            role: u.role,
            role_confirmed: u.role_confirmed,
            phone: u.phone,
            location: u.location,
            city: u.city,
            state: u.state,
            verified: u.verified,
            bio: u.bio,
            experience_years: u.experience_years,
            specialties: u.specialties.into(),
            skills: u.skills.into(),
            completed_jobs: u.completed_jobs,
            rating: u.rating,
            created_at: u.joined_date,
            updated_at: u.updated_at,
        }
    }
}

// ── DTOs ──

/// Create-or-update payload keyed by `auth_id`.
///
/// With `role` unset this is a plain write-through: it creates a missing row
/// and leaves an existing one alone. With `role` set it is a role claim, which
/// only takes effect while the stored role is unconfirmed.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Option<Roles>,
    pub verified: bool,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Used by `PUT /api/users/me`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub specialties: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
}

/// Used by `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub role: Roles,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Provider details embedded in a service listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub id: Uuid,
    pub name: String,
    pub rating: f64,
    pub completed_jobs: i32,
    pub bio: String,
    pub years_experience: i32,
    pub verified: bool,
    pub specialties: Vec<String>,
    pub avatar: String,
    pub location: String,
}

impl From<&Model> for ProviderSummary {
    fn from(m: &Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            rating: m.rating,
            completed_jobs: m.completed_jobs,
            bio: m.bio.clone().unwrap_or_default(),
            years_experience: m.experience_years,
            verified: m.verified,
            specialties: m.specialties.0.clone(),
            avatar: m.avatar.clone().unwrap_or_default(),
            location: m.location.clone().unwrap_or_default(),
        }
    }
}
