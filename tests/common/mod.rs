//! Shared fixtures: an in-memory SQLite store migrated to the marketplace schema.
#![allow(dead_code)]

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use servicewala_backend::auth::jwt::{Claims, UserMetadata};
use servicewala_backend::db::{categories as category_db, users as user_db};
use servicewala_backend::models::categories;
use servicewala_backend::models::services::{CreateService, PriceType};
use servicewala_backend::models::users::{self, Roles, UpsertUser, User};

pub const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

/// A connected store with no tables: every query fails.
pub async fn empty_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite")
}

/// Build the schema with the same migrations the server runs at startup.
pub async fn create_schema(db: &DatabaseConnection) {
    Migrator::up(db, None)
        .await
        .expect("Failed to run migrations");
}

pub async fn setup_db() -> DatabaseConnection {
    let db = empty_db().await;
    create_schema(&db).await;
    db
}

pub async fn insert_user(db: &DatabaseConnection, auth_id: &str, name: &str, role: Roles) -> User {
    let row = user_db::upsert_by_auth_id(
        db,
        UpsertUser {
            auth_id: auth_id.to_string(),
            name: name.to_string(),
            email: format!("{auth_id}@example.com"),
            avatar: None,
            role: Some(role),
            verified: true,
            phone: None,
            city: Some("Mumbai".to_string()),
            state: Some("Maharashtra".to_string()),
        },
    )
    .await
    .expect("Failed to insert user");
    row.into()
}

pub async fn insert_category(db: &DatabaseConnection, name: &str) -> categories::Model {
    category_db::find_or_create_by_name(db, name, None, None)
        .await
        .expect("Failed to insert category")
}

pub fn service_input(provider_ref: &str, category_ref: &str, title: &str, price: f64) -> CreateService {
    CreateService {
        provider_id: provider_ref.to_string(),
        category_id: category_ref.to_string(),
        category_name: None,
        title: title.to_string(),
        description: format!("{title}, done by a verified professional"),
        price,
        price_type: PriceType::Fixed,
        duration: Some("2 hours".to_string()),
        location: "Andheri East".to_string(),
        city: Some("Mumbai".to_string()),
        state: Some("Maharashtra".to_string()),
        images: vec![format!("https://img.example.com/{}.jpg", title.replace(' ', "-"))],
        availability: vec!["Monday".to_string(), "Saturday".to_string()],
        tags: vec!["home".to_string()],
    }
}

/// A user as the identity provider would describe one that was never stored.
pub fn unsaved_user(auth_id: &str, name: &str) -> User {
    let now = Utc::now();
    User {
        id: users::local_id_for(auth_id),
        auth_id: auth_id.to_string(),
        name: name.to_string(),
        email: format!("{auth_id}@example.com"),
        avatar: None,
        role: Roles::Client,
        role_confirmed: false,
        phone: None,
        location: None,
        city: None,
        state: None,
        verified: false,
        bio: None,
        experience_years: 0,
        specialties: Vec::new(),
        skills: Vec::new(),
        completed_jobs: 0,
        rating: 0.0,
        joined_date: now,
        updated_at: now,
    }
}

/// Mint an HS256 access token the way Supabase does.
pub fn mint_token(sub: &str, email: &str, full_name: Option<&str>) -> String {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: Some("https://example.supabase.co/auth/v1".to_string()),
        email: Some(email.to_string()),
        role: Some("authenticated".to_string()),
        user_metadata: Some(UserMetadata {
            full_name: full_name.map(str::to_string),
            name: None,
            avatar_url: None,
            picture: None,
            email: Some(email.to_string()),
            email_verified: Some(true),
        }),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}
