//! Reconciles the identity provider's view of a user with the local `users` table.
//!
//! Every authenticated request yields exactly one [`User`]. The stored row wins
//! when there is one; otherwise a fallback is built from the token alone and
//! written through in the background. Store failures never reject a request.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;

use crate::auth::jwt::Claims;
use crate::db::users as user_db;
use crate::error::ServiceError;
use crate::models::users::{self, Registration, Roles, UpsertUser, User};

/// What a verified token says about its bearer.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityAssertion {
    pub auth_id: String,
    pub display_name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
}

impl IdentityAssertion {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            auth_id: claims.sub.clone(),
            display_name: claims.display_name(),
            email: claims.user_email().unwrap_or_default(),
            email_verified: claims.email_verified(),
            // Access tokens carry no account creation time; issue time stands in.
            created_at: claims.issued_at(),
            avatar_url: claims.avatar_url(),
        }
    }

    /// Display name, else the local part of the email, else "User".
    pub fn name(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string())
    }

    pub fn avatar(&self) -> String {
        self.avatar_url.clone().unwrap_or_else(|| {
            format!(
                "https://ui-avatars.com/api/?name={}&background=random",
                self.name().replace(' ', "+")
            )
        })
    }

    /// A client-role user built from the assertion alone.
    pub fn fallback_user(&self) -> User {
        let joined = self.created_at.unwrap_or_else(Utc::now);
        User {
            id: users::local_id_for(&self.auth_id),
            auth_id: self.auth_id.clone(),
            name: self.name(),
            email: self.email.clone(),
            avatar: Some(self.avatar()),
            role: Roles::Client,
            role_confirmed: false,
            phone: None,
            location: None,
            city: None,
            state: None,
            verified: self.email_verified,
            bio: None,
            experience_years: 0,
            specialties: Vec::new(),
            skills: Vec::new(),
            completed_jobs: 0,
            rating: 0.0,
            joined_date: joined,
            updated_at: joined,
        }
    }

    fn upsert(&self, role: Option<Roles>) -> UpsertUser {
        UpsertUser {
            auth_id: self.auth_id.clone(),
            name: self.name(),
            email: self.email.clone(),
            avatar: Some(self.avatar()),
            role,
            verified: self.email_verified,
            phone: None,
            city: None,
            state: None,
        }
    }
}

/// The user for this request plus the background write it started, if any.
pub struct Reconciliation {
    pub user: User,
    pub write_through: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct IdentityBridge {
    db: DatabaseConnection,
}

impl IdentityBridge {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `None` in, `None` out: signed out means no user.
    pub async fn reconcile(&self, assertion: Option<IdentityAssertion>) -> Option<Reconciliation> {
        let assertion = assertion?;

        let stored = match user_db::get_user_by_auth_id(&self.db, &assertion.auth_id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(auth_id = %assertion.auth_id, "User lookup failed, using token identity: {e}");
                None
            }
        };

        match stored {
            Some(row) => {
                let stale = row.email != assertion.email || row.verified != assertion.email_verified;
                let write_through =
                    stale.then(|| self.spawn_refresh(row.id, assertion.email.clone(), assertion.email_verified));
                Some(Reconciliation {
                    user: row.into(),
                    write_through,
                })
            }
            None => {
                let user = assertion.fallback_user();
                let write_through = Some(self.spawn_upsert(assertion.upsert(None)));
                Some(Reconciliation {
                    user,
                    write_through,
                })
            }
        }
    }

    /// Persist the role and contact details chosen at sign-up.
    ///
    /// Unlike [`reconcile`](Self::reconcile) this waits for the write: a caller
    /// who registered as a provider must not silently end up a client. Once
    /// chosen the role is fixed; registering again with the same role only
    /// refreshes the contact details, a different role is a conflict.
    pub async fn register(
        &self,
        assertion: &IdentityAssertion,
        registration: Registration,
    ) -> Result<User, ServiceError> {
        let requested = registration.role.clone();
        let mut upsert = assertion.upsert(Some(registration.role));
        if !registration.name.trim().is_empty() {
            upsert.name = registration.name;
        }
        upsert.phone = registration.phone;
        upsert.city = registration.city;
        upsert.state = registration.state;

        match user_db::upsert_by_auth_id(&self.db, upsert).await {
            Ok(row) if row.role != requested => {
                tracing::warn!(user_id = %row.id, role = ?row.role, requested = ?requested, "role change refused");
                Err(ServiceError::Conflict(
                    "This account is already registered with a different role".to_string(),
                ))
            }
            Ok(row) => {
                tracing::info!(user_id = %row.id, role = ?row.role, "user registered");
                Ok(row.into())
            }
            Err(e) => {
                tracing::warn!(auth_id = %assertion.auth_id, "Registration write failed: {e}");
                Err(ServiceError::Unavailable(
                    "Could not save your profile right now, please retry".to_string(),
                ))
            }
        }
    }

    fn spawn_upsert(&self, input: UpsertUser) -> JoinHandle<()> {
        let db = self.db.clone();
        tokio::spawn(async move {
            let auth_id = input.auth_id.clone();
            if let Err(e) = user_db::upsert_by_auth_id(&db, input).await {
                tracing::warn!(%auth_id, "User write-through failed: {e}");
            }
        })
    }

    fn spawn_refresh(&self, id: uuid::Uuid, email: String, verified: bool) -> JoinHandle<()> {
        let db = self.db.clone();
        tokio::spawn(async move {
            if let Err(e) = user_db::refresh_identity_fields(&db, id, email, verified).await {
                tracing::warn!(user_id = %id, "User refresh failed: {e}");
            }
        })
    }
}
