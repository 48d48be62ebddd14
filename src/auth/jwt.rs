use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::auth::jwks::JwksCache;
use crate::config::{AppConfig, ConfigError};

/// Supabase JWT claims.
///
/// `sub` is the external-auth id; everything else is best-effort profile data.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Supabase role (e.g. "authenticated"). Not the marketplace role.
    pub role: Option<String>,
    pub user_metadata: Option<UserMetadata>,
}

/// Metadata populated by the sign-up form or the OAuth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl Claims {
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
            .filter(|n| !n.trim().is_empty())
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.avatar_url.clone().or_else(|| m.picture.clone()))
    }

    /// Prefer the top-level email, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }

    pub fn email_verified(&self) -> bool {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.email_verified)
            .unwrap_or(false)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat
            .and_then(|iat| i64::try_from(iat).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Validate a token signed with the project's legacy HS256 secret.
pub fn validate_with_secret(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| format!("Token validation failed: {e:?}"))
}

/// How incoming access tokens are checked.
pub enum TokenVerifier {
    /// Asymmetric signing keys published at the project's JWKS endpoint.
    Jwks(JwksCache),
    /// Shared HS256 secret.
    Secret(String),
}

impl TokenVerifier {
    /// The secret wins when configured; otherwise keys come from JWKS.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        match &config.jwt_secret {
            Some(secret) => Ok(TokenVerifier::Secret(secret.clone())),
            None => Ok(TokenVerifier::Jwks(JwksCache::new(
                config.project_ref()?,
                &config.supabase_anon_key,
            ))),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, String> {
        match self {
            TokenVerifier::Jwks(jwks) => jwks.validate_token(token).await,
            TokenVerifier::Secret(secret) => validate_with_secret(token, secret),
        }
    }
}
