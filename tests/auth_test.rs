//! Token validation tests.
//!
//! Tokens are minted locally with the same HS256 secret the server is configured
//! with. No running server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
mod common;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use servicewala_backend::auth::identity::IdentityAssertion;
use servicewala_backend::auth::jwt::{Claims, TokenVerifier, validate_with_secret};

use common::{TEST_SECRET, mint_token};

#[test]
fn valid_token_decodes_correctly() {
    let token = mint_token("auth-alice", "alice@example.com", Some("Alice Smith"));

    let claims = validate_with_secret(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, "auth-alice");
    assert_eq!(claims.user_email().unwrap(), "alice@example.com");
    assert_eq!(claims.display_name().unwrap(), "Alice Smith");
    assert!(claims.email_verified());
    assert!(claims.issued_at().is_some());
}

#[test]
fn expired_token_is_rejected() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: "auth-expired".to_string(),
        exp: now - 300, // well past the 60s default leeway
        iat: Some(now - 3600),
        iss: None,
        email: Some("expired@example.com".to_string()),
        role: None,
        user_metadata: None,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let result = validate_with_secret(&token, TEST_SECRET);
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn wrong_secret_is_rejected() {
    let token = mint_token("auth-bob", "bob@example.com", Some("Bob Jones"));

    let result = validate_with_secret(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn garbage_token_is_rejected() {
    assert!(validate_with_secret("not.a.valid.jwt", TEST_SECRET).is_err());
}

#[tokio::test]
async fn secret_verifier_yields_an_identity_assertion() {
    let verifier = TokenVerifier::Secret(TEST_SECRET.to_string());
    let token = mint_token("auth-carol", "carol.d@example.com", None);

    let claims = verifier.verify(&token).await.unwrap();
    let assertion = IdentityAssertion::from_claims(&claims);

    assert_eq!(assertion.auth_id, "auth-carol");
    assert_eq!(assertion.email, "carol.d@example.com");
    assert!(assertion.email_verified);
    // No display name in the token: the email's local part stands in.
    assert_eq!(assertion.name(), "carol.d");
}

#[test]
fn claims_helpers_with_missing_metadata() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: "auth-bare".to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some("bare@example.com".to_string()),
        role: None,
        user_metadata: None,
    };

    assert_eq!(claims.user_email().unwrap(), "bare@example.com");
    assert!(claims.display_name().is_none());
    assert!(claims.avatar_url().is_none());
    assert!(!claims.email_verified());
}
