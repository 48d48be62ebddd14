use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use serde::Deserialize;
use tracing::debug;

use super::jwt::Claims;

const JWKS_URL_TEMPLATE: &str = "https://{}.supabase.co/auth/v1/.well-known/jwks.json";
const KEY_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// An EC public key as published by Supabase.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    alg: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

#[derive(Clone)]
struct SigningKey {
    x: String,
    y: String,
    algorithm: Algorithm,
}

impl TryFrom<&Jwk> for SigningKey {
    type Error = String;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        let algorithm = match jwk.alg.as_deref().unwrap_or("ES256") {
            "ES256" => Algorithm::ES256,
            "ES384" => Algorithm::ES384,
            other => return Err(format!("Unsupported JWK algorithm {other}")),
        };

        Ok(Self {
            x: jwk.x.clone().ok_or("Missing 'x' in JWK")?,
            y: jwk.y.clone().ok_or("Missing 'y' in JWK")?,
            algorithm,
        })
    }
}

/// Signing keys fetched from the project's JWKS endpoint, cached per `kid`.
#[derive(Clone)]
pub struct JwksCache {
    keys: Cache<String, SigningKey>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(project_ref: &str, anon_key: &str) -> Self {
        Self {
            keys: Cache::builder().time_to_live(KEY_TTL).max_capacity(10).build(),
            jwks_url: JWKS_URL_TEMPLATE.replace("{}", project_ref),
            client: reqwest::Client::new(),
            anon_key: anon_key.to_string(),
        }
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, String> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch JWKS: HTTP {status}"));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| format!("Failed to parse JWKS: {e}"))
    }

    async fn signing_key(&self, kid: &str) -> Result<SigningKey, String> {
        if let Some(cached) = self.keys.get(kid).await {
            return Ok(cached);
        }

        // Cache every key in the set; rotations usually publish several at once.
        let set = self.fetch_key_set().await?;
        let mut found = None;
        for jwk in &set.keys {
            let Ok(key) = SigningKey::try_from(jwk) else {
                debug!(kid = %jwk.kid, "skipping unusable JWK");
                continue;
            };
            if jwk.kid == kid {
                found = Some(key.clone());
            }
            self.keys.insert(jwk.kid.clone(), key).await;
        }

        found.ok_or_else(|| format!("Key with kid={kid} not found in JWKS"))
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, String> {
        let header = decode_header(token).map_err(|e| format!("Failed to decode header: {e}"))?;
        let kid = header.kid.ok_or("No 'kid' in token header")?;

        let key = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_ec_components(&key.x, &key.y)
            .map_err(|e| format!("Failed to create decoding key: {e}"))?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Token validation failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_published_key_set() {
        let set: JwkSet = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kid": "a", "alg": "ES256", "kty": "EC", "x": "xx", "y": "yy" },
                { "kid": "b", "alg": "RS256", "kty": "RSA", "n": "nn", "e": "AQAB" }
            ]
        }))
        .unwrap();

        assert_eq!(set.keys.len(), 2);
        let key = SigningKey::try_from(&set.keys[0]).unwrap();
        assert_eq!(key.algorithm, Algorithm::ES256);
        assert!(SigningKey::try_from(&set.keys[1]).is_err());
    }

    #[test]
    fn missing_algorithm_defaults_to_es256() {
        let jwk = Jwk {
            kid: "k".to_string(),
            alg: None,
            x: Some("x".to_string()),
            y: Some("y".to_string()),
        };
        assert_eq!(SigningKey::try_from(&jwk).unwrap().algorithm, Algorithm::ES256);
    }
}
