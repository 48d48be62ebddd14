use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process configuration, read once in `main` and handed to whatever needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Legacy HS256 secret. When set, tokens are verified with it instead of JWKS.
    pub jwt_secret: Option<String>,
    pub port: u16,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("'{raw}' is not a port number"),
            })?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            jwt_secret: std::env::var("SUPABASE_JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            port,
            cache: CacheConfig::from_env(),
        })
    }

    /// Project reference from `https://PROJECT.supabase.co`.
    pub fn project_ref(&self) -> Result<&str, ConfigError> {
        project_ref(&self.supabase_url)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn project_ref(supabase_url: &str) -> Result<&str, ConfigError> {
    supabase_url
        .trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::Invalid {
            var: "SUPABASE_URL",
            reason: "expected https://PROJECT.supabase.co".to_string(),
        })
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub services_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            services_ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            services_ttl: parse_duration_secs("CACHE_TTL_SERVICES", 300),
        }
    }
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_project_ref() {
        assert_eq!(project_ref("https://abcd1234.supabase.co"), Ok("abcd1234"));
        assert_eq!(project_ref("https://abcd1234.supabase.co/"), Ok("abcd1234"));
        assert!(project_ref("http://abcd1234.supabase.co").is_err());
        assert!(project_ref("https://example.com").is_err());
    }

    #[test]
    fn catalog_ttl_defaults_to_five_minutes() {
        assert_eq!(CacheConfig::default().services_ttl, Duration::from_secs(300));
        assert_eq!(
            parse_duration_secs("SERVICEWALA_TEST_UNSET_TTL", 300),
            Duration::from_secs(300)
        );
    }
}
