use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Issuer stamped into every session token and required on validation
pub const TOKEN_ISSUER: &str = "playlists-app";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing)]
    pub security: SecurityConfig,
    pub log_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Longest accepted session token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_HOURS: u64 = 24 * 366;

impl SecurityConfig {
    pub fn token_lifetime(&self) -> chrono::Duration {
        // Bounded so the cast and chrono's range check cannot overflow
        let hours = self.jwt_expiry_hours.min(MAX_TOKEN_LIFETIME_HOURS);
        chrono::Duration::hours(hours as i64)
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// `JWT_SECRET` and `DATABASE_URL` have no fallback; startup fails without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`,
    /// which keeps parsing testable without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                value: "<empty>".to_string(),
            });
        }
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut config = Self::profile(environment, database_url, jwt_secret);
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("SERVER_HOST") {
            if !v.trim().is_empty() {
                self.server.host = v;
            }
        }
        if let Some(v) = lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_var("SERVER_PORT", &v)?;
        }
        if let Some(v) = lookup("SERVER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = parse_var("SERVER_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("STATIC_DIR") {
            self.server.static_dir = Some(v).filter(|s| !s.trim().is_empty());
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            let hours: u64 = parse_var("SECURITY_JWT_EXPIRY_HOURS", &v)?;
            if hours == 0 || hours > MAX_TOKEN_LIFETIME_HOURS {
                return Err(ConfigError::Invalid {
                    name: "SECURITY_JWT_EXPIRY_HOURS",
                    value: v,
                });
            }
            self.security.jwt_expiry_hours = hours;
        }

        if let Some(v) = lookup("LOG_FILTER") {
            self.log_filter = v;
        }

        Ok(())
    }

    fn profile(environment: Environment, database_url: String, jwt_secret: String) -> Self {
        let (max_connections, connection_timeout, log_filter, cors_origins) = match environment {
            Environment::Development => (
                10,
                30,
                "playlists_api=debug,tower_http=debug",
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:3001".to_string(),
                    "http://localhost:4321".to_string(),
                ],
            ),
            Environment::Staging => (20, 10, "playlists_api=info,tower_http=info", vec![]),
            Environment::Production => (50, 5, "playlists_api=info", vec![]),
        };

        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_secs: 30,
                cors_origins,
                static_dir: None,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                connection_timeout,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
            },
            log_filter: log_filter.to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn requires_jwt_secret() {
        let result = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x/y")]));
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn rejects_blank_secret() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "   "),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "JWT_SECRET", .. })));
    }

    #[test]
    fn requires_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn development_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.jwt_expiry_hours, 24);
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.cors_origins.is_empty());
    }

    #[test]
    fn applies_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "9001"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, https://b.example"),
            ("SECURITY_JWT_EXPIRY_HOURS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.security.jwt_expiry_hours, 2);
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn rejects_unparseable_port() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "s3cret"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "SERVER_PORT", .. })));
    }

    #[test]
    fn rejects_oversized_expiry() {
        for hours in ["3000000000000000", "18446744073709551615", "8785"] {
            let result = AppConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://x/y"),
                ("JWT_SECRET", "s3cret"),
                ("SECURITY_JWT_EXPIRY_HOURS", hours),
            ]));
            assert!(matches!(
                result,
                Err(ConfigError::Invalid { name: "SECURITY_JWT_EXPIRY_HOURS", .. })
            ));
        }

        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "s3cret"),
            ("SECURITY_JWT_EXPIRY_HOURS", "8784"),
        ]))
        .unwrap();
        assert_eq!(config.security.token_lifetime(), chrono::Duration::hours(8784));
    }

    #[test]
    fn token_lifetime_is_clamped() {
        let security = SecurityConfig {
            jwt_secret: "s3cret".into(),
            jwt_expiry_hours: u64::MAX,
        };
        assert_eq!(
            security.token_lifetime(),
            chrono::Duration::hours(MAX_TOKEN_LIFETIME_HOURS as i64)
        );
    }
}
