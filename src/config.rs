//! Runtime configuration from environment variables.

use crate::error::ConfigError;
use crate::models::NewUser;
use chrono::{Duration, Utc};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::OnceLock;

pub const DEFAULT_JWT_SECRET: &str = "jwt-secret";
const DEFAULT_SCHEMA: &str = "hbnb";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_TOKEN_TTL_SECS: i64 = 900;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres { database_url: String },
}

/// Administrator created (or promoted) at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl AdminSeed {
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            is_admin: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageBackend,
    /// PostgreSQL schema holding the tables.
    pub schema: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub admin: Option<AdminSeed>,
    pub body_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL");
        let storage = match get("HBNB_STORAGE").as_deref() {
            None if database_url.is_none() => StorageBackend::Memory,
            Some("memory") => StorageBackend::Memory,
            None | Some("postgres") => StorageBackend::Postgres {
                database_url: database_url.ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "HBNB_STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let schema = get("HBNB_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        if !identifier_pattern().is_match(&schema) {
            return Err(ConfigError::Invalid {
                key: "HBNB_SCHEMA",
                value: schema,
            });
        }

        let max_connections = parse_or("HBNB_DB_MAX_CONNECTIONS", get("HBNB_DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::Validation("HBNB_DB_MAX_CONNECTIONS must be at least 1".into()));
        }

        let jwt_secret = match get("JWT_SECRET_KEY") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET_KEY not set, using the insecure default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let ttl_secs = parse_or("JWT_ACCESS_TOKEN_TTL_SECS", get("JWT_ACCESS_TOKEN_TTL_SECS"), DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(ConfigError::Validation("JWT_ACCESS_TOKEN_TTL_SECS must be positive".into()));
        }
        let token_ttl = Duration::try_seconds(ttl_secs)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| ConfigError::Invalid {
                key: "JWT_ACCESS_TOKEN_TTL_SECS",
                value: ttl_secs.to_string(),
            })?;

        let default_bind = DEFAULT_BIND_ADDR.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            key: "HBNB_BIND_ADDR",
            value: DEFAULT_BIND_ADDR.to_string(),
        })?;
        let bind_addr = parse_or("HBNB_BIND_ADDR", get("HBNB_BIND_ADDR"), default_bind)?;

        let admin = match (get("HBNB_ADMIN_EMAIL"), get("HBNB_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                first_name: get("HBNB_ADMIN_FIRST_NAME").unwrap_or_else(|| "Admin".into()),
                last_name: get("HBNB_ADMIN_LAST_NAME").unwrap_or_else(|| "HBnB".into()),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("HBNB_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("HBNB_ADMIN_EMAIL")),
        };

        let body_limit = parse_or("HBNB_BODY_LIMIT_BYTES", get("HBNB_BODY_LIMIT_BYTES"), DEFAULT_BODY_LIMIT_BYTES)?;

        Ok(AppConfig {
            storage,
            schema,
            max_connections,
            jwt_secret,
            token_ttl,
            bind_addr,
            admin,
            body_limit,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

fn identifier_pattern() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("static identifier pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.schema, "hbnb");
        assert_eq!(cfg.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(cfg.token_ttl, Duration::seconds(900));
        assert_eq!(cfg.bind_addr.port(), 5000);
        assert_eq!(cfg.body_limit, 65536);
        assert!(cfg.admin.is_none());
    }

    #[test]
    fn database_url_selects_postgres() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/hbnb")]).unwrap();
        assert_eq!(
            cfg.storage,
            StorageBackend::Postgres {
                database_url: "postgres://localhost/hbnb".into()
            }
        );
        let forced = config(&[("DATABASE_URL", "postgres://localhost/hbnb"), ("HBNB_STORAGE", "memory")]).unwrap();
        assert_eq!(forced.storage, StorageBackend::Memory);
    }

    #[test]
    fn postgres_without_url_is_missing() {
        assert!(matches!(
            config(&[("HBNB_STORAGE", "postgres")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            config(&[("HBNB_STORAGE", "redis")]),
            Err(ConfigError::Invalid { key: "HBNB_STORAGE", .. })
        ));
        assert!(matches!(
            config(&[("HBNB_SCHEMA", "drop table;")]),
            Err(ConfigError::Invalid { key: "HBNB_SCHEMA", .. })
        ));
        assert!(matches!(
            config(&[("JWT_ACCESS_TOKEN_TTL_SECS", "soon")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config(&[("JWT_ACCESS_TOKEN_TTL_SECS", "0")]),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            config(&[("HBNB_BIND_ADDR", "localhost")]),
            Err(ConfigError::Invalid { key: "HBNB_BIND_ADDR", .. })
        ));
    }

    #[test]
    fn oversized_token_lifetime_is_a_config_error() {
        let max = i64::MAX.to_string();
        let past_calendar = (i64::MAX / 1000 - 1).to_string();
        for value in [max.as_str(), past_calendar.as_str()] {
            assert!(matches!(
                config(&[("JWT_ACCESS_TOKEN_TTL_SECS", value)]),
                Err(ConfigError::Invalid { key: "JWT_ACCESS_TOKEN_TTL_SECS", .. })
            ));
        }
        let ten_years = config(&[("JWT_ACCESS_TOKEN_TTL_SECS", "315360000")]).unwrap();
        assert_eq!(ten_years.token_ttl, Duration::days(3650));
    }

    #[test]
    fn admin_seed_needs_email_and_password() {
        let cfg = config(&[("HBNB_ADMIN_EMAIL", "root@hbnb.io"), ("HBNB_ADMIN_PASSWORD", "s3cret")]).unwrap();
        let seed = cfg.admin.unwrap();
        assert_eq!(seed.first_name, "Admin");
        assert!(seed.to_new_user().is_admin);
        assert!(matches!(
            config(&[("HBNB_ADMIN_EMAIL", "root@hbnb.io")]),
            Err(ConfigError::Missing("HBNB_ADMIN_PASSWORD"))
        ));
    }
}
