//! Process configuration, read once from the environment at startup.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::Duration;
use tracing::warn;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 60;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;
const DEV_JWT_SECRET: &str = "spacer-development-secret";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Refuse logins until the account's email is verified.
    pub require_verified_email: bool,
}

/// Credentials for the administrator ensured at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub admin: Option<AdminSeed>,
    pub cors_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let production = lookup("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None if production => bail!("JWT_SECRET must be set when RUST_ENV=production"),
            None => {
                warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                ),
            });

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => {
                warn!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together; skipping admin seed");
                None
            }
        };

        let host = match lookup("HOST") {
            Some(host) => host
                .parse()
                .with_context(|| format!("HOST '{host}' is not an IP address"))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        Ok(Self {
            host,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            database,
            auth: AuthConfig {
                jwt_secret,
                access_ttl: Duration::minutes(parse_or(
                    &lookup,
                    "JWT_ACCESS_TTL_MINUTES",
                    DEFAULT_ACCESS_TTL_MINUTES,
                )),
                refresh_ttl: Duration::days(parse_or(
                    &lookup,
                    "JWT_REFRESH_TTL_DAYS",
                    DEFAULT_REFRESH_TTL_DAYS,
                )),
                require_verified_email: parse_or(&lookup, "REQUIRE_VERIFIED_EMAIL", false),
            },
            admin,
            cors_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_else(cors::default_origins),
            production,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, fallback = %default, "Unparseable setting, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert!(config.database.is_none());
        assert!(config.admin.is_none());
        assert!(!config.auth.require_verified_email);
        assert_eq!(config.auth.access_ttl, Duration::minutes(60));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config(&[("PORT", "eighty"), ("DATABASE_URL", "postgres://db/spacer"), ("DATABASE_MAX_CONNECTIONS", "-1")]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.database.unwrap().max_connections, 5);
    }

    #[test]
    fn test_production_requires_secret() {
        assert!(config(&[("RUST_ENV", "production")]).is_err());
        let config = config(&[("RUST_ENV", "Production"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert!(config.production);
    }

    #[test]
    fn test_admin_seed_needs_both_values() {
        assert!(config(&[("ADMIN_EMAIL", "root@example.com")]).unwrap().admin.is_none());
        let seeded = config(&[("ADMIN_EMAIL", "root@example.com"), ("ADMIN_PASSWORD", "longenough")]).unwrap();
        assert_eq!(seeded.admin.unwrap().email, "root@example.com");
    }

    #[test]
    fn test_cors_origins_split() {
        let config = config(&[("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example")]).unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }
}
