use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

use crate::services::order_service::TransitionPolicy;

/// Connection settings for one service's Postgres database.
///
/// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
/// `DB_*` parts.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub url_override: Option<String>,
}

impl DatabaseConfig {
    pub fn from_env(default_name: &str) -> anyhow::Result<Self> {
        Ok(Self {
            host: env_or("DB_HOST", "localhost"),
            port: parse_env("DB_PORT", 5432)?,
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", "postgres"),
            name: env_or("DB_NAME", default_name),
            url_override: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
        })
    }

    pub fn url(&self) -> String {
        match &self.url_override {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode=disable",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }
}

/// Listener and lifecycle settings shared by both services.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl HttpConfig {
    pub fn from_env(default_port: u16) -> anyhow::Result<Self> {
        Ok(Self {
            host: env_or("APP_HOST", "0.0.0.0"),
            port: parse_env("APP_PORT", default_port)?,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)?),
            shutdown_grace: Duration::from_secs(parse_env("SHUTDOWN_GRACE_SECS", 10)?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub user_service_url: String,
    pub user_service_connect_timeout: Duration,
    pub transition_policy: TransitionPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let enforce = parse_env("ENFORCE_STATUS_TRANSITIONS", false)?;
        Ok(Self {
            database: DatabaseConfig::from_env("orderdb")?,
            http: HttpConfig::from_env(50052)?,
            user_service_url: env_or("USER_SERVICE_URL", "http://localhost:50051"),
            user_service_connect_timeout: Duration::from_secs(parse_env(
                "USER_SERVICE_CONNECT_TIMEOUT_SECS",
                5,
            )?),
            transition_policy: if enforce {
                TransitionPolicy::Enforced
            } else {
                TransitionPolicy::Permissive
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

impl DirectoryConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env("userdb")?,
            http: HttpConfig::from_env(50051)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}
