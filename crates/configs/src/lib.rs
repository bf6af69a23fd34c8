//! # Settings
//!
//! Layered configuration: built-in defaults, then `config/default.toml`, then
//! `config/local.toml`, then `LAUNCHPAD__*` environment variables
//! (`LAUNCHPAD__AUTH__JWT_SECRET`, `LAUNCHPAD__SERVER__PORT`, ...).

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const ENV_PREFIX: &str = "LAUNCHPAD";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Postgres URL. When absent the server runs on the in-memory store.
    #[serde(default)]
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Settings {
    /// Loads `.env` (if any) and then every configuration layer.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_builder(
            Self::defaults()?
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config/local").required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).separator("__")),
        )
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.cors_origins", Vec::<String>::new())?
            .set_default("database.max_connections", 10)?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?)
    }

    fn from_builder(
        builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(SettingsError::Invalid(
                "auth.jwt_secret must be set (LAUNCHPAD__AUTH__JWT_SECRET)".into(),
            ));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(SettingsError::Invalid("auth.token_ttl_hours must be positive".into()));
        }
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must not be 0".into()));
        }
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid("database.max_connections must not be 0".into()));
        }
        if let Some(url) = &self.database.url {
            if url.expose_secret().trim().is_empty() {
                return Err(SettingsError::Invalid("database.url is set but empty".into()));
            }
        }
        Ok(())
    }

    pub fn uses_database(&self) -> bool {
        self.database.url.is_some()
    }
}
