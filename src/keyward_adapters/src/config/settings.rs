use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::constants::{
    CONFIG_FILE,
    env::{ENV_PREFIX, ENV_SEPARATOR},
};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("JWT secret must not be empty")]
    EmptySecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt: JwtSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: Secret<String>,
}

impl AuthSettings {
    /// Load from `.env`, the optional settings file and `KEYWARD__*` variables, in that order
    /// of increasing precedence.
    #[tracing::instrument(name = "AuthSettings::load")]
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Self = config.try_deserialize()?;

        if settings.jwt.secret.expose_secret().trim().is_empty() {
            return Err(SettingsError::EmptySecret);
        }

        Ok(settings)
    }
}
