//! Process configuration.
//!
//! Everything is read once at startup from the environment (optionally seeded
//! from a `.env` file) and validated before the server binds. The resulting
//! [`AppConfig`] is immutable and handed to the components that need it.

mod error;

pub use error::ConfigError;

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_GEOCODE_BASE_URL, DEFAULT_MODEL, ENV_BIND_ADDR, ENV_CORS_ORIGINS,
    ENV_CREDENTIALS_PATH, ENV_GEOCODE_BASE_URL, ENV_MAPS_ACCESS_TOKEN, ENV_MODEL, ENV_PATH,
    ENV_PROJECT_ID, ENV_PROJECT_REGION, ENV_SYSTEM_PROMPT, REQUIRED_ENV_VARS,
};
use dotenvy::from_filename;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub project_id: String,
    pub credentials_path: PathBuf,
    pub maps_access_token: String,
    pub region: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub geocode_base_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
}

/// Load variables from an env file once per process.
///
/// A missing file is not an error; the process environment may already carry
/// everything.
pub fn ensure_env_loaded(path: Option<&Path>) {
    ENV_LOADER.call_once(|| {
        let path = path.unwrap_or_else(|| Path::new(ENV_PATH));
        match from_filename(path) {
            Ok(_) => info!(path = %path.display(), "Loaded environment file"),
            Err(err) => debug!(path = %path.display(), %err, "Environment file not loaded"),
        }
    });
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Every required variable is checked before failing so the error names
    /// all of the missing ones at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<String> = REQUIRED_ENV_VARS
            .iter()
            .filter(|name| read(name).is_none())
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables { names: missing });
        }

        let required = |name: &str| read(name).unwrap_or_default();

        let bind_value = read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_value.clone(),
                source,
            })?;

        let cors_origins = read(ENV_CORS_ORIGINS)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            project_id: required(ENV_PROJECT_ID),
            credentials_path: PathBuf::from(required(ENV_CREDENTIALS_PATH)),
            maps_access_token: required(ENV_MAPS_ACCESS_TOKEN),
            region: required(ENV_PROJECT_REGION),
            model: read(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system_prompt: read(ENV_SYSTEM_PROMPT),
            geocode_base_url: read(ENV_GEOCODE_BASE_URL)
                .unwrap_or_else(|| DEFAULT_GEOCODE_BASE_URL.to_string()),
            bind_addr,
            cors_origins,
        };
        debug!(
            project = config.project_id.as_str(),
            region = config.region.as_str(),
            model = config.model.as_str(),
            "Configuration resolved"
        );
        Ok(config)
    }
}
