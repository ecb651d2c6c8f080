//! Server configuration.
//!
//! Loaded from a TOML file (`mediq.toml` by default), with host/port
//! overridable through `MEDIQ_HOST` / `MEDIQ_PORT` for container
//! deployments. Every section defaults so an empty file is a valid
//! configuration.

use std::path::Path;

use mediq_auth::AuthConfig;
use serde::{Deserialize, Serialize};

/// Root server configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8080
///
/// [logging]
/// level = "info"
///
/// [auth]
/// password_min_length = 8
///
/// [[seed.admins]]
/// name = "Platform Admin"
/// email = "admin@mediq.health"
/// password = "change-me-now"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings.
    pub server: HttpConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Auth policy settings.
    pub auth: AuthConfig,

    /// Out-of-band account seeding.
    pub seed: SeedConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, overridable via `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Out-of-band account seeding.
///
/// Admin accounts cannot be created through registration; they are
/// provisioned here at startup instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Admin accounts ensured to exist at startup.
    pub admins: Vec<AdminSeed>,
}

/// A seeded admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeed {
    /// Display name.
    pub name: String,

    /// Login email address.
    pub email: String,

    /// Initial password, forwarded to the identity provider.
    pub password: String,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed.
        path: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// An environment override is not usable.
    #[error("invalid {variable} value: {value}")]
    InvalidEnv {
        /// The offending variable.
        variable: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Default configuration path when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "mediq.toml";

/// Loads configuration from the given path.
///
/// With an explicit path, the file must exist. With `None`, the default path
/// is used if present and built-in defaults otherwise. Environment overrides
/// are applied last.
///
/// # Errors
///
/// Returns a [`ConfigError`] on unreadable or unparsable input.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                parse_file(default)?
            } else {
                ServerConfig::default()
            }
        }
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

fn apply_env_overrides(config: &mut ServerConfig) -> Result<(), ConfigError> {
    if let Ok(host) = std::env::var("MEDIQ_HOST")
        && !host.is_empty()
    {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("MEDIQ_PORT")
        && !port.is_empty()
    {
        config.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
            variable: "MEDIQ_PORT",
            value: port,
        })?;
    }
    Ok(())
}
