//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML config
//! file, the conventional `PORT` variable, then `LIBRIS__SECTION__KEY`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::admin::AdminSeed;
use crate::auth::AuthConfig;

pub const APP_NAME: &str = "libris";
const ENV_PREFIX: &str = "LIBRIS";
const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub admins: AdminsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. `None` keeps everything in memory.
    pub path: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir().map(|dir| dir.join(APP_NAME).join("libris.db")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminsConfig {
    /// Upper bound on a single registry lookup.
    pub lookup_timeout_ms: u64,
    /// Administrators written to the registry at startup.
    pub seed: Vec<AdminSeed>,
}

impl Default for AdminsConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 5_000,
            seed: Vec::new(),
        }
    }
}

impl AdminsConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Default config file location (`$XDG_CONFIG_HOME/libris/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

/// Load configuration. A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let port = std::env::var(PORT_ENV).ok();
    load_config_with(path, port.as_deref())
}

/// Load configuration with `port_alias` standing in for the `PORT`
/// variable. An explicit `LIBRIS__SERVER__PORT` still wins.
pub fn load_config_with(path: Option<&Path>, port_alias: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(false),
        );
    }

    let explicit_port = std::env::var_os(format!("{ENV_PREFIX}__SERVER__PORT")).is_some();
    if let Some(port) = port_alias.map(str::trim).filter(|p| !p.is_empty())
        && !explicit_port
    {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid {PORT_ENV} value {port:?}"))?;
        builder = builder
            .set_override("server.port", i64::from(port))
            .context("applying port override")?;
    }

    let built = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("building configuration")?;

    built
        .try_deserialize()
        .context("deserializing configuration")
}
