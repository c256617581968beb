//! Configuration loading and management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Database location
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Step catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Photo upload settings
    #[serde(default)]
    pub uploads: UploadsConfig,

    /// Session settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database location settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database; defaults to `~/.gifthunt/hunt.db`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Step catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a catalog TOML file; defaults to the built-in hunt
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Photo upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory for uploaded photos; defaults to `~/.gifthunt/uploads`
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Maximum decoded photo size in bytes
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: usize,
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How long a login session stays valid, in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_photo_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_token_ttl_hours() -> u64 {
    24 * 7
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl Config {
    /// Get the global config directory path (~/.gifthunt/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gifthunt")
    }

    /// Get the global config file path (~/.gifthunt/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration: an explicit path, the global file, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let global = Self::global_config_path();
        if global.exists() {
            Self::from_file(&global)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolved database path
    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("hunt.db"))
    }

    /// Resolved uploads directory
    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads
            .dir
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("uploads"))
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    /// Session lifetime in milliseconds
    pub fn token_ttl_millis(&self) -> i64 {
        (self.auth.token_ttl_hours as i64) * 60 * 60 * 1000
    }
}
