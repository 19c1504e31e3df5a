//! Configuration management for the manga library.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings and environment overrides for
//! the deployment-specific ones (database path, port, catalog base URL).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `database.path`
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
/// Environment variable overriding `server.host`
pub const ENV_HOST: &str = "HOST";
/// Environment variable overriding `server.port`
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding `catalog.base_url`
pub const ENV_CATALOG_BASE: &str = "MANGADEX_API_BASE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// External catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path (relative to data directory or absolute)
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
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

/// External manga catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// MangaDex API base URL
    pub base_url: String,

    /// Base URL cover image files are served from
    pub cover_base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Number of results requested per search (capped at 100 upstream)
    pub search_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mangadex.org".to_string(),
            cover_base_url: "https://uploads.mangadex.org/covers".to_string(),
            timeout_seconds: 10,
            search_limit: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            database: DatabaseConfig {
                path: "library.db".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.is_empty()) {
            self.database.path = path;
        }
        if let Some(host) = lookup(ENV_HOST).filter(|v| !v.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value: {}", ENV_PORT, port))?;
        }
        if let Some(base_url) = lookup(ENV_CATALOG_BASE).filter(|v| !v.is_empty()) {
            self.catalog.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the database file
    pub fn database_path(&self) -> PathBuf {
        let db_path = Path::new(&self.database.path);
        if db_path.is_absolute() {
            db_path.to_path_buf()
        } else {
            self.data_dir().join(db_path)
        }
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.database.path, "library.db");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.catalog.timeout_seconds, 10);
        assert_eq!(config.catalog.search_limit, 20);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let original_config = Config::default();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(
            loaded_config.catalog.base_url,
            original_config.catalog.base_url
        );

        Ok(())
    }

    #[test]
    fn test_missing_sections_use_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[data]
root_dir = "/var/lib/manga"

[database]
path = "lib.db"

[logging]
log_dir = "logs"
default_level = "debug"
console = true
file = false
json_format = false
"#,
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.catalog.base_url, "https://api.mangadex.org");
        assert!(config.database_path().ends_with("manga/lib.db"));

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_environment_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE_PATH, "/tmp/other.db"),
            (ENV_PORT, "8080"),
            (ENV_CATALOG_BASE, "http://localhost:9000/"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()))?;

        assert_eq!(config.database_path(), PathBuf::from("/tmp/other.db"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.catalog.base_url, "http://localhost:9000");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");

        Ok(())
    }

    #[test]
    fn test_invalid_port_override_fails() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == ENV_PORT).then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        let db_path = config.database_path();
        assert!(db_path.ends_with("data/library.db"));

        let log_dir = config.log_dir();
        assert!(log_dir.ends_with("data/logs"));
    }
}
