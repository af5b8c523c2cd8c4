//! # Configuration
//!
//! Layered settings: built-in defaults, an optional TOML file, then
//! environment variables.
//!
//! Environment variables use the `EBLOTTER__` prefix with `__` between
//! section and key, e.g. `EBLOTTER__SERVER__PORT=9000` or
//! `EBLOTTER__STORAGE__BACKEND=sqlite`. A `.env` file in the working
//! directory is read first.
//!
//! # Examples
//!
//! ```ignore
//! use eblotter::config::Settings;
//!
//! let settings = Settings::load(None)?;
//! println!("listening on {}", settings.server.bind_address());
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/eblotter.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "EBLOTTER";

/// Error loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Display name.
    pub name: String,
    /// Reported version.
    pub version: String,
    /// Debug mode.
    pub debug: bool,
    /// Prefix for the collection routes.
    pub api_prefix: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "eBlotter API".to_string(),
            version: "1.0.0".to_string(),
            debug: false,
            api_prefix: "/api/v1".to_string(),
        }
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which record store to run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per entity kind.
    #[default]
    Json,
    /// SQLite via sqlx.
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::Invalid(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend selection.
    pub backend: StorageBackend,
    /// Directory for the JSON backend.
    pub data_dir: PathBuf,
    /// Database URL for the SQLite backend.
    pub database_url: String,
    /// Pool size for the SQLite backend.
    pub max_connections: u32,
    /// Seed demo data into empty collections at startup.
    pub seed: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from("data"),
            database_url: "sqlite://eblotter.db".to_string(),
            max_connections: 5,
            seed: false,
        }
    }
}

/// CORS settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// Comma-separated list of allowed origins.
    pub allowed_origins: String,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: "http://localhost:5173,http://localhost:3000".to_string(),
        }
    }
}

impl CorsSettings {
    /// Splits [`allowed_origins`](Self::allowed_origins) on commas, trimming
    /// whitespace and dropping empty entries.
    #[must_use]
    pub fn allowed_origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Bearer auth stub.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Require a bearer header on collection routes.
    pub enabled: bool,
    /// Identity provider client id. Informational.
    pub client_id: String,
    /// Identity provider tenant id. Informational.
    pub tenant_id: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// All settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application identity.
    pub app: AppSettings,
    /// HTTP listener.
    pub server: ServerSettings,
    /// Record store.
    pub storage: StorageSettings,
    /// CORS.
    pub cors: CorsSettings,
    /// Auth stub.
    pub auth: AuthSettings,
    /// Logging.
    pub log: LogSettings,
}

impl Settings {
    /// Loads settings from `.env`, the TOML file at `path` (or
    /// [`DEFAULT_CONFIG_PATH`]) and `EBLOTTER__*` environment variables.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is malformed and
    /// `ConfigError::Invalid` if the merged settings are unusable.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        Self::from_sources(path, Some(environment))
    }

    /// Builds settings from an optional file and an optional environment
    /// source, without reading `.env`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_sources(
        path: Option<&Path>,
        environment: Option<config::Environment>,
    ) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        let mut builder = config::Config::builder().add_source(
            config::File::from(file)
                .format(config::FileFormat::Toml)
                .required(required),
        );
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.app.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "app.api_prefix must start with '/': {}",
                self.app.api_prefix
            )));
        }
        if self.app.api_prefix.len() > 1 && self.app.api_prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "app.api_prefix must not end with '/': {}",
                self.app.api_prefix
            )));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_cover_local_development() {
        let settings = Settings::default();
        assert_eq!(settings.app.name, "eBlotter API");
        assert_eq!(settings.app.version, "1.0.0");
        assert_eq!(settings.app.api_prefix, "/api/v1");
        assert_eq!(settings.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(settings.storage.backend, StorageBackend::Json);
        assert_eq!(settings.storage.max_connections, 5);
        assert!(!settings.auth.enabled);
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn default_path_is_optional() {
        let settings = Settings::from_sources(None, None).unwrap();
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::from_sources(Some(Path::new("/nonexistent/eblotter.toml")), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn file_overrides_defaults_per_key() {
        let file = toml_file(
            r#"
            [server]
            port = 9100

            [storage]
            backend = "sqlite"
            database_url = "sqlite::memory:"

            [log]
            format = "json"
            "#,
        );
        let settings = Settings::from_sources(Some(file.path()), None).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.storage.backend, StorageBackend::Sqlite);
        assert_eq!(settings.storage.database_url, "sqlite::memory:");
        assert_eq!(settings.storage.data_dir, PathBuf::from("data"));
        assert_eq!(settings.log.format, LogFormat::Json);
    }

    #[test]
    fn bad_prefix_is_rejected() {
        let file = toml_file("[app]\napi_prefix = \"api\"\n");
        let err = Settings::from_sources(Some(file.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let cors = CorsSettings {
            allowed_origins: " http://a.test , http://b.test,,".to_string(),
        };
        assert_eq!(
            cors.allowed_origins_list(),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!(StorageBackend::Json.to_string(), "json");
        assert!("postgres".parse::<StorageBackend>().is_err());
    }
}
