//! Database connection configuration.
//!
//! Settings are resolved in three layers: built-in defaults, an optional TOML
//! file named by `TASKSTORE_CONFIG`, then `TASKSTORE_DB_*` environment
//! variables. A `.env` file in the working directory is loaded first when
//! present.

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Environment variable naming the optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "TASKSTORE_CONFIG";
/// Environment variable overriding [`DatabaseConfig::user`].
pub const USER_ENV: &str = "TASKSTORE_DB_USER";
/// Environment variable overriding [`DatabaseConfig::password`].
pub const PASSWORD_ENV: &str = "TASKSTORE_DB_PASSWORD";
/// Environment variable overriding [`DatabaseConfig::host`].
pub const HOST_ENV: &str = "TASKSTORE_DB_HOST";
/// Environment variable overriding [`DatabaseConfig::port`].
pub const PORT_ENV: &str = "TASKSTORE_DB_PORT";
/// Environment variable overriding [`DatabaseConfig::database`].
pub const DATABASE_ENV: &str = "TASKSTORE_DB_NAME";
/// Environment variable overriding [`DatabaseConfig::ssl_mode`].
pub const SSL_MODE_ENV: &str = "TASKSTORE_DB_SSLMODE";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    FileRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`DatabaseConfig`].
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A setting holds a value that cannot be interpreted.
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Name of the setting.
        key: &'static str,
        /// Rejected raw value.
        value: String,
    },

    /// A `.env` file exists but could not be read or parsed.
    #[error("failed to load .env file: {source}")]
    EnvFile {
        /// Underlying dotenv error.
        source: dotenvy::Error,
    },

    /// The connection URL cannot be assembled from the settings.
    #[error("invalid connection URL: {0}")]
    InvalidUrl(String),
}

/// TLS negotiation mode passed to the server as `sslmode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// Never use TLS.
    #[default]
    Disable,
    /// Use TLS only when the server insists.
    Allow,
    /// Try TLS first, fall back to plain text.
    Prefer,
    /// Require TLS without verifying the certificate.
    Require,
    /// Require TLS and verify the certificate authority.
    VerifyCa,
    /// Require TLS and verify the certificate and host name.
    VerifyFull,
}

impl SslMode {
    /// Returns the libpq spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Allow => "allow",
            Self::Prefer => "prefer",
            Self::Require => "require",
            Self::VerifyCa => "verify-ca",
            Self::VerifyFull => "verify-full",
        }
    }
}

impl FromStr for SslMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "allow" => Ok(Self::Allow),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            _ => Err(ConfigError::InvalidValue {
                key: SSL_MODE_ENV,
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for the task database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Role used to authenticate.
    pub user: String,
    /// Password for [`DatabaseConfig::user`].
    pub password: String,
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// TLS negotiation mode.
    pub ssl_mode: SslMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_owned(),
            password: "postgres".to_owned(),
            host: "localhost".to_owned(),
            port: 5432,
            database: "postgres".to_owned(),
            ssl_mode: SslMode::Disable,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DatabaseConfig {
    /// Resolves configuration from `.env`, the optional config file and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a present `.env` file or the config file
    /// cannot be read or parsed, or when an environment override holds an
    /// invalid value.
    pub fn load() -> Result<Self, ConfigError> {
        env_file_loaded(dotenvy::dotenv())?;

        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_toml_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses a TOML document; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = read_file(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `TASKSTORE_DB_*` overrides obtained through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the port or TLS mode cannot
    /// be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup(USER_ENV) {
            self.user = user;
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.password = password;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.host = host;
        }
        if let Some(raw_port) = lookup(PORT_ENV) {
            self.port = raw_port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: PORT_ENV,
                    value: raw_port.clone(),
                })?;
        }
        if let Some(database) = lookup(DATABASE_ENV) {
            self.database = database;
        }
        if let Some(raw_mode) = lookup(SSL_MODE_ENV) {
            self.ssl_mode = raw_mode.parse()?;
        }
        Ok(())
    }

    /// Builds the `postgres://` connection URL.
    ///
    /// User name and password are percent-encoded. The database name is
    /// encoded as a single path segment, so `%` and `/` are escaped too.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when the host is not a valid URL
    /// host.
    pub fn connection_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse("postgres://localhost")
            .map_err(|err| ConfigError::InvalidUrl(err.to_string()))?;
        url.set_host(Some(self.host.as_str()))
            .map_err(|err| ConfigError::InvalidUrl(format!("host '{}': {err}", self.host)))?;
        url.set_port(Some(self.port))
            .map_err(|()| ConfigError::InvalidUrl(format!("port {}", self.port)))?;
        url.set_username(&self.user)
            .map_err(|()| ConfigError::InvalidUrl(format!("user '{}'", self.user)))?;
        url.set_password(Some(self.password.as_str()))
            .map_err(|()| ConfigError::InvalidUrl("password".to_owned()))?;
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidUrl(format!("database '{}'", self.database)))?
            .clear()
            .push(&self.database);
        url.query_pairs_mut()
            .append_pair("sslmode", self.ssl_mode.as_str());
        Ok(url)
    }
}

/// Treats a missing `.env` file as success.
fn env_file_loaded<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConfigError::EnvFile { source }),
    }
}

fn read_file(path: &Path) -> Result<String, std::io::Error> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("path must include a file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
