//! Cache backend configuration
//!
//! This module provides the configuration surface for the cache backend:
//! the serializable `CacheSettings` snapshot (server address plus parameter
//! mapping), the layered `CacheParams`/`StoreOptions` inputs, and the
//! immutable `ResolvedConfig` produced once at backend construction.
//!
//! Resolution precedence for every option:
//! explicit per-call value > `CacheParams` field > `StoreOptions` field >
//! hard-coded default.

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./aerocache.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_NAMESPACE: &str = "test";
const DEFAULT_SET: &str = "cache";
const DEFAULT_BIN: &str = "entry";
const DEFAULT_TTL: u32 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("port value must be an integer, got '{0}'")]
    InvalidPort(String),
    #[error("username and password must be set together")]
    PartialCredentials,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Credentials for an authenticated (enterprise) store connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Nested options mapping, the lowest-precedence configuration layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub namespace: Option<String>,
    pub set_name: Option<String>,
    pub bin: Option<String>,
    pub timeout: Option<u32>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Backend-level parameters, overriding `StoreOptions` field by field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheParams {
    pub namespace: Option<String>,
    pub set_name: Option<String>,
    pub bin: Option<String>,
    /// Default TTL for written records, in store time units
    pub timeout: Option<u32>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Disable the read-modify-write increment fallback; with this set,
    /// a failed atomic increment surfaces as an error instead
    pub atomic_only: bool,
    pub options: StoreOptions,
}

/// Serializable configuration snapshot: server address plus parameters.
///
/// A backend is constructed from a `CacheSettings` and can hand the same
/// snapshot back out, so the configuration survives a serialize/deserialize
/// cycle (e.g. when shipping it across a process boundary).
///
/// ```
/// use aerocache::config::{CacheParams, CacheSettings};
///
/// let params = CacheParams {
///     namespace: Some("ns1".to_string()),
///     ..Default::default()
/// };
/// let settings = CacheSettings::new("localhost:3000", params);
/// let config = settings.resolve().unwrap();
/// assert_eq!(config.host, "localhost");
/// assert_eq!(config.namespace, "ns1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Server address as `"host:port"`, `"host"`, or empty for the default
    pub server: String,
    pub params: CacheParams,
}

impl CacheSettings {
    pub fn new(server: impl Into<String>, params: CacheParams) -> Self {
        Self {
            server: server.into(),
            params,
        }
    }

    /// Load settings from the TOML file named by `AEROCACHE_CONFIG` (also
    /// honored from a `.env` file) or from `./aerocache.toml`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        if let Ok(config_path) = env::var("AEROCACHE_CONFIG") {
            Self::from_file(config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "config path must be specified via AEROCACHE_CONFIG or in {}",
                DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        settings.resolve()?;
        Ok(settings)
    }

    /// Resolve into an immutable, validated configuration
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        ResolvedConfig::resolve(&self.server, &self.params)
    }
}

/// Immutable configuration, resolved once at backend construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub namespace: String,
    pub set_name: String,
    pub bin: String,
    pub default_ttl: u32,
    pub credentials: Option<Credentials>,
    pub atomic_only: bool,
}

impl ResolvedConfig {
    /// Apply the precedence rules and validate the result.
    ///
    /// An explicit server address beats `options.host`/`options.port`; an
    /// empty address falls back to `127.0.0.1:3000`. A present-but-non-integer
    /// port segment and a username without a password (or vice versa) are
    /// rejected here, before any connection attempt.
    pub fn resolve(server: &str, params: &CacheParams) -> Result<Self, ConfigError> {
        let opts = &params.options;

        let (host, port) = if server.is_empty() {
            (
                opts.host
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                opts.port.unwrap_or(DEFAULT_PORT),
            )
        } else if let Some((host, port)) = server.rsplit_once(':') {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;
            (host.to_string(), port)
        } else {
            (server.to_string(), opts.port.unwrap_or(DEFAULT_PORT))
        };

        if host.is_empty() {
            return Err(ConfigError::Invalid("host cannot be empty".to_string()));
        }

        let namespace = params
            .namespace
            .clone()
            .or_else(|| opts.namespace.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let set_name = params
            .set_name
            .clone()
            .or_else(|| opts.set_name.clone())
            .unwrap_or_else(|| DEFAULT_SET.to_string());
        let bin = params
            .bin
            .clone()
            .or_else(|| opts.bin.clone())
            .unwrap_or_else(|| DEFAULT_BIN.to_string());
        let default_ttl = params.timeout.or(opts.timeout).unwrap_or(DEFAULT_TTL);

        if namespace.is_empty() {
            return Err(ConfigError::Invalid(
                "namespace cannot be empty".to_string(),
            ));
        }
        if set_name.is_empty() {
            return Err(ConfigError::Invalid("set name cannot be empty".to_string()));
        }
        if bin.is_empty() {
            return Err(ConfigError::Invalid("bin name cannot be empty".to_string()));
        }

        let username = params.username.clone().or_else(|| opts.username.clone());
        let password = params.password.clone().or_else(|| opts.password.clone());
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCredentials),
        };

        Ok(Self {
            host,
            port,
            namespace,
            set_name,
            bin,
            default_ttl,
            credentials,
            atomic_only: params.atomic_only,
        })
    }

    /// The `host:port` address this configuration connects to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
