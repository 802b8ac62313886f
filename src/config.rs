//! Environment-based configuration types for the rest-jpg server runtime settings.

use anyhow::Result;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::ConfigError;

/// HTTP server port configuration
#[derive(Clone, Debug)]
pub struct HttpPort(u16);

/// Absolute base URL the server is reachable at, without trailing slash
#[derive(Clone, Debug)]
pub struct ExternalBase(String);

/// Root directory for uploaded image files
#[derive(Clone, Debug)]
pub struct UploadPath(PathBuf);

/// Realm announced in `WWW-Authenticate` challenges
#[derive(Clone, Debug)]
pub struct AuthRealm(String);

/// Maximum accepted request body size for uploads, in bytes
#[derive(Clone, Copy, Debug)]
pub struct MaxUploadSize(usize);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub external_base: ExternalBase,
    pub storage_backend: String,
    pub database_url: Option<String>,
    pub upload_path: UploadPath,
    pub auth_realm: AuthRealm,
    pub max_upload_size: MaxUploadSize,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let http_port: HttpPort = default_env("HTTP_PORT", "8080").try_into()?;
        let external_base: ExternalBase = require_env("EXTERNAL_BASE")?.try_into()?;
        let storage_backend = default_env("STORAGE_BACKEND", "memory");
        let database_url = optional_env("DATABASE_URL");
        let upload_path: UploadPath = default_env("UPLOAD_PATH", "/tmp/images").try_into()?;
        let auth_realm: AuthRealm = default_env("AUTH_REALM", "rest-jpg").try_into()?;
        let max_upload_size: MaxUploadSize = default_env("MAX_UPLOAD_SIZE", "10MB").try_into()?;

        Ok(Self {
            version: version()?,
            http_port,
            external_base,
            storage_backend,
            database_url,
            upload_path,
            auth_realm,
            max_upload_size,
        })
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ConfigError::EnvVarRequired(name.to_string()).into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<String> for ExternalBase {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let url = Url::parse(&value)
            .map_err(|e| ConfigError::InvalidExternalBase(value.clone(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidExternalBase(
                value,
                "scheme must be http or https".to_string(),
            ));
        }
        Ok(Self(value.trim_end_matches('/').to_string()))
    }
}

impl AsRef<str> for ExternalBase {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UploadPath {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConfigError::EnvVarRequired("UPLOAD_PATH".to_string()).into());
        }
        Ok(Self(PathBuf::from(value)))
    }
}

impl AsRef<Path> for UploadPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<String> for AuthRealm {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // The realm is embedded in a quoted header parameter.
        if value.is_empty() || value.contains('"') || value.chars().any(char::is_control) {
            return Err(ConfigError::EnvVarRequired("AUTH_REALM".to_string()).into());
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for AuthRealm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MaxUploadSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let upper = trimmed.to_ascii_uppercase();

        let (digits, multiplier) = if let Some(digits) = upper.strip_suffix("MB") {
            (digits, 1024 * 1024)
        } else if let Some(digits) = upper.strip_suffix("KB") {
            (digits, 1024)
        } else if let Some(digits) = upper.strip_suffix('B') {
            (digits, 1)
        } else {
            (upper.as_str(), 1)
        };

        digits
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or(ConfigError::SizeParsingFailed(value))
    }
}

impl AsRef<usize> for MaxUploadSize {
    fn as_ref(&self) -> &usize {
        &self.0
    }
}
