use crate::error::{AuditError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/aeo-analyze";
pub const DEFAULT_CONFIG_FILE: &str = "aeo-audit.toml";

/// Settings read from the optional TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Where and how to reach the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub endpoint: Url,
    /// Transport-level timeout; `None` leaves the HTTP client default in place
    pub timeout: Option<Duration>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AuditError::Config(format!("cannot read {:?}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| AuditError::Config(format!("invalid config {:?}: {}", path, e)))
    }

    /// Loads the explicit file if given (it must exist), otherwise the default
    /// file in the working directory when one is there.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            info!(
                action = "load",
                component = "config_file",
                file_path = ?path,
                "Loading config from specified file"
            );
            return Self::from_path(path).map(Some);
        }

        let default_file = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_file.exists() {
            info!(
                action = "load",
                component = "config_file",
                file_path = ?default_file,
                "Loading config from default file"
            );
            return Self::from_path(&default_file).map(Some);
        }

        Ok(None)
    }
}

impl ServiceConfig {
    /// Layers CLI/env values over the config file over built-in defaults.
    pub fn resolve(
        endpoint: Option<&str>,
        timeout_secs: Option<u64>,
        file: Option<&FileConfig>,
    ) -> Result<Self> {
        let endpoint = endpoint
            .or_else(|| file.and_then(|f| f.endpoint.as_deref()))
            .unwrap_or(DEFAULT_ENDPOINT);
        let timeout_secs = timeout_secs.or_else(|| file.and_then(|f| f.timeout_secs));

        let endpoint = parse_endpoint(endpoint)?;
        let timeout = match timeout_secs {
            Some(0) => return Err(AuditError::Config("timeout must be greater than 0".to_string())),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        info!(
            action = "resolve",
            component = "config",
            endpoint = %endpoint,
            timeout_secs = ?timeout_secs,
            "Service configuration resolved"
        );
        Ok(Self { endpoint, timeout })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AuditError::Config(format!("invalid endpoint '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AuditError::Config(format!(
            "endpoint '{}' must use http or https, not {}",
            raw, other
        ))),
    }
}
