//! Configuration schema for clonewatch
//!
//! Config lives at `.config/clonewatch/config.yaml` relative to the project root.

use facet::Facet;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_BROWSE_URL: &str = "https://issues.redhat.com/browse/";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_FILE: &str = "documents.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Root configuration for clonewatch
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Where the document service lives
    #[facet(default)]
    pub service: ServiceConfig,

    /// Settings for `clonewatch serve`
    #[facet(default)]
    pub server: ServerConfig,

    /// Base URL for issue links on cards
    /// e.g., `https://issues.redhat.com/browse/`
    #[facet(default)]
    pub browse_url: Option<String>,
}

/// Document service the client talks to
#[derive(Debug, Clone, Default, Facet)]
pub struct ServiceConfig {
    /// Base URL, without the `/api/...` suffix
    #[facet(default)]
    pub url: Option<String>,

    /// Per-request timeout in seconds
    #[facet(default)]
    pub timeout_secs: Option<u64>,
}

/// The bundled reference document service
#[derive(Debug, Clone, Default, Facet)]
pub struct ServerConfig {
    #[facet(default)]
    pub port: Option<u16>,

    /// JSON file holding the document list (relative to the config file)
    #[facet(default)]
    pub data_file: Option<String>,
}

impl Config {
    pub fn service_url(&self) -> &str {
        self.service.url.as_deref().unwrap_or(DEFAULT_SERVICE_URL)
    }

    pub fn browse_url(&self) -> &str {
        self.browse_url.as_deref().unwrap_or(DEFAULT_BROWSE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    /// Data file path, resolved against the directory holding the config
    pub fn data_file(&self, config_dir: &std::path::Path) -> PathBuf {
        config_dir.join(
            self.server
                .data_file
                .as_deref()
                .unwrap_or(DEFAULT_DATA_FILE),
        )
    }
}
