//! clonewatch library - Track backport clone chains of tracker issues
//!
//! This library exposes the runtime pieces of clonewatch (the document
//! service client, completion synchronization, the board session and the
//! reference document service) for testing and embedding purposes.

pub mod board;
pub mod client;
pub mod config;
pub mod output;
pub mod server;
pub mod sync;

use config::Config;
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};

/// Config path relative to the project root
pub const DEFAULT_CONFIG_PATH: &str = ".config/clonewatch/config.yaml";

/// Walk up from the current directory to the nearest `.config/clonewatch`,
/// falling back to the current directory.
pub fn find_project_root() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;

    loop {
        if current.join(".config/clonewatch").is_dir() {
            return Ok(current);
        }

        if !current.pop() {
            return std::env::current_dir().wrap_err("Failed to get current directory");
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file pointing at your document service:\n\n\
             service:\n  \
                 url: http://127.0.0.1:8080\n\
             browse_url: https://issues.redhat.com/browse/",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load the config at `path`, or defaults when there is no file.
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_config_or_default(&dir.path().join("config.yaml")).expect("defaults");
        assert_eq!(config.service_url(), config::DEFAULT_SERVICE_URL);
        assert_eq!(config.port(), config::DEFAULT_PORT);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "service: [not, a, map]\n").expect("write");

        let err = load_config_or_default(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn load_config_requires_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_config(&dir.path().join("config.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
