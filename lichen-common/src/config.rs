//! Configuration loading and data folder resolution
//!
//! Configuration is read once at startup and is read-only for the lifetime
//! of a run. Resolution follows the priority order used across lichen
//! agents:
//! 1. Explicit path / command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file in the user config directory
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Proxy settings applied to every heritage API request.
///
/// Mirrors the process-wide proxy surface: HTTP proxy, HTTPS proxy and a
/// comma-separated no-proxy host list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
    /// Comma-separated hosts excluded from proxying, e.g. "localhost,10.0.0.1"
    pub no_proxy: Option<String>,
}

impl ProxyConfig {
    /// True when no proxy setting is present at all
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none() && self.no_proxy.is_none()
    }
}

/// Heritage archive API configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeritageConfig {
    /// API base URL, no trailing slash
    pub base_url: String,
    /// Content resource path prefix, up to and including the hash scheme tag
    pub uri: String,
    /// Suffix selecting the license sub-resource of a content object
    pub license_suffix: String,
    /// Upper bound for a single rate-limit sleep, in seconds
    pub max_sleep_secs: u64,
    pub proxy: ProxyConfig,
}

impl Default for HeritageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive.softwareheritage.org".to_string(),
            uri: "/api/1/content/sha256:".to_string(),
            license_suffix: "/license/".to_string(),
            max_sleep_secs: 1500,
            proxy: ProxyConfig::default(),
        }
    }
}

/// Load the heritage configuration.
///
/// Priority: `explicit` path > `LICHEN_CONFIG` env var > platform config dir
/// (`lichen/lichen.toml`) > compiled defaults. A file named by `explicit` or
/// the env var must exist and parse; the platform-dir file is optional.
///
/// Proxy settings may additionally be overridden per-field via
/// `LICHEN_HTTP_PROXY`, `LICHEN_HTTPS_PROXY` and `LICHEN_NO_PROXY`.
pub fn load_config(explicit: Option<&Path>) -> Result<HeritageConfig> {
    let mut config = if let Some(path) = explicit {
        info!("Loading config: {}", path.display());
        read_config_file(path)?
    } else if let Ok(path) = std::env::var("LICHEN_CONFIG") {
        info!("Loading config from LICHEN_CONFIG: {}", path);
        read_config_file(Path::new(&path))?
    } else {
        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config: {}", path.display());
                read_config_file(&path)?
            }
            _ => HeritageConfig::default(),
        }
    };

    apply_proxy_env_overrides(&mut config.proxy);

    if config.max_sleep_secs == 0 {
        warn!("max_sleep_secs is 0; rate-limit waits will retry immediately");
    }

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<HeritageConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

fn apply_proxy_env_overrides(proxy: &mut ProxyConfig) {
    if let Ok(v) = std::env::var("LICHEN_HTTP_PROXY") {
        if !v.trim().is_empty() {
            proxy.http = Some(v);
        }
    }
    if let Ok(v) = std::env::var("LICHEN_HTTPS_PROXY") {
        if !v.trim().is_empty() {
            proxy.https = Some(v);
        }
    }
    if let Ok(v) = std::env::var("LICHEN_NO_PROXY") {
        if !v.trim().is_empty() {
            proxy.no_proxy = Some(v);
        }
    }
}

/// Default config file location: `<config dir>/lichen/lichen.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lichen").join("lichen.toml"))
}

/// Resolve the database path.
///
/// Priority: command-line argument > `LICHEN_DATABASE` env var >
/// `<data dir>/lichen/lichen.db`.
pub fn resolve_database_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var("LICHEN_DATABASE") {
        return PathBuf::from(path);
    }

    default_data_dir().join("lichen.db")
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lichen"))
        .unwrap_or_else(|| PathBuf::from("./lichen_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults_match_public_archive() {
        let config = HeritageConfig::default();
        assert_eq!(config.base_url, "https://archive.softwareheritage.org");
        assert_eq!(config.uri, "/api/1/content/sha256:");
        assert_eq!(config.license_suffix, "/license/");
        assert_eq!(config.max_sleep_secs, 1500);
        assert!(config.proxy.is_empty());
    }

    #[test]
    #[serial]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            base_url = "http://localhost:9090"
            max_sleep_secs = 60

            [proxy]
            http = "http://proxy.example.com:3128"
            no_proxy = "localhost,127.0.0.1"
            "#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.base_url, "http://localhost:9090");
        assert_eq!(config.max_sleep_secs, 60);
        // Unset fields keep their defaults
        assert_eq!(config.uri, "/api/1/content/sha256:");
        assert_eq!(config.proxy.http.as_deref(), Some("http://proxy.example.com:3128"));
        assert_eq!(config.proxy.no_proxy.as_deref(), Some("localhost,127.0.0.1"));
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/lichen.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_proxy_env_overrides() {
        std::env::set_var("LICHEN_HTTPS_PROXY", "http://env-proxy:8080");
        let config = load_config(None).unwrap();
        std::env::remove_var("LICHEN_HTTPS_PROXY");

        assert_eq!(config.proxy.https.as_deref(), Some("http://env-proxy:8080"));
    }

    #[test]
    #[serial]
    fn test_database_path_priority() {
        let cli = PathBuf::from("/tmp/explicit.db");
        assert_eq!(resolve_database_path(Some(&cli)), cli);

        std::env::set_var("LICHEN_DATABASE", "/tmp/from-env.db");
        assert_eq!(resolve_database_path(None), PathBuf::from("/tmp/from-env.db"));
        std::env::remove_var("LICHEN_DATABASE");

        assert!(resolve_database_path(None).ends_with("lichen.db"));
    }
}
