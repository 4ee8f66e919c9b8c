//! Configuration file management for cadence.
//!
//! Provides a TOML-based config file at `~/.config/cadence/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cadence_backend::BackendConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub backend: BackendSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendSection {
    pub url: String,
    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the cadence config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/cadence` or `~/.config/cadence`.
/// We intentionally ignore the platform-specific `dirs::config_dir()`
/// (which returns `~/Library/Application Support` on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("cadence");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cadence")
}

/// Return the path to the cadence config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Return the state directory holding the session file and the kv
/// cache: `--session-dir` if given, else `$XDG_STATE_HOME/cadence` or
/// `~/.local/state/cadence`.
pub fn state_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("cadence");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("state")
        .join("cadence")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // Set permissions to 0600 (owner read/write only) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct CadenceConfig {
    pub backend: BackendConfig,
}

impl CadenceConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - URL: `cli_url` > `CADENCE_BACKEND_URL` env > `config_file.backend.url` > `BackendConfig::DEFAULT_URL`
    /// - Timeout: `CADENCE_BACKEND_TIMEOUT_SECS` env > `config_file.backend.timeout_secs` > none
    pub fn resolve(cli_url: Option<&str>) -> Self {
        let file_config = load_config().ok();

        let (url, source) = if let Some(url) = cli_url {
            (url.to_string(), "--backend-url flag")
        } else if let Ok(url) = std::env::var("CADENCE_BACKEND_URL") {
            (url, "CADENCE_BACKEND_URL env var")
        } else if let Some(ref cfg) = file_config {
            (cfg.backend.url.clone(), "config file")
        } else {
            (BackendConfig::DEFAULT_URL.to_string(), "default")
        };
        debug!(%url, source, "resolved backend url");

        let mut backend = BackendConfig::new(url);
        backend.timeout_secs = std::env::var("CADENCE_BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or_else(|| file_config.as_ref().and_then(|cfg| cfg.backend.timeout_secs));

        Self { backend }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cadence").join("config.toml");

        let original = ConfigFile {
            backend: BackendSection {
                url: "http://testhost:9000".to_string(),
                timeout_secs: Some(45),
            },
        };

        save_config_to(&path, &original).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.backend.url, original.backend.url);
        assert_eq!(loaded.backend.timeout_secs, Some(45));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let cfg = ConfigFile {
            backend: BackendSection {
                url: "http://localhost:8000".to_string(),
                timeout_secs: None,
            },
        };
        save_config_to(&path, &cfg).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn unset_timeout_is_omitted_from_the_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let cfg = ConfigFile {
            backend: BackendSection {
                url: "http://localhost:8000".to_string(),
                timeout_secs: None,
            },
        };
        save_config_to(&path, &cfg).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(
            !contents.contains("timeout_secs"),
            "unexpected key in: {contents}"
        );
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("cadence/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }

    #[test]
    fn state_dir_override_wins() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = state_dir(Some(tmp.path()));
        assert_eq!(dir, tmp.path());
    }
}
