//! CLI configuration loading and resolution.
//!
//! Supports an optional config file at `~/.zsign-shim/config.huml` with
//! priority order: CLI flags > environment variables > config file > defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use zsign_shim_core::ShimConfig;

/// CLI configuration loaded from config.huml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CliConfig {
    /// Prefix of the prebuilt zsign binaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_base: Option<String>,
    /// Log the resolved binary before each invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Per-invocation timeout in seconds (0 disables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub bin_base: Option<PathBuf>,
    pub debug: bool,
    pub timeout_secs: Option<u64>,
}

/// Returns the default config file path (~/.zsign-shim/config.huml).
pub fn default_config_path() -> Result<PathBuf> {
    config_dir().map(|d| d.join("config.huml"))
}

/// Returns the config directory path (~/.zsign-shim).
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".zsign-shim"))
        .context("Could not determine home directory")
}

/// Returns the config file in effect, honouring `ZSIGN_SHIM_CONFIG`.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var("ZSIGN_SHIM_CONFIG") {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => default_config_path(),
    }
}

/// Load configuration from the config file.
///
/// Returns `Ok(None)` if the config file doesn't exist.
/// Returns an error if the file exists but is invalid.
pub fn load_config() -> Result<Option<CliConfig>> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: CliConfig = huml_rs::serde::from_str(&content)
        .with_context(|| format!("Invalid HUML in {}", path.display()))?;

    validate_config(&config)?;
    check_file_permissions(&path);

    Ok(Some(config))
}

fn validate_config(config: &CliConfig) -> Result<()> {
    if let Some(ref base) = config.bin_base {
        if base.trim().is_empty() {
            bail!("Config file has an empty bin_base");
        }
    }
    Ok(())
}

/// Warn if config file has overly permissive permissions (on Unix).
#[cfg(unix)]
fn check_file_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = std::fs::metadata(path) {
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            eprintln!(
                "Warning: {} has overly permissive permissions ({:o}). Consider running: chmod 600 {}",
                path.display(),
                mode & 0o777,
                path.display()
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &std::path::Path) {}

/// Resolve configuration by applying priority rules.
///
/// Priority order (highest to lowest):
/// 1. CLI flags (`--bin-base`, `--shim-debug`, `--timeout`)
/// 2. Environment variables (`ZSIGN_BIN_BASE`, `ZSIGN_DEBUG`, `ZSIGN_TIMEOUT_SECS`)
/// 3. Config file
/// 4. Hardcoded defaults (`./bin/zsign`, no debug, no timeout)
pub fn resolve_config(flags: &ConfigFlags, file_config: Option<CliConfig>) -> ShimConfig {
    let mut config = ShimConfig::default();

    if let Some(file) = file_config {
        if let Some(base) = file.bin_base {
            config.bin_base = PathBuf::from(base);
        }
        if let Some(debug) = file.debug {
            config.debug = debug;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = timeout_from_secs(secs);
        }
    }

    let mut config = config.apply_env();

    if let Some(ref base) = flags.bin_base {
        config.bin_base = base.clone();
    }
    if flags.debug {
        config.debug = true;
    }
    if let Some(secs) = flags.timeout_secs {
        config.timeout = timeout_from_secs(secs);
    }

    config
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
