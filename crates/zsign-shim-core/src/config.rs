//! Shim configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::platform::DEFAULT_BIN_BASE;

/// Configuration held by a client and its dispatcher.
///
/// Nothing here is global: two clients in one process may use different
/// binaries or debug settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimConfig {
    /// Prefix of the prebuilt binaries (`<bin_base>_<os>_<arch>`).
    pub bin_base: PathBuf,
    /// Log the resolved binary path before every invocation.
    pub debug: bool,
    /// Kill zsign if it runs longer than this. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            bin_base: PathBuf::from(DEFAULT_BIN_BASE),
            debug: false,
            timeout: None,
        }
    }
}

impl ShimConfig {
    /// Loads configuration from environment variables with defaults.
    ///
    /// - `ZSIGN_BIN_BASE`: binary prefix
    /// - `ZSIGN_DEBUG`: `1`, `true`, `yes` or `on` enables debug output
    /// - `ZSIGN_TIMEOUT_SECS`: per-invocation timeout, `0` disables it
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Overrides fields of `self` with any environment variables that are set.
    pub fn apply_env(self) -> Self {
        let mut config = self;

        if let Ok(val) = std::env::var("ZSIGN_BIN_BASE") {
            if !val.is_empty() {
                config.bin_base = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("ZSIGN_DEBUG") {
            if let Some(v) = parse_bool(&val) {
                config.debug = v;
            }
        }

        if let Ok(val) = std::env::var("ZSIGN_TIMEOUT_SECS") {
            if let Ok(v) = val.trim().parse::<u64>() {
                config.timeout = (v > 0).then(|| Duration::from_secs(v));
            }
        }

        config
    }

    pub fn with_bin_base(mut self, bin_base: impl Into<PathBuf>) -> Self {
        self.bin_base = bin_base.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parses common boolean spellings used in environment variables.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShimConfig::default();
        assert_eq!(config.bin_base, PathBuf::from("./bin/zsign"));
        assert!(!config.debug);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_from_env_unset() {
        temp_env::with_vars_unset(
            ["ZSIGN_BIN_BASE", "ZSIGN_DEBUG", "ZSIGN_TIMEOUT_SECS"],
            || {
                assert_eq!(ShimConfig::from_env(), ShimConfig::default());
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("ZSIGN_BIN_BASE", Some("/opt/zsign/bin/zsign")),
                ("ZSIGN_DEBUG", Some("TRUE")),
                ("ZSIGN_TIMEOUT_SECS", Some("120")),
            ],
            || {
                let config = ShimConfig::from_env();
                assert_eq!(config.bin_base, PathBuf::from("/opt/zsign/bin/zsign"));
                assert!(config.debug);
                assert_eq!(config.timeout, Some(Duration::from_secs(120)));
            },
        );
    }

    #[test]
    fn test_from_env_invalid_values_ignored() {
        temp_env::with_vars(
            [
                ("ZSIGN_BIN_BASE", Some("")),
                ("ZSIGN_DEBUG", Some("maybe")),
                ("ZSIGN_TIMEOUT_SECS", Some("soon")),
            ],
            || {
                assert_eq!(ShimConfig::from_env(), ShimConfig::default());
            },
        );
    }

    #[test]
    fn test_apply_env_keeps_unset_fields() {
        temp_env::with_vars(
            [
                ("ZSIGN_BIN_BASE", None),
                ("ZSIGN_DEBUG", Some("1")),
                ("ZSIGN_TIMEOUT_SECS", None),
            ],
            || {
                let base = ShimConfig::default()
                    .with_bin_base("/srv/zsign")
                    .with_timeout(Some(Duration::from_secs(30)));
                let config = base.apply_env();
                assert_eq!(config.bin_base, PathBuf::from("/srv/zsign"));
                assert!(config.debug);
                assert_eq!(config.timeout, Some(Duration::from_secs(30)));
            },
        );
    }

    #[test]
    fn test_zero_timeout_disables() {
        temp_env::with_var("ZSIGN_TIMEOUT_SECS", Some("0"), || {
            assert!(ShimConfig::from_env().timeout.is_none());
        });
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("2"), None);
    }
}
