//! Error types for the zsign shim.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Core error type for the shim.
///
/// Variants fall into two tiers. Startup errors come out of platform
/// resolution and leave the shim unusable. Per-call errors are returned from
/// a single invocation of the external binary.
#[derive(Error, Debug)]
pub enum ZsignError {
    #[error("OS type not supported: no zsign binary for '{0}'")]
    UnsupportedOs(String),

    #[error("Arch not supported: no zsign binary for '{0}'")]
    UnsupportedArch(String),

    #[error("Binary not found: no zsign binary for {os}/{arch} at {}", .path.display())]
    BinaryNotFound {
        os: &'static str,
        arch: &'static str,
        path: PathBuf,
    },

    #[error("Failed to run {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zsign exited with {}: {}", display_code(.code), .stderr.trim())]
    Exit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("zsign did not finish within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected zsign output: {0}")]
    UnexpectedOutput(String),
}

impl ZsignError {
    /// Returns true for errors raised while resolving the platform binary.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            ZsignError::UnsupportedOs(_)
                | ZsignError::UnsupportedArch(_)
                | ZsignError::BinaryNotFound { .. }
        )
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "a signal".to_string(),
    }
}

/// Result type alias for shim operations.
pub type Result<T> = std::result::Result<T, ZsignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_tier() {
        assert!(ZsignError::UnsupportedOs("FreeBSD".into()).is_startup());
        assert!(ZsignError::UnsupportedArch("ia32".into()).is_startup());
        assert!(ZsignError::BinaryNotFound {
            os: "linux",
            arch: "x64",
            path: PathBuf::from("./bin/zsign_linux_x64"),
        }
        .is_startup());
        assert!(!ZsignError::Timeout(Duration::from_secs(1)).is_startup());
    }

    #[test]
    fn test_exit_message_includes_code_and_stderr() {
        let err = ZsignError::Exit {
            code: Some(2),
            stdout: String::new(),
            stderr: ">>> Invalid password\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "zsign exited with exit code 2: >>> Invalid password"
        );

        let err = ZsignError::Exit {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
    }
}
