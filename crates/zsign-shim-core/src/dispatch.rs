//! Invocation of the external zsign binary.
//!
//! Provides the [`Dispatcher`] trait and the process-backed implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::ShimConfig;
use crate::error::{Result, ZsignError};
use crate::options::redact_args;

/// Runs zsign with a prepared argument vector.
///
/// Each call resolves exactly once: with the relayed output on success, or
/// with the error that ended the invocation.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn invoke(&self, args: Vec<OsString>) -> Result<String>;
}

/// Dispatcher that spawns the resolved binary as a child process.
///
/// Arguments are handed to the OS as a vector. No shell is involved, so
/// values containing whitespace or metacharacters reach zsign unchanged.
#[derive(Debug, Clone)]
pub struct ProcessDispatcher {
    binary: PathBuf,
    config: ShimConfig,
}

impl ProcessDispatcher {
    pub fn new(binary: impl Into<PathBuf>, config: ShimConfig) -> Self {
        Self {
            binary: binary.into(),
            config,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }
}

#[async_trait]
impl Dispatcher for ProcessDispatcher {
    async fn invoke(&self, args: Vec<OsString>) -> Result<String> {
        if self.config.debug {
            tracing::info!(target: "zsign_shim", "Binary: {}", self.binary.display());
        }
        tracing::debug!(args = ?redact_args(&args), "Invoking zsign");

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ZsignError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        // Dropping the wait future on timeout kills the child via kill_on_drop.
        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ZsignError::Timeout(limit))??,
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::debug!(
                "zsign failed with status {}: {}",
                output.status,
                stderr.trim()
            );
            return Err(ZsignError::Exit {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(relay_output(stdout, stderr))
    }
}

/// Picks the text relayed to the caller: stdout, or stderr when stdout is empty.
pub fn relay_output(stdout: String, stderr: String) -> String {
    if stdout.is_empty() {
        stderr
    } else {
        stdout
    }
}
