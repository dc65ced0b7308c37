//! High-level zsign client.
//!
//! [`ZSign`] composes the platform resolver with a [`Dispatcher`] and exposes
//! the three zsign operations: help, version and sign.

use std::ffi::OsStr;

use crate::config::ShimConfig;
use crate::dispatch::{Dispatcher, ProcessDispatcher};
use crate::error::{Result, ZsignError};
use crate::options::{owned_args, SignOptions, HELP_ARGS, VERSION_ARGS};
use crate::platform::{BinaryLocator, ConventionLocator, Platform};

/// Client for the prebuilt zsign binary.
///
/// Construction resolves the binary for the host and fails if none ships for
/// it. After that, every operation starts an independent child process.
///
/// # Example
///
/// ```no_run
/// use zsign_shim_core::{ShimConfig, SignOptions, ZSign};
///
/// # async fn run() -> zsign_shim_core::Result<()> {
/// let zsign = ZSign::new(ShimConfig::from_env())?;
///
/// let options = SignOptions::new()
///     .pkey("./test.p12")
///     .prov("./test.mobileprovision")
///     .password("test")
///     .zip_level(9)
///     .output("./signed.ipa");
///
/// let output = zsign.sign("./testIpa.ipa", &options).await?;
/// println!("{output}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ZSign<D = ProcessDispatcher> {
    dispatcher: D,
}

impl ZSign<ProcessDispatcher> {
    /// Resolves the binary by naming convention under `config.bin_base`.
    pub fn new(config: ShimConfig) -> Result<Self> {
        let locator = ConventionLocator::new(config.bin_base.clone());
        Self::with_locator(config, &locator)
    }

    /// Resolves the binary through a custom locator.
    pub fn with_locator(config: ShimConfig, locator: &dyn BinaryLocator) -> Result<Self> {
        let platform = Platform::resolve(locator)?;
        tracing::debug!(
            "Using zsign for {} at {}",
            platform.key,
            platform.binary.display()
        );
        Ok(Self {
            dispatcher: ProcessDispatcher::new(platform.binary, config),
        })
    }
}

impl<D: Dispatcher> ZSign<D> {
    /// Wraps an existing dispatcher without resolving anything.
    pub fn with_dispatcher(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Returns the zsign help text.
    pub async fn show_help(&self) -> Result<String> {
        self.dispatcher.invoke(owned_args(HELP_ARGS)).await
    }

    /// Returns the raw zsign version output.
    pub async fn get_version(&self) -> Result<String> {
        self.dispatcher.invoke(owned_args(VERSION_ARGS)).await
    }

    /// Returns the version token from the zsign version output.
    pub async fn version(&self) -> Result<String> {
        let output = self.get_version().await?;
        parse_version(&output)
            .map(str::to_string)
            .ok_or_else(|| ZsignError::UnexpectedOutput(output.trim().to_string()))
    }

    /// Signs `input` with `options` and returns the relayed zsign output.
    pub async fn sign(&self, input: impl AsRef<OsStr>, options: &SignOptions) -> Result<String> {
        let args = options.to_args(input);
        self.dispatcher.invoke(args).await
    }
}

/// Extracts the second space-delimited token, e.g. `0.7` from `version: 0.7`.
pub fn parse_version(output: &str) -> Option<&str> {
    output
        .split(' ')
        .nth(1)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
