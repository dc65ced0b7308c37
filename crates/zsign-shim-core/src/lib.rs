//! zsign shim core library.
//!
//! Resolves the prebuilt zsign binary for the host platform and runs it as a
//! child process for the help, version and sign operations.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod platform;

pub use client::{parse_version, ZSign};
pub use config::ShimConfig;
pub use dispatch::{Dispatcher, ProcessDispatcher};
pub use error::{Result, ZsignError};
pub use options::SignOptions;
pub use platform::{BinaryLocator, ConventionLocator, CpuArch, OsFamily, Platform, PlatformKey};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
