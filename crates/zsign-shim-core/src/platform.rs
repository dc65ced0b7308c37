//! Host platform detection and prebuilt binary resolution.
//!
//! The set of supported platforms is closed: it is whatever prebuilt zsign
//! binaries ship next to the shim. Each one is named `<base>_<os>_<arch>`,
//! e.g. `./bin/zsign_macos_arm64`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, ZsignError};

/// Default location prefix of the prebuilt binaries.
pub const DEFAULT_BIN_BASE: &str = "./bin/zsign";

/// Operating system family with a prebuilt binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
}

impl OsFamily {
    const LINUX_NAMES: &'static [&'static str] = &["Linux", "linux"];
    const MACOS_NAMES: &'static [&'static str] = &["Darwin", "macos"];
    const WINDOWS_NAMES: &'static [&'static str] = &["Windows_NT", "Windows", "windows"];

    /// Maps a reported OS name to a family.
    ///
    /// Accepts both `uname`-style names (`Linux`, `Darwin`, `Windows_NT`,
    /// `Windows`) and Rust target names (`linux`, `macos`, `windows`).
    pub fn from_reported(name: &str) -> Result<Self> {
        if Self::LINUX_NAMES.contains(&name) {
            Ok(OsFamily::Linux)
        } else if Self::MACOS_NAMES.contains(&name) {
            Ok(OsFamily::MacOs)
        } else if Self::WINDOWS_NAMES.contains(&name) {
            Ok(OsFamily::Windows)
        } else {
            Err(ZsignError::UnsupportedOs(name.to_string()))
        }
    }

    /// Suffix used in the binary file name.
    pub fn suffix(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::MacOs => "macos",
            OsFamily::Windows => "win",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// CPU architecture with a prebuilt binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuArch {
    Arm64,
    X64,
}

impl CpuArch {
    /// Maps a reported architecture name (`arm64`/`aarch64`, `x64`/`x86_64`).
    pub fn from_reported(name: &str) -> Result<Self> {
        match name {
            "arm64" | "aarch64" => Ok(CpuArch::Arm64),
            "x64" | "x86_64" => Ok(CpuArch::X64),
            other => Err(ZsignError::UnsupportedArch(other.to_string())),
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            CpuArch::Arm64 => "arm64",
            CpuArch::X64 => "x64",
        }
    }
}

impl std::fmt::Display for CpuArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// The (OS family, CPU architecture) pair that selects a prebuilt binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: OsFamily,
    pub arch: CpuArch,
}

impl PlatformKey {
    pub fn new(os: OsFamily, arch: CpuArch) -> Self {
        Self { os, arch }
    }

    /// Builds a key from reported names. The OS is checked before the arch.
    pub fn from_reported(os: &str, arch: &str) -> Result<Self> {
        let os = OsFamily::from_reported(os)?;
        let arch = CpuArch::from_reported(arch)?;
        Ok(Self { os, arch })
    }

    /// Detects the key of the running host.
    pub fn detect() -> Result<Self> {
        Self::from_reported(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// All keys a binary may ship for.
    pub fn all() -> [PlatformKey; 6] {
        use CpuArch::*;
        use OsFamily::*;
        [
            Self::new(Linux, Arm64),
            Self::new(Linux, X64),
            Self::new(MacOs, Arm64),
            Self::new(MacOs, X64),
            Self::new(Windows, Arm64),
            Self::new(Windows, X64),
        ]
    }
}

impl std::fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

/// Strategy mapping a platform key to a candidate binary path.
///
/// The candidate is not checked here; [`resolve_binary`] verifies it exists.
pub trait BinaryLocator {
    fn locate(&self, key: PlatformKey) -> PathBuf;
}

impl<F> BinaryLocator for F
where
    F: Fn(PlatformKey) -> PathBuf,
{
    fn locate(&self, key: PlatformKey) -> PathBuf {
        self(key)
    }
}

/// Locates binaries by the `<base>_<os>_<arch>` naming convention.
#[derive(Debug, Clone)]
pub struct ConventionLocator {
    base: PathBuf,
}

impl ConventionLocator {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl Default for ConventionLocator {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_BASE)
    }
}

impl BinaryLocator for ConventionLocator {
    fn locate(&self, key: PlatformKey) -> PathBuf {
        // Suffixes are appended to the final component, not joined as a new one.
        let mut path = OsString::from(self.base.as_os_str());
        path.push("_");
        path.push(key.os.suffix());
        path.push("_");
        path.push(key.arch.suffix());
        PathBuf::from(path)
    }
}

/// Resolves the binary for `key`, failing if the candidate is not on disk.
pub fn resolve_binary(key: PlatformKey, locator: &dyn BinaryLocator) -> Result<PathBuf> {
    let path = locator.locate(key);

    if !path.exists() {
        return Err(ZsignError::BinaryNotFound {
            os: key.os.suffix(),
            arch: key.arch.suffix(),
            path,
        });
    }

    tracing::debug!("Resolved zsign binary for {}: {}", key, path.display());
    Ok(path)
}

/// A resolved platform: the detected key and the binary that exists for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub key: PlatformKey,
    pub binary: PathBuf,
}

impl Platform {
    /// Detects the host and resolves its binary through `locator`.
    pub fn resolve(locator: &dyn BinaryLocator) -> Result<Self> {
        let key = PlatformKey::detect()?;
        Self::resolve_for(key, locator)
    }

    /// Resolves the binary for an explicit key.
    pub fn resolve_for(key: PlatformKey, locator: &dyn BinaryLocator) -> Result<Self> {
        let binary = resolve_binary(key, locator)?;
        Ok(Self { key, binary })
    }
}
