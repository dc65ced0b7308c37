//! Sign options and argument vector construction.
//!
//! Every option maps 1:1 onto a zsign flag. Nothing is validated here: zsign
//! itself decides which combinations are required.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

/// Arguments for printing the zsign help text.
pub const HELP_ARGS: &[&str] = &["--help"];

/// Arguments for printing the zsign version.
pub const VERSION_ARGS: &[&str] = &["-v"];

const PASSWORD_FLAG: &str = "--password";

/// Options forwarded to `zsign` when signing a package.
///
/// # Example
///
/// ```
/// use zsign_shim_core::SignOptions;
///
/// let options = SignOptions::new()
///     .pkey("./dev.p12")
///     .prov("./dev.mobileprovision")
///     .password("secret")
///     .zip_level(9)
///     .output("./signed.ipa");
///
/// let args = options.to_args("./app.ipa");
/// assert_eq!(args.last().unwrap(), "./app.ipa");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Private key (or .p12) used for signing.
    pub pkey: Option<PathBuf>,
    /// Provisioning profile.
    pub prov: Option<PathBuf>,
    /// Certificate file.
    pub cert: Option<PathBuf>,
    pub debug: bool,
    /// Force signing without cache when signing a folder.
    pub force: bool,
    pub output: Option<PathBuf>,
    /// Password for the private key or p12.
    pub password: Option<SecretString>,
    pub bundle_id: Option<String>,
    pub bundle_name: Option<String>,
    pub bundle_version: Option<String>,
    pub entitlements: Option<PathBuf>,
    /// Compression level of the output zip.
    pub zip_level: Option<u32>,
    /// Dynamic library to inject.
    pub dylib: Option<PathBuf>,
    /// Inject the dylib as a weak reference.
    pub weak: bool,
    /// Install the package after signing.
    pub install: bool,
    pub quiet: bool,
}

impl SignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pkey(mut self, path: impl AsRef<Path>) -> Self {
        self.pkey = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn prov(mut self, path: impl AsRef<Path>) -> Self {
        self.prov = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn cert(mut self, path: impl AsRef<Path>) -> Self {
        self.cert = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the key password. It is zeroized on drop and redacted in logs.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn bundle_id(mut self, id: impl Into<String>) -> Self {
        self.bundle_id = Some(id.into());
        self
    }

    pub fn bundle_name(mut self, name: impl Into<String>) -> Self {
        self.bundle_name = Some(name.into());
        self
    }

    pub fn bundle_version(mut self, version: impl Into<String>) -> Self {
        self.bundle_version = Some(version.into());
        self
    }

    pub fn entitlements(mut self, path: impl AsRef<Path>) -> Self {
        self.entitlements = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn zip_level(mut self, level: u32) -> Self {
        self.zip_level = Some(level);
        self
    }

    pub fn dylib(mut self, path: impl AsRef<Path>) -> Self {
        self.dylib = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn weak(mut self, enabled: bool) -> Self {
        self.weak = enabled;
        self
    }

    pub fn install(mut self, enabled: bool) -> Self {
        self.install = enabled;
        self
    }

    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Builds the zsign argument vector for signing `input`.
    ///
    /// Flags are emitted in a fixed order and `input` is always last. Empty
    /// values are skipped, while a `zip_level` of 0 is still passed through.
    pub fn to_args(&self, input: impl AsRef<OsStr>) -> Vec<OsString> {
        let mut args = ArgList::default();

        args.value("--pkey", self.pkey.as_deref());
        args.value("--prov", self.prov.as_deref());
        args.value("--cert", self.cert.as_deref());
        args.flag("--debug", self.debug);
        args.flag("--force", self.force);
        args.value("--output", self.output.as_deref());
        args.value(
            PASSWORD_FLAG,
            self.password.as_ref().map(|p| p.expose_secret()),
        );
        args.value("--bundle_id", self.bundle_id.as_deref());
        args.value("--bundle_name", self.bundle_name.as_deref());
        args.value("--bundle_version", self.bundle_version.as_deref());
        args.value("--entitlements", self.entitlements.as_deref());
        if let Some(level) = self.zip_level {
            args.push_pair("--zip_level", level.to_string());
        }
        args.value("--dylib", self.dylib.as_deref());
        args.flag("--weak", self.weak);
        args.flag("--install", self.install);
        args.flag("--quiet", self.quiet);

        args.0.push(input.as_ref().to_os_string());
        args.0
    }
}

#[derive(Default)]
struct ArgList(Vec<OsString>);

impl ArgList {
    fn value<V: AsRef<OsStr> + ?Sized>(&mut self, flag: &str, value: Option<&V>) {
        if let Some(value) = value {
            let value: &OsStr = value.as_ref();
            if !value.is_empty() {
                self.push_pair(flag, value);
            }
        }
    }

    fn flag(&mut self, flag: &str, enabled: bool) {
        if enabled {
            self.0.push(flag.into());
        }
    }

    fn push_pair(&mut self, flag: &str, value: impl Into<OsString>) {
        self.0.push(flag.into());
        self.0.push(value.into());
    }
}

/// Returns a printable copy of `args` with secret values masked.
pub fn redact_args(args: &[OsString]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut mask_next = false;

    for arg in args {
        if mask_next {
            out.push("***".to_string());
            mask_next = false;
            continue;
        }
        mask_next = arg == PASSWORD_FLAG;
        out.push(arg.to_string_lossy().into_owned());
    }

    out
}

/// Converts static argument lists into an owned vector.
pub fn owned_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}
