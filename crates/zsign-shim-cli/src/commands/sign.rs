//! `zsign-shim sign` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zsign_shim_core::{Dispatcher, SignOptions, ZSign};

use super::print_output;

/// Arguments forwarded to zsign when signing a package.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Package to sign (IPA, app folder or Mach-O)
    pub input: PathBuf,

    /// Private key or .p12 file
    #[arg(short = 'k', long)]
    pub pkey: Option<PathBuf>,

    /// Provisioning profile (.mobileprovision)
    #[arg(short = 'm', long)]
    pub prov: Option<PathBuf>,

    /// Certificate file (PEM or DER)
    #[arg(short = 'c', long)]
    pub cert: Option<PathBuf>,

    /// Have zsign write debug output
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Force sign without cache when signing a folder
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Path of the signed output package
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Password for the private key or .p12 file
    #[arg(short = 'p', long, env = "ZSIGN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// New bundle identifier
    #[arg(short = 'b', long, alias = "bundle_id")]
    pub bundle_id: Option<String>,

    /// New bundle display name
    #[arg(short = 'n', long, alias = "bundle_name")]
    pub bundle_name: Option<String>,

    /// New bundle version
    #[arg(short = 'r', long, alias = "bundle_version")]
    pub bundle_version: Option<String>,

    /// Entitlements plist to embed
    #[arg(short = 'e', long)]
    pub entitlements: Option<PathBuf>,

    /// Compression level of the output zip (0-9)
    #[arg(short = 'z', long, alias = "zip_level")]
    pub zip_level: Option<u32>,

    /// Dynamic library to inject
    #[arg(short = 'l', long)]
    pub dylib: Option<PathBuf>,

    /// Inject the dylib as a weak reference
    #[arg(short = 'w', long)]
    pub weak: bool,

    /// Install the package after signing
    #[arg(short = 'i', long)]
    pub install: bool,

    /// Suppress zsign output
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl SignArgs {
    /// Splits the arguments into the input package and its sign options.
    pub fn into_parts(self) -> (PathBuf, SignOptions) {
        let options = SignOptions {
            pkey: self.pkey,
            prov: self.prov,
            cert: self.cert,
            debug: self.debug,
            force: self.force,
            output: self.output,
            password: self.password.map(Into::into),
            bundle_id: self.bundle_id,
            bundle_name: self.bundle_name,
            bundle_version: self.bundle_version,
            entitlements: self.entitlements,
            zip_level: self.zip_level,
            dylib: self.dylib,
            weak: self.weak,
            install: self.install,
            quiet: self.quiet,
        };
        (self.input, options)
    }
}

pub async fn handle_sign_command<D: Dispatcher>(zsign: &ZSign<D>, args: SignArgs) -> Result<()> {
    let (input, options) = args.into_parts();

    tracing::debug!("Signing {}", input.display());
    let output = zsign
        .sign(&input, &options)
        .await
        .with_context(|| format!("Failed to sign {}", input.display()))?;

    print_output(&output);
    Ok(())
}
