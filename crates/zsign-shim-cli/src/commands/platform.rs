//! `zsign-shim platform` command.

use anyhow::{Context, Result};
use zsign_shim_core::{BinaryLocator, ConventionLocator, PlatformKey, ShimConfig};

/// Print the detected platform and where its binary is expected.
///
/// Unlike the other commands this does not fail when the binary is missing,
/// so it can be used to diagnose an incomplete installation.
pub fn handle_platform_command(config: &ShimConfig) -> Result<()> {
    let key = PlatformKey::detect().context("This host has no prebuilt zsign binary")?;
    let locator = ConventionLocator::new(config.bin_base.clone());
    let binary = locator.locate(key);

    println!("Platform:    {}", key);
    println!("Binary base: {}", config.bin_base.display());
    println!(
        "Binary:      {} ({})",
        binary.display(),
        if binary.exists() { "found" } else { "missing" }
    );

    Ok(())
}
