//! `zsign-shim config` commands for managing CLI configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use zsign_shim_core::platform::DEFAULT_BIN_BASE;

use crate::config::{config_path, load_config, CliConfig};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create a new config file
    Init {
        /// Prefix of the prebuilt zsign binaries
        #[arg(long)]
        bin_base: Option<String>,

        /// Log the resolved binary before each invocation
        #[arg(long)]
        debug: bool,

        /// Per-invocation timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Show config file path
    Path,
}

pub fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init {
            bin_base,
            debug,
            timeout_secs,
            force,
        } => init_config(
            CliConfig {
                bin_base,
                debug: debug.then_some(true),
                timeout_secs,
            },
            force,
        ),
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => show_path(),
    }
}

/// Create a new config file.
fn init_config(config: CliConfig, force: bool) -> Result<()> {
    let path = config_path()?;

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            #[cfg(unix)]
            {
                let permissions = fs::Permissions::from_mode(0o700);
                fs::set_permissions(dir, permissions)?;
            }
        }
    }

    write_config(&path, &config)?;

    println!("Created config file at {}", path.display());
    Ok(())
}

/// Display current configuration.
fn show_config() -> Result<()> {
    let path = config_path()?;

    let config = match load_config()? {
        Some(c) => c,
        None => {
            println!("No config file found at {}", path.display());
            println!();
            println!("Using defaults:");
            println!("  Binary base: {}", DEFAULT_BIN_BASE);
            println!();
            println!("Run 'zsign-shim config init' to create a config file.");
            return Ok(());
        }
    };

    println!("Config file: {}", path.display());
    println!(
        "  Binary base: {}",
        config.bin_base.as_deref().unwrap_or(DEFAULT_BIN_BASE)
    );
    println!("  Debug:       {}", config.debug.unwrap_or(false));
    match config.timeout_secs {
        Some(secs) if secs > 0 => println!("  Timeout:     {}s", secs),
        _ => println!("  Timeout:     (none)"),
    }

    Ok(())
}

/// Show the config file path.
fn show_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

/// Write config to file with proper HUML formatting and secure permissions.
fn write_config(path: &Path, config: &CliConfig) -> Result<()> {
    let content = serialize_to_huml(config);

    fs::write(path, &content).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        let permissions = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, permissions)?;
    }

    Ok(())
}

/// Serialize config to HUML format.
fn serialize_to_huml(config: &CliConfig) -> String {
    let mut output = String::new();

    output.push_str("%HUML v0.2.0\n");
    if let Some(ref base) = config.bin_base {
        output.push_str(&format!("bin_base: \"{}\"\n", escape(base)));
    }
    if let Some(debug) = config.debug {
        output.push_str(&format!("debug: {}\n", debug));
    }
    if let Some(secs) = config.timeout_secs {
        output.push_str(&format!("timeout_secs: {}\n", secs));
    }

    output
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_to_huml() {
        let config = CliConfig {
            bin_base: Some("/opt/zsign/bin/zsign".to_string()),
            debug: Some(true),
            timeout_secs: Some(300),
        };

        let huml = serialize_to_huml(&config);

        assert!(huml.starts_with("%HUML v0.2.0\n"));
        assert!(huml.contains("bin_base: \"/opt/zsign/bin/zsign\""));
        assert!(huml.contains("debug: true"));
        assert!(huml.contains("timeout_secs: 300"));
    }

    #[test]
    fn test_serialize_skips_unset() {
        let huml = serialize_to_huml(&CliConfig::default());
        assert_eq!(huml, "%HUML v0.2.0\n");
    }

    #[test]
    fn test_escape_windows_path() {
        assert_eq!(escape(r"C:\zsign\zsign"), r"C:\\zsign\\zsign");
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.huml");
        fs::write(&path, "%HUML v0.2.0\n").unwrap();

        temp_env::with_var("ZSIGN_SHIM_CONFIG", Some(path.as_os_str()), || {
            let err = init_config(CliConfig::default(), false).unwrap_err();
            assert!(err.to_string().contains("already exists"));
        });
    }

    #[test]
    fn test_init_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.huml");

        temp_env::with_var("ZSIGN_SHIM_CONFIG", Some(path.as_os_str()), || {
            let config = CliConfig {
                timeout_secs: Some(10),
                ..Default::default()
            };
            init_config(config, false).unwrap();
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("timeout_secs: 10"));
    }
}
