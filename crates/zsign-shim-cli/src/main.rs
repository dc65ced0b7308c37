use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zsign_shim_core::{ProcessDispatcher, ShimConfig, ZSign};

mod commands;
mod config;

use commands::{
    config::{handle_config_command, ConfigCommands},
    platform::handle_platform_command,
    print_output,
    sign::{handle_sign_command, SignArgs},
};

#[derive(Parser)]
#[command(name = "zsign-shim")]
#[command(about = "Run the prebuilt zsign binary for this platform", long_about = None)]
#[command(version, disable_help_subcommand = true)]
struct Cli {
    /// Prefix of the prebuilt zsign binaries (`<base>_<os>_<arch>`)
    #[arg(long, global = true)]
    bin_base: Option<PathBuf>,

    /// Log the resolved zsign binary before each invocation
    #[arg(long, global = true)]
    shim_debug: bool,

    /// Kill zsign after this many seconds (0 disables)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the zsign help text
    Help,

    /// Show the zsign version
    Version {
        /// Print only the version number
        #[arg(long)]
        short: bool,
    },

    /// Sign a package with zsign
    Sign(SignArgs),

    /// Show the detected platform and binary path
    Platform,

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

async fn show_help(zsign: &ZSign<ProcessDispatcher>) -> Result<()> {
    let output = zsign.show_help().await.context("Failed to run zsign --help")?;
    print_output(&output);
    Ok(())
}

async fn show_version(zsign: &ZSign<ProcessDispatcher>, short: bool) -> Result<()> {
    if short {
        let version = zsign.version().await.context("Failed to read zsign version")?;
        println!("{}", version);
    } else {
        let output = zsign.get_version().await.context("Failed to run zsign -v")?;
        print_output(&output);
    }
    Ok(())
}

fn open_zsign(config: ShimConfig) -> Result<ZSign<ProcessDispatcher>> {
    let base = config.bin_base.clone();
    ZSign::new(config).with_context(|| {
        format!(
            "Failed to locate zsign binary under {}. Run 'zsign-shim platform' for details.",
            base.display()
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so relayed zsign output stays clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zsign_shim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Config commands don't need a binary, handle separately
    if let Commands::Config(cmd) = cli.command {
        return handle_config_command(cmd);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config file: {:#}", e);
        None
    });

    let flags = config::ConfigFlags {
        bin_base: cli.bin_base,
        debug: cli.shim_debug,
        timeout_secs: cli.timeout,
    };
    let shim_config = config::resolve_config(&flags, file_config);

    match cli.command {
        Commands::Platform => handle_platform_command(&shim_config)?,
        Commands::Help => show_help(&open_zsign(shim_config)?).await?,
        Commands::Version { short } => show_version(&open_zsign(shim_config)?, short).await?,
        Commands::Sign(args) => handle_sign_command(&open_zsign(shim_config)?, args).await?,
        Commands::Config(_) => unreachable!(), // Handled above
    }

    Ok(())
}
