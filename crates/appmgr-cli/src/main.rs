use std::path::PathBuf;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod dispatch;
mod render;

use dispatch::run_cli;

#[derive(Parser, Debug)]
#[command(name = "appmgr")]
#[command(about = "Install, update and track web apps", long_about = None)]
struct Cli {
    /// Path to an appmgr TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the apps root from the config.
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every tracked app as JSON.
    List,
    /// Print one app record as JSON.
    Get {
        name: String,
    },
    /// Print the install, update and progress state of an app.
    Status {
        name: String,
    },
    /// Install the app whose manifest is served at UPDATE_URL.
    Install {
        update_url: String,
    },
    /// Check for and apply an update.
    Update {
        name: String,
    },
    /// Look for an update; it is applied only if the app allows auto download.
    CheckUpdate {
        name: String,
    },
    /// Remove an app and its files.
    Uninstall {
        name: String,
    },
    /// Allow or forbid unattended update downloads for an app.
    AutoDownload {
        name: String,
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        allowed: bool,
    },
    /// Register the preloaded apps listed in the config.
    RegisterPreloaded,
}

fn main() -> Result<()> {
    init_tracing();
    run_cli(Cli::parse())
}

fn init_tracing() {
    let filter = std::env::var("APPMGR_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests;
