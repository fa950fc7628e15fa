//! Pinchwave CLI
//!
//! Command-line front end: offline scripted renders and take inspection.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use pinchwave::cli::commands::{self, RenderOptions};
use pinchwave::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Pinchwave v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Pinchwave v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Render {
            input,
            script,
            take,
            monitor,
            config,
            record_from_ms,
            record_to_ms,
        } => {
            let opts = RenderOptions {
                input,
                script,
                take,
                monitor,
                config,
                record_from_ms,
                record_to_ms,
            };
            commands::render(&opts)
                .map(|_| ())
                .with_context(|| format!("render of {} failed", opts.input.display()))
        }
        Commands::DefaultConfig => Ok(commands::default_config()?),
        Commands::DemoScript => Ok(commands::demo_script()?),
        Commands::InspectTake { path } => {
            commands::inspect_take(&path).with_context(|| format!("cannot inspect {}", path.display()))
        }
    }
}
