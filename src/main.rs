//! Louder CLI
//!
//! Offline renderer for the Louder effect pipeline.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use louder::cli::commands::{self, RenderSettings};
use louder::cli::{Cli, Commands};
use louder::engine::ExportFormat;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Louder v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Render {
            input,
            output,
            preset,
            set,
            block_size,
            bit_depth,
            no_tail,
        } => {
            let store = commands::build_store(preset.as_deref(), &set)
                .context("failed to build parameter set")?;
            let settings = RenderSettings {
                block_size,
                format: ExportFormat { bit_depth },
                append_tail: !no_tail,
            };
            let report = commands::render(&input, &output, &store, &settings)
                .with_context(|| format!("failed to render {}", input.display()))?;
            println!(
                "Wrote {} ({} frames, {} blocks)",
                output.display(),
                report.frames,
                report.blocks
            );
        }
        Commands::Params { json } => commands::list_params(json)?,
    }

    Ok(())
}
