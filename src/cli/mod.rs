//! CLI Module
//!
//! Command-line interface for rendering audio files offline through the
//! effect pipeline.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default block size for offline rendering
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Louder - saturation, reverb, tone and width in one block pipeline
#[derive(Parser, Debug)]
#[command(name = "louder-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a WAV file through the effect
    #[command(name = "render")]
    Render {
        /// Input WAV file (mono or stereo)
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// JSON preset applied before any --set
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Parameter override as name=value (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Frames per processing block
        #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Output bit depth (16, 24 or 32 for float)
        #[arg(long, default_value_t = 32)]
        bit_depth: u16,

        /// Do not append the reverb tail
        #[arg(long)]
        no_tail: bool,
    },

    /// List parameters with their ranges and defaults
    #[command(name = "params")]
    Params {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
