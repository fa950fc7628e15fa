//! CLI Module
//!
//! Command-line interface for Pinchwave.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pinchwave - bend a looping track with one hand
#[derive(Parser, Debug)]
#[command(name = "pinchwave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a scripted gesture performance over an audio file
    #[command(name = "render")]
    Render {
        /// Input audio file (WAV)
        #[arg(short, long)]
        input: PathBuf,

        /// Gesture script (JSON); the built-in demo when omitted
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Where to write the recorded take
        #[arg(short, long)]
        take: Option<PathBuf>,

        /// Where to write everything the monitor played
        #[arg(short, long)]
        monitor: Option<PathBuf>,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Start recording at this script time
        #[arg(long, default_value_t = 0)]
        record_from_ms: u64,

        /// Stop recording at this script time; whole script when omitted
        #[arg(long)]
        record_to_ms: Option<u64>,
    },

    /// Print the default configuration as JSON
    #[command(name = "default-config")]
    DefaultConfig,

    /// Print the built-in demo gesture script as JSON
    #[command(name = "demo-script")]
    DemoScript,

    /// Show duration, format and SHA-256 of a take
    #[command(name = "inspect-take")]
    InspectTake {
        /// Path to the take
        path: PathBuf,
    },
}
