//! Voicetone - voice pitch analysis from the command line
//!
//! Loads a recording, extracts its pitch contour, splits the contour into
//! two speaker groups, and prints per-group statistics and vocal register.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use voicetone_core::config;
use voicetone_core::pipeline::{self, RunOptions};

/// Voice pitch analysis: speaker grouping and vocal register
#[derive(Parser)]
#[command(name = "voicetone")]
#[command(about = "Voice pitch analysis: speaker grouping and vocal register")]
#[command(version)]
struct Cli {
    /// Audio file to analyze (MP3, WAV, FLAC, OGG)
    input: PathBuf,

    /// Config file (default: ~/.config/voicetone/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path for the density plot
    #[arg(short = 'p', long, default_value = "pitch_distribution.png")]
    plot: PathBuf,

    /// Skip rendering the density plot
    #[arg(long)]
    no_plot: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    logger.filter_level(if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    logger.init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path);

    let options = RunOptions {
        plot_path: if cli.no_plot {
            None
        } else {
            Some(cli.plot.clone())
        },
    };

    let report = pipeline::analyze_file(&cli.input, &config, &options)
        .with_context(|| format!("Failed to analyze {:?}", cli.input))?;

    print!("{}", report);
    Ok(())
}
