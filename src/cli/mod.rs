//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

use crate::source::SourceKind;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for latest, archive and processed files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory that receives a copy of every processed file
    #[arg(long, global = true)]
    pub mirror_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and process the GeoSphere nowcast
    Nowcast {},
    /// Fetch and process the Open-Meteo forecast
    Forecast {},
    /// Fetch and process every source
    Fetch {},
    /// Generate an activity report from today's forecast
    Report {},
    /// Generate an activity report from a saved forecast document
    Analyze {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print summary statistics of a processed document
    Summary {
        /// Source whose processed file to read
        #[arg(long, value_enum, default_value = "nowcast")]
        source: SourceKind,
        /// Read this file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

// -- Tests -------------------------------------------------------------------
