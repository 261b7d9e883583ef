//! Command-line interface.
//!
//! `login` and `callback` drive the two halves of the Spotify PKCE flow;
//! `run` takes a playlist through resolution, processing and archiving.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::ModelChoice;

/// Archive written by `run` when `--output` is not given.
pub const DEFAULT_ARCHIVE_NAME: &str = "instrumentals.zip";

/// Separation model quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    /// Pick from GPU and core count
    #[default]
    Auto,
    /// Low-capacity model
    Tiny,
    /// High-capacity model
    Medium,
}

impl QualityArg {
    pub fn choice(self) -> ModelChoice {
        match self {
            QualityArg::Auto => ModelChoice::Auto,
            QualityArg::Tiny => ModelChoice::Tiny,
            QualityArg::Medium => ModelChoice::Medium,
        }
    }
}

/// Which resolved tracks `run` processes.
///
/// Track numbers are 1-based, as printed in the track listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessSelection {
    #[default]
    All,
    None,
    Numbers(Vec<usize>),
}

impl ProcessSelection {
    /// Returns true if the track at zero-based `index` is selected.
    pub fn includes(&self, index: usize) -> bool {
        match self {
            ProcessSelection::All => true,
            ProcessSelection::None => false,
            ProcessSelection::Numbers(numbers) => numbers.contains(&(index + 1)),
        }
    }
}

impl FromStr for ProcessSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => return Ok(ProcessSelection::All),
            "none" => return Ok(ProcessSelection::None),
            _ => {}
        }

        let numbers = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                match part.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(format!("invalid track number {:?}", part)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProcessSelection::Numbers(numbers))
    }
}

impl fmt::Display for ProcessSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessSelection::All => write!(f, "all"),
            ProcessSelection::None => write!(f, "none"),
            ProcessSelection::Numbers(numbers) => {
                let joined: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

/// instrumentify: instrumental versions of a Spotify playlist from legal sources
#[derive(Parser, Debug)]
#[command(name = "instrumentify")]
#[command(about = "Find legally downloadable audio for a playlist and strip the vocals")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a Spotify login and print the URL to open
    Login,

    /// Finish a login with the code from the redirect
    Callback {
        /// The `code` query parameter of the redirect URL
        #[arg(long)]
        code: String,
    },

    /// Resolve, process and archive a playlist
    ///
    /// Jamendo is only searched when INSTRUMENTIFY_JAMENDO_CLIENT_ID is set.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Playlist URL, spotify:playlist: URI or id
    #[arg(short, long)]
    pub playlist: String,

    /// Separation model quality
    #[arg(short, long, value_enum, default_value_t = QualityArg::Auto)]
    pub quality: QualityArg,

    /// Tracks to process: all, none, or comma-separated track numbers
    #[arg(long, default_value_t = ProcessSelection::All)]
    pub process: ProcessSelection,

    /// Output archive path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Access token to use instead of the stored one
    #[arg(long)]
    pub token: Option<String>,

    /// Model cache directory
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl RunArgs {
    /// Returns the effective archive path.
    ///
    /// Defaults to "instrumentals.zip" in the current directory if not specified.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_NAME))
    }
}
