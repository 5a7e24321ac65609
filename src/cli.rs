use crate::state::app_settings::{FeedSource, Profile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Laughing Legends tournament console")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "LEGENDS_API_URL", default_value = legends_api::client::DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Console profile
    #[arg(long, env = "LEGENDS_PROFILE", value_enum, default_value_t = Profile::Admin)]
    pub profile: Profile,

    /// Refresh interval in seconds (defaults per profile)
    #[arg(long, env = "LEGENDS_REFRESH_SECS")]
    pub refresh_secs: Option<u64>,

    /// Roster endpoint (defaults per profile)
    #[arg(long, env = "LEGENDS_SOURCE", value_enum)]
    pub source: Option<FeedSource>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, env = "LEGENDS_LOG")]
    pub log_level: Option<String>,

    /// Directory for exported files
    #[arg(long, env = "LEGENDS_EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Export the current roster without starting the terminal UI
    Export {
        #[clap(subcommand)]
        format: ExportFormat,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum ExportFormat {
    /// Participant table as LaughingLegends_Participants.pdf
    Pdf {
        /// Output directory (overrides --export-dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Static HTML report of all tables and counters
    Html {
        /// Output file (defaults to <export-dir>/laughing_legends_report.html)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
