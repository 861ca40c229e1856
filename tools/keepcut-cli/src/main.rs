//! Keepcut CLI: cut-list editing and export from the command line.
//!
//! Usage:
//!   keepcut init <VIDEO>          Create an edit session for a video
//!   keepcut info <SESSION>        Show trim window, cuts and keep segments
//!   keepcut analyze <SESSION>     Seed AI cuts from a transcript
//!   keepcut cut <ACTION>          Add, toggle, remove cuts or move the trim window
//!   keepcut export <SESSION>      Render the kept material to MP4 or GIF

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use keepcut_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "keepcut",
    about = "Trim and cut videos by removing filler words, silences and manual ranges",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an edit session for a video
    Init {
        /// Source video
        video: PathBuf,

        /// Session file (defaults to <video>.keepcut.json)
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Source duration in seconds (skips ffprobe)
        #[arg(long)]
        duration: Option<f64>,

        /// Overwrite an existing session
        #[arg(long)]
        force: bool,
    },

    /// Show trim window, cuts and keep segments
    Info {
        /// Session file
        session: PathBuf,

        /// Print keep segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Seed AI cuts from a transcript analysis
    Analyze {
        /// Session file
        session: PathBuf,

        /// Transcript JSON (words with timings, optional silences)
        #[arg(short, long)]
        transcript: PathBuf,

        /// Derive silences from gaps between words when none are given
        #[arg(long)]
        detect_silences: bool,

        /// Minimum gap treated as silence (seconds)
        #[arg(long)]
        min_silence: Option<f64>,
    },

    /// Edit cuts and the trim window
    Cut {
        #[command(subcommand)]
        action: CutAction,
    },

    /// Export the kept material
    Export {
        /// Session file
        session: PathBuf,

        /// Source video (defaults to the session's source)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: mp4, gif
        #[arg(long)]
        format: Option<String>,

        /// Output resolution: 480p, 720p, 1080p
        #[arg(long)]
        resolution: Option<String>,

        /// Output frame rate: 15, 24, 30, 60
        #[arg(long)]
        fps: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum CutAction {
    /// Add a manual cut
    Add {
        session: PathBuf,
        start: f64,
        end: f64,
    },

    /// Toggle a cut on or off
    Toggle { session: PathBuf, id: u64 },

    /// Remove a manual cut
    Remove { session: PathBuf, id: u64 },

    /// Move the trim window
    Trim {
        session: PathBuf,

        /// New trim start (seconds)
        #[arg(long)]
        start: Option<f64>,

        /// New trim end (seconds)
        #[arg(long)]
        end: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_problem) = AppConfig::load_checked();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    keepcut_common::logging::init_logging(&logging);
    if let Some(e) = config_problem {
        tracing::warn!(error = %e, "Using default configuration");
    }

    match cli.command {
        Commands::Init {
            video,
            session,
            duration,
            force,
        } => commands::init::run(video, session, duration, force),
        Commands::Info { session, json } => commands::info::run(session, json),
        Commands::Analyze {
            session,
            transcript,
            detect_silences,
            min_silence,
        } => {
            let mut analysis = config.analysis.clone();
            if let Some(min) = min_silence {
                analysis.min_silence_secs = min;
            }
            commands::analyze::run(session, transcript, detect_silences, &analysis)
        }
        Commands::Cut { action } => commands::cut::run(action, &config.timeline),
        Commands::Export {
            session,
            input,
            output,
            format,
            resolution,
            fps,
        } => {
            let mut defaults = config.export.clone();
            if let Some(format) = format {
                defaults.format = format;
            }
            if let Some(resolution) = resolution {
                defaults.resolution = resolution;
            }
            if let Some(fps) = fps {
                defaults.fps = fps;
            }
            commands::export::run(session, input, output, &defaults).await
        }
    }
}
