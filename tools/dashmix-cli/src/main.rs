//! DashMix CLI - browse dashcam events, record interaction sessions and
//! export composed videos.
//!
//! Usage:
//!   dashmix scan <DIR>                   List events in a clip folder
//!   dashmix info <DIR>                   Show one event's cameras and clips
//!   dashmix record <DIR> -o <FILE>       Drive a live session from a script
//!   dashmix compile <DIR> -t <FILE>      Print the composition plan as JSON
//!   dashmix validate <FILE>              Sanity-check a saved timeline
//!   dashmix export <DIR>                 Render an event to MP4
//!   dashmix check                        Check ffmpeg/ffprobe availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dashmix_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "dashmix",
    about = "Multi-camera dashcam viewer and composer",
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
    /// List the events found in a dashcam drive or folder
    Scan {
        /// Root directory to scan
        dir: PathBuf,

        /// Clip folder kind: RecentClips, SentryClips or SavedClips
        #[arg(long)]
        folder: Option<String>,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the cameras and clip durations of one event
    Info {
        /// Root directory to scan
        dir: PathBuf,

        /// Event index in newest-first order
        #[arg(short, long, default_value = "0")]
        event: usize,

        /// Clip folder kind
        #[arg(long)]
        folder: Option<String>,
    },

    /// Drive a live session from a command script and save its timeline
    Record {
        /// Root directory to scan
        dir: PathBuf,

        /// Timeline file to write (JSONL)
        #[arg(short, long)]
        output: PathBuf,

        /// Command script; reads stdin when omitted
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Event index in newest-first order
        #[arg(short, long, default_value = "0")]
        event: usize,

        /// Clip folder kind
        #[arg(long)]
        folder: Option<String>,
    },

    /// Compile a timeline against an event and print the plan
    Compile {
        /// Root directory to scan
        dir: PathBuf,

        /// Saved timeline (JSONL); the standard layout is used when omitted
        #[arg(short, long)]
        timeline: Option<PathBuf>,

        /// Event index in newest-first order
        #[arg(short, long, default_value = "0")]
        event: usize,

        /// Clip folder kind
        #[arg(long)]
        folder: Option<String>,

        /// Export mode: standard or custom
        #[arg(long)]
        mode: Option<String>,

        /// Override the probed event duration (seconds)
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Sanity-check a saved timeline
    Validate {
        /// Path to the timeline file
        path: PathBuf,

        /// Compile against this duration (seconds) and report segments
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Render an event to a single MP4
    Export {
        /// Root directory to scan
        dir: PathBuf,

        /// Saved timeline (JSONL) for custom exports
        #[arg(short, long)]
        timeline: Option<PathBuf>,

        /// Event index in newest-first order
        #[arg(short, long, default_value = "0")]
        event: usize,

        /// Clip folder kind
        #[arg(long)]
        folder: Option<String>,

        /// Export mode: standard or custom
        #[arg(long)]
        mode: Option<String>,

        /// Output resolution as WIDTHxHEIGHT
        #[arg(long)]
        resolution: Option<String>,

        /// x264 constant rate factor
        #[arg(long)]
        crf: Option<u8>,

        /// x264 preset
        #[arg(long)]
        preset: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the render tools are installed
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    dashmix_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Scan { dir, folder, json } => commands::scan::run(&config, dir, folder, json),
        Commands::Info { dir, event, folder } => {
            commands::info::run(&config, dir, event, folder).await
        }
        Commands::Record {
            dir,
            output,
            script,
            event,
            folder,
        } => commands::record::run(&config, dir, output, script, event, folder).await,
        Commands::Compile {
            dir,
            timeline,
            event,
            folder,
            mode,
            duration,
        } => commands::compile::run(&config, dir, timeline, event, folder, mode, duration).await,
        Commands::Validate { path, duration } => commands::validate::run(path, duration),
        Commands::Export {
            dir,
            timeline,
            event,
            folder,
            mode,
            resolution,
            crf,
            preset,
            output,
        } => {
            commands::export::run(
                &config,
                commands::export::ExportArgs {
                    dir,
                    timeline,
                    event,
                    folder,
                    mode,
                    resolution,
                    crf,
                    preset,
                    output,
                },
            )
            .await
        }
        Commands::Check => commands::check::run().await,
    }
}
