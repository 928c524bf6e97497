//! Screenlog CLI: periodic screenshots compiled into time-lapse reports.
//!
//! Usage:
//!   screenlog [--collect] [OPTIONS]   Capture until interrupted, then compile
//!   screenlog --report [OPTIONS]      Compile frames already on disk
//!   screenlog check                   Check displays and encoder
//!   screenlog config [--init]         Show or create the config file

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use screenlog_common::clock::CaptureClock;
use screenlog_common::config::{AppConfig, LoggingConfig};
use screenlog_session_model::config::{CaptureConfig, ExportMode, ResizeStrategy};

mod commands;

#[derive(Parser)]
#[command(
    name = "screenlog",
    about = "Periodic screenshots compiled into time-lapse report videos",
    version,
    author,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
struct SessionArgs {
    /// Capture screenshots until interrupted, then compile (default)
    #[arg(long, conflicts_with = "report")]
    collect: bool,

    /// Compile existing screenshots without capturing
    #[arg(long)]
    report: bool,

    /// Capture all monitors as one composite image
    #[arg(long)]
    merge: bool,

    /// Pad smaller frames with black borders instead of scaling them
    #[arg(long = "no-upscale", visible_alias = "center")]
    no_upscale: bool,

    /// Do not draw the timestamp label
    #[arg(long)]
    no_datetime: bool,

    /// Export a zip of the screenshots instead of videos
    #[arg(long)]
    img: bool,

    /// Stamp frames with UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Directory for in-flight screenshots
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Seconds between captures
    #[arg(long)]
    interval: Option<u64>,

    /// Image quality (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: Option<u8>,

    /// Frame rate of compiled videos
    #[arg(long)]
    fps: Option<u32>,

    /// Output file path (per-monitor videos get an _mN suffix)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check displays and video encoder availability
    Check,

    /// Show the effective configuration file
    Config {
        /// Write the default configuration if no file exists
        #[arg(long)]
        init: bool,
    },
}

impl SessionArgs {
    /// Overlay flags on the file defaults and freeze the session config.
    fn into_config(self, app: &AppConfig) -> anyhow::Result<CaptureConfig> {
        let mut config = CaptureConfig::from_defaults(&app.capture);

        if let Some(dir) = self.dir {
            config.frames_dir = dir;
        }
        if let Some(secs) = self.interval {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        config.merge_monitors = self.merge;
        config.label = !self.no_datetime;
        config.output = self.output;
        if self.no_upscale {
            config.resize = ResizeStrategy::Pad;
        }
        if self.img {
            config.export = ExportMode::Archive;
        }
        if self.utc {
            config.clock = CaptureClock::Utc;
        }

        Ok(config.validated()?)
    }
}

fn logging_config(app: &AppConfig, verbose: bool) -> LoggingConfig {
    let level = if verbose {
        "debug".to_string()
    } else {
        app.logging.level.clone()
    };
    LoggingConfig {
        level,
        json: app.logging.json,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (app, config_error) = match AppConfig::load() {
        Ok(app) => (app, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    screenlog_common::logging::init_logging(&logging_config(&app, cli.verbose));
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Ignoring unusable config file, using defaults");
    }

    match cli.command {
        Some(Commands::Check) => commands::check::run(),
        Some(Commands::Config { init }) => commands::config::run(&app, init),
        None => {
            let report_only = cli.session.report;
            let config = cli.session.into_config(&app)?;
            if report_only {
                commands::report::run(config).await
            } else {
                commands::collect::run(config).await
            }
        }
    }
}
