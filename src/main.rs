//! followcam - keeps the Echo VR spectator camera on a chosen player
//!
//! Entry point: parses the command line, loads settings, and dispatches to
//! the console or a one-shot command.

mod app;
mod console;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use followcam_core::UiFlag;
use followcam_director::FollowerConfig;
use followcam_integration::{GameApiClient, DEFAULT_BASE_URL};

use crate::app::SpectatorApp;
use crate::settings::Settings;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "followcam")]
#[command(version, about = "Keeps the Echo VR spectator camera on a chosen player", long_about = None)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the game's control API
    #[arg(long, env = "FOLLOWCAM_ENDPOINT", default_value = DEFAULT_BASE_URL)]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "2")]
    timeout_secs: u64,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow a player and take console commands
    Follow {
        /// Player to follow (defaults to the last one followed)
        player: Option<String>,
    },
    /// Print the live camera to player mapping
    Cameras,
    /// Set one overlay toggle
    Ui {
        /// ui, nameplates, minimap or mute
        flag: UiFlag,
        /// on or off
        #[arg(value_parser = console::parse_switch)]
        enabled: bool,
    },
    /// Push all saved overlay toggles to the game
    UiApply,
    /// List stored camera corrections
    Corrections,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let path = match args.config {
        Some(path) => path,
        None => Settings::default_path().context("Could not determine config directory")?,
    };
    let settings = Settings::load(path);
    info!("Using settings at {:?}", settings.path());

    let api = GameApiClient::new(&args.endpoint, Duration::from_secs(args.timeout_secs))
        .context("Failed to create game API client")?;
    info!("Game API at {}", api.base_url());

    let mut app = SpectatorApp::new(api, settings, FollowerConfig::default())?;

    match args.command {
        Command::Follow { player } => {
            let player = player.or_else(|| {
                let last = app.last_username();
                (!last.is_empty()).then(|| last.to_string())
            });
            console::run(&mut app, player)?;
        }
        Command::Cameras => {
            let assignments = app.camera_map()?;
            if assignments.is_empty() {
                println!("No players in match");
            }
            for a in assignments {
                println!("{:>2}  {:<6}  {}", a.camera, a.side, a.player);
            }
        }
        Command::Ui { flag, enabled } => {
            app.set_ui_flag(flag, enabled)?;
            println!("{}: {}", flag.description(), if enabled { "on" } else { "off" });
        }
        Command::UiApply => {
            let failures = app.apply_ui_settings();
            for (flag, e) in &failures {
                eprintln!("! {}: {}", flag.description(), e);
            }
            if !failures.is_empty() {
                anyhow::bail!("{} of {} UI settings failed to apply", failures.len(), UiFlag::ALL.len());
            }
            println!("Applied UI settings");
        }
        Command::Corrections => {
            let corrections = app.corrections();
            if corrections.is_empty() {
                println!("No corrections saved");
            }
            for (player, offset) in corrections {
                println!("{:+}  {}", offset, player);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "followcam={level},followcam_core={level},followcam_integration={level},followcam_director={level},warn",
            level = level
        ))
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}
