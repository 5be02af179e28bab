//! # music-comment
//!
//! Shows the hot comments of whatever the NetEase Cloud Music desktop player
//! is playing, and follows along as songs change.
//!
//! ## Usage
//!
//! ```bash
//! # Follow the player
//! music-comment watch
//!
//! # One-off lookups
//! music-comment once
//! music-comment lookup "浪人情歌" "伍佰"
//!
//! # Configuration
//! music-comment config init
//! music-comment config show
//! ```

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use music_comment::cli::{self, ConfigAction};
use music_comment::client::RemoteClient;
use music_comment::completion;
use music_comment::config::{self, AppConfig};
use music_comment::display::{CommentDisplay, ConsoleDisplay};
use music_comment::error::WatchError;
use music_comment::models::SongIdentity;
use music_comment::watcher::{self, CommentWatcher, Intent};
use music_comment::window::{self, WindowSource};

/// Print the guidance for a fatal watcher error, then hand it back.
fn explain(e: WatchError) -> WatchError {
    eprintln!("{e}");
    match &e {
        WatchError::PermissionDenied(_) => {
            eprintln!();
            eprintln!("Window enumeration was refused by the operating system.");
            eprintln!("  - Windows: start the terminal with \"Run as administrator\"");
            eprintln!("  - Linux: make sure wmctrl can reach your X session (DISPLAY is set)");
        }
        WatchError::PlayerNotRunning => {
            eprintln!();
            eprintln!("No player window was found. To fix this:");
            eprintln!("  1. Start NetEase Cloud Music and play a song");
            eprintln!("  2. Run `music-comment parse \"<window title>\"` to check the title format");
        }
    }
    e
}

/// Read one-letter commands from stdin and forward them as intents.
///
/// The thread ends on EOF or when the watcher is gone; the watcher keeps
/// polling either way.
fn spawn_console_controls(tx: Sender<Intent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match Intent::from_command(&line) {
                Some(intent) => {
                    if tx.send(intent).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("Unknown command '{}'. Use p, r, c or q.", line.trim()),
            }
        }
        debug!("Console controls stopped");
    });
}

/// Resolve one song and print it, or say why nothing was printed.
fn show_song(config: &AppConfig, song: &SongIdentity) -> Result<()> {
    let mut client = RemoteClient::from_config(config)?;
    match watcher::resolve_song(&mut client, song) {
        Ok((record, comments)) => {
            ConsoleDisplay::stdout(config).update(&record, &comments);
            Ok(())
        }
        Err(stage) => bail!("Could not resolve {song} (stopped at {stage:?})"),
    }
}

fn main() -> Result<()> {
    // RUST_LOG overrides; default to info so song changes are visible
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => config::get_config_path()?,
    };
    let config = AppConfig::load(&config_path)?;
    debug!("Using config {config:?}");

    match args.command {
        cli::Command::Watch { interval } => {
            let interval = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.poll_interval());

            let mut watcher = CommentWatcher::new(
                WindowSource::native(config.window_class.clone()),
                RemoteClient::from_config(&config)?,
                Box::new(ConsoleDisplay::stdout(&config)),
                interval,
            );

            let (tx, rx) = mpsc::channel();
            spawn_console_controls(tx);
            println!("Watching the player. Commands: p = pause, r = refresh, c = clear cache, q = quit");

            watcher.run(rx).map_err(explain)?;
        }
        cli::Command::Once => {
            let source = WindowSource::native(config.window_class.clone());
            if source.find_player_window().map_err(explain)?.is_none() {
                return Err(explain(WatchError::PlayerNotRunning).into());
            }

            match source.get_current_song().map_err(explain)? {
                Some(song) => {
                    info!("Now playing: {song}");
                    show_song(&config, &song)?;
                }
                None => println!("The player is open but nothing is playing."),
            }
        }
        cli::Command::Lookup { song, artist } => {
            show_song(&config, &SongIdentity::new(song, artist))?;
        }
        cli::Command::Parse { title } => match window::parse_window_title(&title) {
            Some((song, artist)) => {
                println!("song:   {song}");
                println!("artist: {artist}");
            }
            None => bail!("'{title}' is not of the form \"Song - Artist\""),
        },
        cli::Command::Config { action } => run_config(action, &config_path, &config)?,
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}

fn run_config(action: ConfigAction, path: &Path, config: &AppConfig) -> Result<()> {
    match action {
        ConfigAction::Show => println!("{}", serde_json::to_string_pretty(config)?),
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists. Use --force to overwrite it.",
                    path.display()
                );
            }
            AppConfig::default().save(path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
