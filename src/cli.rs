//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `music-comment` binary.
//!
//! ## Commands
//!
//! - `watch`: Follow the player and print hot comments on every song change
//! - `once`: Resolve whatever is playing right now and exit
//! - `lookup`: Resolve a song given by name and artist, no player needed
//! - `parse`: Show how a window title would be read
//! - `config`: Show, locate or create the configuration file
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! music-comment watch --interval 5
//! music-comment lookup "浪人情歌" "伍佰"
//! music-comment config init
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// `--config` is global so it can follow any subcommand.
#[derive(Parser, Debug)]
#[command(name = "music-comment")]
#[command(about = "Hot comments for whatever the NetEase Cloud Music player is playing")]
#[command(version)]
pub struct Args {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "MUSIC_COMMENT_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow the player and show hot comments for each new song
    ///
    /// Refuses to start if the player window can't be found. While running,
    /// type a letter and press enter to control it:
    ///
    ///   p  pause / resume
    ///   r  refresh the current song
    ///   c  clear cached lookups
    ///   q  quit
    Watch {
        /// Seconds between window checks (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show hot comments for the song playing right now, then exit
    Once,

    /// Look up a song by name and artist without the player
    Lookup {
        /// Song name as the player shows it
        #[arg(value_hint = clap::ValueHint::Other)]
        song: String,

        /// Artist name as the player shows it
        #[arg(value_hint = clap::ValueHint::Other)]
        artist: String,
    },

    /// Parse a window title into song and artist
    ///
    /// Exits with an error if the title isn't of the form "Song - Artist".
    Parse {
        /// Window title, e.g. "晴天 - 周杰伦"
        title: String,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    ///
    /// Usage: music-comment completion bash > ~/.local/share/bash-completion/completions/music-comment
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration file actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Print the configuration file location
    Path,

    /// Write a configuration file containing the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
