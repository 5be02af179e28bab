//! Hot comments for the song playing in the NetEase Cloud Music desktop
//! player.
//!
//! The player's window title reads `"Song - Artist"`. The library polls it,
//! and on every change searches the remote catalog, fetches song details and
//! the hot comments, and hands them to a display.
//!
//! Core modules:
//! - [`window`] - Player window discovery and title parsing
//! - [`client`] - Search, detail and hot-comment lookups with retry and caching
//! - [`crypto`] - Request encryption for the comments endpoint
//! - [`watcher`] - The polling coordinator
//! - [`display`] - Where resolved songs go
//!
//! ### Supporting Modules
//!
//! - [`models`] - Song and comment records
//! - [`cache`] - Bounded LRU caches
//! - [`transport`] - HTTP, clock and rate-limiting seams
//! - [`config`] - Configuration file handling
//! - [`error`] - Error types
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use music_comment::client::RemoteClient;
//! use music_comment::config::AppConfig;
//!
//! let config = AppConfig::default();
//! let mut client = RemoteClient::from_config(&config)?;
//!
//! if let Some(id) = client.search_song("浪人情歌", "伍佰") {
//!     if let Some(song) = client.get_song_detail(&id) {
//!         println!("{song}");
//!     }
//!     for comment in client.get_hot_comments(&id) {
//!         println!("{comment}");
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Failure Handling
//!
//! Lookups never return errors. Transport failures are retried with
//! exponential backoff and then reported as "absent" (`None` or an empty
//! list), with the details in the log. Only the watcher's startup check
//! fails hard, with a [`error::WatchError`].
//!
//! ## Testing
//!
//! Network and window access sit behind traits ([`transport::Transport`],
//! [`transport::Clock`], [`window::WindowSystem`]) so the whole pipeline runs
//! against fakes in the test suite.

pub mod cache;
pub mod cli;
pub mod client;
pub mod completion;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod models;
pub mod transport;
pub mod watcher;
pub mod window;
