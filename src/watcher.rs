//! # Comment Watcher
//!
//! Polls the player's window on a fixed interval and, whenever the song
//! changes, resolves it against the remote service and hands the result to
//! the display.
//!
//! ## Tick
//!
//! ```text
//! window title ──▶ SongIdentity ──changed?──▶ search ──▶ detail ──▶ comments ──▶ display
//!                       │ no                     │ none      │ none
//!                       ▼                        ▼           ▼
//!                     no-op                 abort cycle, keep previous display
//! ```
//!
//! The last observed identity is updated *before* resolving, so a song that
//! fails to resolve is not retried on every tick. Empty comments still reach
//! the display.
//!
//! ## Control
//!
//! Everything runs on the calling thread. Other threads (a hotkey listener,
//! a stdin reader) only send [`Intent`]s over a channel; the loop waits on
//! that channel with the poll interval as timeout, so a timeout is a tick
//! and a message is an intent.

use log::{debug, error, info, warn};
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::client::RemoteClient;
use crate::display::CommentDisplay;
use crate::error::WatchError;
use crate::models::{CommentRecord, SongIdentity, SongRecord};
use crate::window::WindowSource;

/// Requests from outside the polling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Suspend or resume ticking, hiding or showing the display.
    TogglePause,
    /// Forget the current song so the next tick resolves it again.
    Refresh,
    /// Empty the remote client's caches.
    ClearCache,
    Quit,
}

impl Intent {
    /// Parse a one-letter console command.
    pub fn from_command(command: &str) -> Option<Self> {
        match command.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(Self::TogglePause),
            "r" | "refresh" => Some(Self::Refresh),
            "c" | "clear" => Some(Self::ClearCache),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Resolution step that came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Detail,
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Paused,
    /// No player window, or its title isn't a song.
    NoSong,
    /// Same song as last time; nothing was requested.
    Unchanged,
    /// The display got a new song with this many comments.
    Displayed { comments: usize },
    /// Resolution stopped at this stage; the display was left alone.
    Aborted(Stage),
}

/// Search, then detail, then comments. Comments may be empty.
pub fn resolve_song(
    client: &mut RemoteClient,
    song: &SongIdentity,
) -> Result<(SongRecord, Vec<CommentRecord>), Stage> {
    let Some(remote_id) = client.search_song(&song.name, &song.artist) else {
        warn!("No remote match for {song}");
        return Err(Stage::Search);
    };

    let Some(record) = client.get_song_detail(&remote_id) else {
        warn!("No detail for {song} (id {remote_id})");
        return Err(Stage::Detail);
    };

    let comments = client.get_hot_comments(&remote_id);
    if comments.is_empty() {
        warn!("No hot comments for {record}");
    }

    Ok((record, comments))
}

/// Polling coordinator between the window source, the remote client and a
/// display.
pub struct CommentWatcher {
    source: WindowSource,
    client: RemoteClient,
    display: Box<dyn CommentDisplay>,
    interval: Duration,
    last_seen: Option<SongIdentity>,
    paused: bool,
}

impl CommentWatcher {
    pub fn new(
        source: WindowSource,
        client: RemoteClient,
        display: Box<dyn CommentDisplay>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            client,
            display,
            interval,
            last_seen: None,
            paused: false,
        }
    }

    /// The identity the last tick acted on.
    pub fn last_seen(&self) -> Option<&SongIdentity> {
        self.last_seen.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    /// Check that the player is running, then tick once without waiting
    /// for the first interval.
    ///
    /// # Errors
    ///
    /// [`WatchError::PlayerNotRunning`] when no player window exists, and
    /// [`WatchError::PermissionDenied`] when windows can't be enumerated.
    pub fn start(&mut self) -> Result<TickOutcome, WatchError> {
        if self.source.find_player_window()?.is_none() {
            error!("Player window not found, not starting");
            return Err(WatchError::PlayerNotRunning);
        }
        self.tick()
    }

    /// One polling step.
    pub fn tick(&mut self) -> Result<TickOutcome, WatchError> {
        if self.paused {
            return Ok(TickOutcome::Paused);
        }

        let Some(song) = self.source.get_current_song()? else {
            debug!("No song in the player window");
            return Ok(TickOutcome::NoSong);
        };

        if self.last_seen.as_ref() == Some(&song) {
            return Ok(TickOutcome::Unchanged);
        }

        match &self.last_seen {
            Some(previous) => info!("Song changed: {previous} -> {song}"),
            None => info!("Now playing: {song}"),
        }
        self.last_seen = Some(song.clone());

        Ok(self.resolve(&song))
    }

    fn resolve(&mut self, song: &SongIdentity) -> TickOutcome {
        match resolve_song(&mut self.client, song) {
            Ok((record, comments)) => {
                self.display.update(&record, &comments);
                TickOutcome::Displayed {
                    comments: comments.len(),
                }
            }
            Err(stage) => {
                info!("Keeping previous display, resolution stopped at {stage:?}");
                TickOutcome::Aborted(stage)
            }
        }
    }

    /// Apply one intent. `Break` means stop the loop.
    pub fn handle_intent(&mut self, intent: Intent) -> ControlFlow<()> {
        match intent {
            Intent::TogglePause => {
                self.paused = !self.paused;
                self.display.set_visible(!self.paused);
                info!("{}", if self.paused { "Paused" } else { "Resumed" });
            }
            Intent::Refresh => {
                info!("Refresh requested");
                self.last_seen = None;
            }
            Intent::ClearCache => self.client.clear_cache(),
            Intent::Quit => {
                info!("Quit requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Start, then poll until [`Intent::Quit`].
    ///
    /// Errors from individual ticks are logged and polling continues; only
    /// the startup check is fatal. If every sender is dropped the loop keeps
    /// polling on its own.
    pub fn run(&mut self, intents: Receiver<Intent>) -> Result<(), WatchError> {
        info!("Starting comment watcher");
        let outcome = self.start()?;
        debug!("Startup tick: {outcome:?}");

        info!("Polling every {}s", self.interval.as_secs_f64());
        let mut next_tick = Instant::now() + self.interval;
        let mut channel_open = true;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());

            let intent = if channel_open {
                match intents.recv_timeout(wait) {
                    Ok(intent) => Some(intent),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("Control channel closed");
                        channel_open = false;
                        continue;
                    }
                }
            } else {
                thread::sleep(wait);
                None
            };

            if let Some(intent) = intent {
                if self.handle_intent(intent).is_break() {
                    break;
                }
                continue;
            }

            next_tick = Instant::now() + self.interval;
            match self.tick() {
                Ok(outcome) => debug!("Tick: {outcome:?}"),
                Err(e) => error!("Error in watch loop: {e}"),
            }
        }

        info!("Comment watcher stopped");
        Ok(())
    }
}
