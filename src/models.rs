//! # Data Model
//!
//! Plain value types that flow through the pipeline:
//!
//! - [`SongIdentity`] - what the window title says is playing
//! - [`SongRecord`] - the remote service's view of that song
//! - [`CommentRecord`] - one hot comment, in server ranking order
//!
//! All of them are immutable once built; a new resolution cycle replaces
//! them wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Song name and artist as parsed from the player's window title.
///
/// Equality on both fields is what the watcher uses for change detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongIdentity {
    pub name: String,
    pub artist: String,
}

impl SongIdentity {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
        }
    }
}

impl fmt::Display for SongIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.artist)
    }
}

/// Song metadata returned by the detail lookup.
///
/// `remote_id` is the join key between detail and comment lookups and is
/// never empty. `genres` may be empty; the display substitutes a default
/// label instead of storing one (see [`SongRecord::genres_label`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub remote_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub genres: Vec<String>,
    pub duration_seconds: u64,
}

impl SongRecord {
    /// Join at most `max_tags` genres with `" / "`, or `default_genre` when
    /// there are none.
    pub fn genres_label(&self, max_tags: usize, default_genre: &str) -> String {
        if self.genres.is_empty() || max_tags == 0 {
            return default_genre.to_string();
        }

        self.genres
            .iter()
            .take(max_tags)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Duration formatted as `m:ss`.
    pub fn duration_label(&self) -> String {
        let minutes = self.duration_seconds / 60;
        let seconds = self.duration_seconds % 60;
        format!("{minutes}:{seconds:02}")
    }
}

impl fmt::Display for SongRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.artist)
    }
}

/// One hot comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub content: String,
    pub author: String,
    pub like_count: u64,
    /// Local time, minute precision: `YYYY-MM-DD HH:MM`.
    pub posted_at: String,
}

impl CommentRecord {
    /// Like count as shown to the user: `342`, `1.2k`, `15.0k`.
    pub fn likes_label(&self) -> String {
        if self.like_count >= 1000 {
            format!("{:.1}k", self.like_count as f64 / 1000.0)
        } else {
            self.like_count.to_string()
        }
    }

    /// First `max_chars` characters of the content, with `...` appended
    /// when something was cut off.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

impl fmt::Display for CommentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.author, self.preview(30))
    }
}
