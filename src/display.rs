//! # Display Layer
//!
//! The watcher hands each resolved `(song, comments)` pair to a
//! [`CommentDisplay`] and forgets about it. Rotation, animation and the like
//! belong to the display; the watcher only calls [`CommentDisplay::update`]
//! on a song change and [`CommentDisplay::set_visible`] on pause/resume.
//!
//! [`ConsoleDisplay`] is the display used by the command-line binary.

use log::warn;
use std::io::{self, Write};

use crate::config::AppConfig;
use crate::models::{CommentRecord, SongRecord};

/// Receiver of resolved songs.
pub trait CommentDisplay {
    /// Show a new song. `comments` may be empty.
    fn update(&mut self, song: &SongRecord, comments: &[CommentRecord]);

    /// Show or hide the display. Ignored by displays that can't hide.
    fn set_visible(&mut self, _visible: bool) {}
}

/// Prints each song and its top comments to a writer.
pub struct ConsoleDisplay<W: Write = io::Stdout> {
    out: W,
    max_genre_tags: usize,
    default_genre: String,
    max_comments: usize,
    visible: bool,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout(config: &AppConfig) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, config: &AppConfig) -> Self {
        Self {
            out,
            max_genre_tags: config.max_genre_tags,
            default_genre: config.default_genre.clone(),
            max_comments: config.max_displayed_comments,
            visible: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, song: &SongRecord, comments: &[CommentRecord]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "♫ {song}")?;
        writeln!(
            self.out,
            "  {} · {} · {}",
            song.album,
            song.genres_label(self.max_genre_tags, &self.default_genre),
            song.duration_label()
        )?;

        if comments.is_empty() {
            writeln!(self.out, "  (no hot comments)")?;
        }

        for (i, comment) in comments.iter().take(self.max_comments).enumerate() {
            writeln!(self.out)?;
            writeln!(self.out, "  {}. {}", i + 1, comment.content)?;
            writeln!(
                self.out,
                "     {}  ♥ {}  {}",
                comment.author,
                comment.likes_label(),
                comment.posted_at
            )?;
        }

        self.out.flush()
    }
}

impl<W: Write> CommentDisplay for ConsoleDisplay<W> {
    fn update(&mut self, song: &SongRecord, comments: &[CommentRecord]) {
        if !self.visible {
            return;
        }
        if let Err(e) = self.render(song, comments) {
            warn!("Failed to write to console: {e}");
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> SongRecord {
        SongRecord {
            remote_id: "5257138".to_string(),
            name: "浪人情歌".to_string(),
            artist: "伍佰".to_string(),
            album: "浪人情歌".to_string(),
            genres: vec![],
            duration_seconds: 281,
        }
    }

    fn comments(n: usize) -> Vec<CommentRecord> {
        (0..n)
            .map(|i| CommentRecord {
                content: format!("comment {i}"),
                author: format!("user{i}"),
                like_count: 1500,
                posted_at: "2020-01-01 12:00".to_string(),
            })
            .collect()
    }

    fn render(config: &AppConfig, song: &SongRecord, comments: &[CommentRecord]) -> String {
        let mut display = ConsoleDisplay::new(Vec::new(), config);
        display.update(song, comments);
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_header_uses_default_genre() {
        let text = render(&AppConfig::default(), &song(), &[]);
        assert!(text.contains("♫ 浪人情歌 - 伍佰"));
        assert!(text.contains("未知风格"));
        assert!(text.contains("4:41"));
        assert!(text.contains("(no hot comments)"));
    }

    #[test]
    fn test_comment_count_is_limited() {
        let config = AppConfig {
            max_displayed_comments: 2,
            ..AppConfig::default()
        };
        let text = render(&config, &song(), &comments(5));
        assert!(text.contains("comment 0"));
        assert!(text.contains("comment 1"));
        assert!(!text.contains("comment 2"));
        assert!(text.contains("♥ 1.5k"));
    }

    #[test]
    fn test_hidden_display_prints_nothing() {
        let mut display = ConsoleDisplay::new(Vec::new(), &AppConfig::default());
        display.set_visible(false);
        display.update(&song(), &comments(1));
        assert!(display.into_inner().is_empty());
    }
}
