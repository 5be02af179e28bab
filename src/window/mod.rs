//! # Window Source
//!
//! Finds the music player's main window and turns its title into a
//! [`SongIdentity`]. The player shows `"{song} - {artist}"` as its title
//! while something is playing, so the title is the whole signal.
//!
//! ## Backends
//!
//! Listing top-level windows is platform work and sits behind
//! [`WindowSystem`]:
//!
//! - Windows: `EnumWindows` and friends (`win32`)
//! - elsewhere: the `wmctrl -lx` listing (`wmctrl`)
//!
//! A backend returns everything it captured *and* the error the OS reported,
//! if any. Whether that error matters is decided here: a permission error is
//! only fatal when nothing matching was captured before it.

use log::{debug, warn};

use crate::error::{EnumerationError, WatchError};
use crate::models::SongIdentity;

#[cfg(windows)]
mod win32;
#[cfg(not(windows))]
mod wmctrl;

#[cfg(windows)]
pub use win32::Win32Windows;
#[cfg(not(windows))]
pub use wmctrl::Wmctrl;

/// Window class of the player's main window.
pub const PLAYER_WINDOW_CLASS: &str = "OrpheusBrowserHost";

/// Separator between song and artist in the window title.
pub const TITLE_SEPARATOR: &str = " - ";

/// A top-level window as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub handle: u64,
    pub title: String,
    pub class_name: String,
    pub visible: bool,
}

/// Result of one enumeration pass.
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Windows captured, in OS order.
    pub windows: Vec<WindowInfo>,
    /// Error reported by the OS, possibly after some windows were captured.
    pub error: Option<EnumerationError>,
}

/// Platform capability: list top-level windows with class, title and
/// visibility.
pub trait WindowSystem {
    fn enumerate(&self) -> Enumeration;

    /// Whether a window's class name identifies the wanted class.
    fn class_matches(&self, actual: &str, wanted: &str) -> bool {
        actual == wanted
    }
}

/// The backend for the platform this binary was built for.
pub fn native_system() -> Box<dyn WindowSystem> {
    #[cfg(windows)]
    {
        Box::new(Win32Windows)
    }
    #[cfg(not(windows))]
    {
        Box::new(Wmctrl)
    }
}

/// Split a title into `(song, artist)` on the first `" - "`.
///
/// Both halves are trimmed and must be non-empty.
pub fn parse_window_title(title: &str) -> Option<(String, String)> {
    let Some((song, artist)) = title.split_once(TITLE_SEPARATOR) else {
        debug!("Window title has no separator: {title:?}");
        return None;
    };

    let song = song.trim();
    let artist = artist.trim();
    if song.is_empty() || artist.is_empty() {
        warn!("Window title has an empty song or artist: {title:?}");
        return None;
    }

    debug!("Parsed window title {title:?} -> song: {song}, artist: {artist}");
    Some((song.to_string(), artist.to_string()))
}

/// Reads the currently playing song off the player's window.
pub struct WindowSource {
    system: Box<dyn WindowSystem>,
    class_name: String,
}

impl WindowSource {
    pub fn new(system: Box<dyn WindowSystem>, class_name: impl Into<String>) -> Self {
        Self {
            system,
            class_name: class_name.into(),
        }
    }

    /// Window source backed by the native platform backend.
    pub fn native(class_name: impl Into<String>) -> Self {
        Self::new(native_system(), class_name)
    }

    fn is_player(&self, window: &WindowInfo) -> bool {
        self.system.class_matches(&window.class_name, &self.class_name)
            && window.visible
            && !window.title.is_empty()
    }

    /// Locate the player's main window. First match in OS order wins.
    ///
    /// # Errors
    ///
    /// Only [`WatchError::PermissionDenied`], and only when the OS refused
    /// enumeration before any matching window was captured. Every other
    /// failure is logged and reported as "not found".
    pub fn find_player_window(&self) -> Result<Option<WindowInfo>, WatchError> {
        let Enumeration { windows, error } = self.system.enumerate();
        let total = windows.len();
        let found = windows.into_iter().find(|w| self.is_player(w));

        match (found, error) {
            (Some(window), Some(e)) => {
                warn!("Window enumeration reported an error after the player was found, ignoring: {e}");
                Ok(Some(window))
            }
            (Some(window), None) => {
                debug!("Found player window: {:?} (handle {})", window.title, window.handle);
                Ok(Some(window))
            }
            (None, Some(EnumerationError::PermissionDenied(reason))) => {
                warn!("Not allowed to enumerate windows: {reason}");
                Err(WatchError::PermissionDenied(reason))
            }
            (None, Some(e)) => {
                warn!("Window enumeration failed: {e}");
                Ok(None)
            }
            (None, None) => {
                debug!(
                    "No visible window of class {} among {total} windows",
                    self.class_name
                );
                Ok(None)
            }
        }
    }

    /// The song the player is showing, if its window exists and the title
    /// parses.
    pub fn get_current_song(&self) -> Result<Option<SongIdentity>, WatchError> {
        let Some(window) = self.find_player_window()? else {
            return Ok(None);
        };

        Ok(parse_window_title(&window.title).map(|(name, artist)| SongIdentity { name, artist }))
    }
}
