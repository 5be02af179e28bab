//! Window listing through `wmctrl -lx`.
//!
//! `wmctrl` talks EWMH to the running window manager, so this works on any
//! X11 session (and XWayland windows). Each output line looks like:
//!
//! ```text
//! 0x04400003  0 netease-cloud-music.netease-cloud-music  host Song - Artist
//! ```
//!
//! Only managed windows are listed, so every entry counts as visible.

use log::debug;
use std::io;
use std::process::Command;

use super::{Enumeration, WindowInfo, WindowSystem};
use crate::error::EnumerationError;

pub struct Wmctrl;

impl WindowSystem for Wmctrl {
    fn enumerate(&self) -> Enumeration {
        let output = match Command::new("wmctrl").arg("-lx").output() {
            Ok(output) => output,
            Err(e) => {
                let error = match e.kind() {
                    io::ErrorKind::NotFound => EnumerationError::Unsupported(
                        "wmctrl is not installed".to_string(),
                    ),
                    io::ErrorKind::PermissionDenied => {
                        EnumerationError::PermissionDenied(e.to_string())
                    }
                    _ => EnumerationError::Failed(e.to_string()),
                };
                return Enumeration {
                    windows: Vec::new(),
                    error: Some(error),
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let windows = parse_listing(&stdout);
        debug!("wmctrl listed {} windows", windows.len());

        let error = (!output.status.success()).then(|| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            EnumerationError::Failed(format!("wmctrl exited with {}: {}", output.status, stderr.trim()))
        });

        Enumeration { windows, error }
    }

    /// X11 reports `instance.Class`; either half, or the whole, may be
    /// configured.
    fn class_matches(&self, actual: &str, wanted: &str) -> bool {
        actual == wanted || actual.split('.').any(|part| part == wanted)
    }
}

/// Split off the next whitespace-separated field, keeping the rest intact.
fn next_field(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((field, rest)) => Some((field, rest.trim_start())),
        None => Some((line, "")),
    }
}

fn parse_line(line: &str) -> Option<WindowInfo> {
    let (id, rest) = next_field(line)?;
    let (_desktop, rest) = next_field(rest)?;
    let (class_name, rest) = next_field(rest)?;
    let (_host, title) = next_field(rest)?;

    let handle = u64::from_str_radix(id.trim_start_matches("0x"), 16).ok()?;
    Some(WindowInfo {
        handle,
        title: title.trim_end().to_string(),
        class_name: class_name.to_string(),
        visible: true,
    })
}

/// Parse the full `wmctrl -lx` output, skipping lines that don't fit.
pub(crate) fn parse_listing(listing: &str) -> Vec<WindowInfo> {
    listing.lines().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
0x02a00006 -1 xfce4-panel.Xfce4-panel  laptop xfce4-panel
0x04400003  0 netease-cloud-music.netease-cloud-music  laptop 浪人情歌 - 伍佰
0x03c00001  1 kitty.kitty  laptop ~  -  vim   notes.md
garbage
";

    #[test]
    fn test_parse_listing() {
        let windows = parse_listing(LISTING);
        assert_eq!(windows.len(), 3);

        assert_eq!(windows[1].handle, 0x0440_0003);
        assert_eq!(windows[1].class_name, "netease-cloud-music.netease-cloud-music");
        assert_eq!(windows[1].title, "浪人情歌 - 伍佰");
        assert!(windows[1].visible);
    }

    #[test]
    fn test_title_spacing_is_preserved() {
        let windows = parse_listing(LISTING);
        assert_eq!(windows[2].title, "~  -  vim   notes.md");
    }

    #[test]
    fn test_line_without_title() {
        let windows = parse_listing("0x01  0 a.b  host\n");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].title, "");
    }

    #[test]
    fn test_class_matches_either_half() {
        let wm = Wmctrl;
        assert!(wm.class_matches("netease-cloud-music.netease-cloud-music", "netease-cloud-music"));
        assert!(wm.class_matches("OrpheusBrowserHost", "OrpheusBrowserHost"));
        assert!(wm.class_matches("orpheus.OrpheusBrowserHost", "OrpheusBrowserHost"));
        assert!(!wm.class_matches("kitty.kitty", "OrpheusBrowserHost"));
    }
}
