//! Track type representing one playlist entry.
//!
//! A Track is created by parsing the playlist response and never changes
//! afterwards. Tracks carry no external id; their identity is their index
//! in the playlist.

use serde::{Deserialize, Serialize};

/// A playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track title as reported by the playlist source.
    pub title: String,

    /// Name of the first credited artist.
    pub artist: String,
}

impl Track {
    /// Creates a new Track.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Returns the display label, `artist - title`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// Returns the file name of this track's instrumental.
    ///
    /// Format: `{artist} - {title} (Instrumental).wav`, with characters that
    /// would create directories inside an archive replaced by `_`.
    pub fn instrumental_file_name(&self) -> String {
        let name = format!("{} (Instrumental).wav", self.label());
        sanitize_file_name(&name)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
