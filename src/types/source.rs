//! ResolvedSource type recording where a track's audio can be fetched.

use serde::{Deserialize, Serialize};

use super::track::Track;

/// The outcome of searching the providers for one track.
///
/// Created once per track by the resolver and never mutated. An absent
/// `source_url` is a normal outcome ("no legal source found"), not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSource {
    /// The track that was searched for.
    pub track: Track,

    /// Download URL of the chosen candidate, if any provider had one.
    pub source_url: Option<String>,
}

impl ResolvedSource {
    /// Creates a ResolvedSource.
    pub fn new(track: Track, source_url: Option<String>) -> Self {
        Self { track, source_url }
    }

    /// Returns true if a provider yielded a downloadable candidate.
    pub fn is_resolved(&self) -> bool {
        self.source_url.is_some()
    }
}
