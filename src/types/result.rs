//! ProcessedResult type holding one finished instrumental.

/// A named instrumental produced by the inference invoker.
///
/// Only tracks with a resolved source ever produce one. Results are appended
/// to the session's collector and consumed when the archive is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    /// Entry name inside the archive.
    pub file_name: String,

    /// Encoded audio (WAV).
    pub audio_bytes: Vec<u8>,
}

impl ProcessedResult {
    /// Creates a new ProcessedResult.
    pub fn new(file_name: impl Into<String>, audio_bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            audio_bytes,
        }
    }

    /// Returns the size of the encoded audio in bytes.
    pub fn len(&self) -> usize {
        self.audio_bytes.len()
    }

    /// Returns true if the encoded audio is empty.
    pub fn is_empty(&self) -> bool {
        self.audio_bytes.is_empty()
    }
}
