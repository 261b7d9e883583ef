//! Error types for instrumentify.
//!
//! Defines all error codes and types used throughout the pipeline for
//! consistent error handling and reporting.

use std::fmt;

/// Error codes surfaced to the user when an action fails.
///
/// Every failure is scoped to a single track or a single action; none of
/// these codes is fatal to a playlist session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No bearer credential available for the playlist source.
    /// Trigger: `run` before `login`/`callback`, or no `--token`.
    AuthRequired,

    /// The identity provider or playlist source rejected the credential.
    /// Trigger: Expired or revoked token, failed code exchange.
    AuthFailed,

    /// The playlist reference could not be parsed.
    /// Trigger: Empty input or a URL without a playlist id.
    InvalidPlaylistUrl,

    /// Listing playlist tracks failed.
    /// Trigger: Network error, unexpected response shape.
    PlaylistFetchFailed,

    /// Processing was requested for a track without a resolved source.
    /// Trigger: Every provider came back empty for the track.
    NoSource,

    /// Fetching the resolved source audio failed.
    /// Trigger: Network error, non-success HTTP status.
    SourceDownloadFailed,

    /// The fetched audio could not be turned into samples.
    /// Trigger: Unsupported container, truncated file.
    AudioDecodeFailed,

    /// Failed to download a separation model.
    /// Trigger: Network error, disk full during download.
    ModelDownloadFailed,

    /// Failed to load an ONNX model into memory.
    /// Trigger: Corrupt file, wrong format, or OOM during load.
    ModelLoadFailed,

    /// Model inference failed.
    /// Trigger: Input shape mismatch, OOM during inference.
    ModelInferenceFailed,

    /// Building the archive failed.
    /// Trigger: Zip encoder error, output file not writable.
    ArchiveFailed,

    /// Configuration is inconsistent.
    /// Trigger: Zero HTTP timeout, empty model URL.
    InvalidConfig,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::AuthFailed => "AUTH_FAILED",
            ErrorCode::InvalidPlaylistUrl => "INVALID_PLAYLIST_URL",
            ErrorCode::PlaylistFetchFailed => "PLAYLIST_FETCH_FAILED",
            ErrorCode::NoSource => "NO_SOURCE",
            ErrorCode::SourceDownloadFailed => "SOURCE_DOWNLOAD_FAILED",
            ErrorCode::AudioDecodeFailed => "AUDIO_DECODE_FAILED",
            ErrorCode::ModelDownloadFailed => "MODEL_DOWNLOAD_FAILED",
            ErrorCode::ModelLoadFailed => "MODEL_LOAD_FAILED",
            ErrorCode::ModelInferenceFailed => "MODEL_INFERENCE_FAILED",
            ErrorCode::ArchiveFailed => "ARCHIVE_FAILED",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => "Please log in with Spotify first",
            ErrorCode::AuthFailed => "Spotify rejected the credential",
            ErrorCode::InvalidPlaylistUrl => "Not a Spotify playlist URL",
            ErrorCode::PlaylistFetchFailed => "Failed to list playlist tracks",
            ErrorCode::NoSource => "No legal source found",
            ErrorCode::SourceDownloadFailed => "Failed to download source audio",
            ErrorCode::AudioDecodeFailed => "Failed to decode source audio",
            ErrorCode::ModelDownloadFailed => "Failed to download separation model",
            ErrorCode::ModelLoadFailed => "Failed to load ONNX model into memory",
            ErrorCode::ModelInferenceFailed => "Vocal separation failed",
            ErrorCode::ArchiveFailed => "Failed to build archive",
            ErrorCode::InvalidConfig => "Invalid configuration",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => {
                "Run `instrumentify login`, open the printed URL, then run \
                 `instrumentify callback --code <code>`"
            }
            ErrorCode::AuthFailed => "Log in again; access tokens are not refreshed automatically",
            ErrorCode::InvalidPlaylistUrl => {
                "Paste a link like https://open.spotify.com/playlist/<id>"
            }
            ErrorCode::PlaylistFetchFailed => {
                "Check internet connection and that the playlist is visible to your account"
            }
            ErrorCode::NoSource => "Only freely downloadable recordings can be processed",
            ErrorCode::SourceDownloadFailed => "Trigger processing again; the source may be rate limited",
            ErrorCode::AudioDecodeFailed => "The provider returned an unsupported audio format",
            ErrorCode::ModelDownloadFailed => {
                "Check internet connection and disk space, or set INSTRUMENTIFY_MODEL_URL_TINY \
                 / INSTRUMENTIFY_MODEL_URL_MEDIUM to a reachable location"
            }
            ErrorCode::ModelLoadFailed => {
                "Delete the model cache directory to force a fresh download, \
                 or choose the tiny quality setting"
            }
            ErrorCode::ModelInferenceFailed => {
                "Trigger processing again or choose the tiny quality setting"
            }
            ErrorCode::ArchiveFailed => "Check that the output path is writable",
            ErrorCode::InvalidConfig => "Check INSTRUMENTIFY_* environment variables",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for pipeline operations.
#[derive(Debug)]
pub struct AppError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Creates a new AppError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new AppError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an AUTH_REQUIRED error.
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "No Spotify access token available")
    }

    /// Creates an AUTH_FAILED error.
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::AuthFailed,
            format!("Authentication failed: {}", reason.into()),
        )
    }

    /// Creates an INVALID_PLAYLIST_URL error.
    pub fn invalid_playlist_url(input: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidPlaylistUrl,
            format!("No playlist id in: {:?}", input.into()),
        )
    }

    /// Creates a PLAYLIST_FETCH_FAILED error.
    pub fn playlist_fetch_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PlaylistFetchFailed,
            format!("Failed to fetch playlist: {}", reason.into()),
        )
    }

    /// Creates a NO_SOURCE error for the given track label.
    pub fn no_source(track: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NoSource,
            format!("No legal source found for {}", track.into()),
        )
    }

    /// Creates a SOURCE_DOWNLOAD_FAILED error.
    pub fn source_download_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SourceDownloadFailed,
            format!("Failed to download source: {}", reason.into()),
        )
    }

    /// Creates an AUDIO_DECODE_FAILED error.
    pub fn audio_decode_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::AudioDecodeFailed,
            format!("Failed to decode audio: {}", reason.into()),
        )
    }

    /// Creates a MODEL_DOWNLOAD_FAILED error.
    pub fn model_download_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelDownloadFailed,
            format!("Failed to download model: {}", reason.into()),
        )
    }

    /// Creates a MODEL_LOAD_FAILED error.
    pub fn model_load_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelLoadFailed,
            format!("Failed to load model: {}", reason.into()),
        )
    }

    /// Creates a MODEL_INFERENCE_FAILED error.
    pub fn model_inference_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelInferenceFailed,
            format!("Inference failed: {}", reason.into()),
        )
    }

    /// Creates an ARCHIVE_FAILED error.
    pub fn archive_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ArchiveFailed,
            format!("Failed to build archive: {}", reason.into()),
        )
    }

    /// Creates an INVALID_CONFIG error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, reason)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
