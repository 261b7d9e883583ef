//! instrumentify: instrumental versions of a Spotify playlist.
//!
//! For each playlist track the crate searches a fixed, ordered list of legal
//! audio providers for a downloadable source, then on request fetches it,
//! strips the vocals with an ONNX separation model and collects the result
//! into a zip archive.
//!
//! # Modules
//!
//! - [`types`]: Core data types (Track, ResolvedSource, ProcessedResult)
//! - [`config`]: Runtime configuration (AppConfig)
//! - [`error`]: Error types and codes (AppError, ErrorCode)
//! - [`http`]: API and transfer HTTP clients
//! - [`auth`]: Spotify PKCE login and token storage
//! - [`playlist`]: Playlist URL parsing and track listing
//! - [`providers`]: Search providers (SoundCloud, Jamendo, ccMixter, FMA)
//! - [`resolver`]: Ordered short-circuit source resolution
//! - [`models`]: Model selection, download, loading and inference
//! - [`audio`]: Audio decoding and WAV encoding
//! - [`pipeline`]: Per-track tasks, batch resolution, collector, archive
//!
//! # Example
//!
//! ```rust,ignore
//! use instrumentify::{config::AppConfig, resolver::SourceResolver};
//!
//! let config = AppConfig::from_env();
//! let resolver = SourceResolver::from_config(&config, reqwest::Client::new());
//! let url = resolver.resolve("One More Time", "Daft Punk").await;
//! ```

pub mod audio;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod playlist;
pub mod providers;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

// Re-export commonly used types at crate root for convenience
pub use config::AppConfig;
pub use error::{AppError, ErrorCode, Result};
pub use types::{ProcessedResult, ResolvedSource, Track};
