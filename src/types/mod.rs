//! Core types for instrumentify.
//!
//! This module re-exports all the core data types used throughout the pipeline:
//! - [`Track`]: A playlist entry (title and artist)
//! - [`ResolvedSource`]: The outcome of searching the providers for a track
//! - [`ProcessedResult`]: A named instrumental ready for archiving

mod result;
mod source;
mod track;

// Re-export all types at the module level
pub use result::ProcessedResult;
pub use source::ResolvedSource;
pub use track::Track;
