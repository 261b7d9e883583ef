//! Separation model components.
//!
//! - [`selector`]: quality choice and hardware heuristic to a model URL
//! - [`downloader`]: model cache population
//! - [`loader`]: ONNX session loading
//! - [`invoker`]: the inference seam used by the pipeline

pub mod downloader;
pub mod invoker;
pub mod loader;
pub mod selector;

// Re-export commonly used types
pub use downloader::{ensure_model, model_file_name};
pub use invoker::{InferenceInvoker, OrtInvoker};
pub use loader::load_session;
pub use selector::{HardwareSignals, ModelChoice, ModelSelector, ModelTier};
