//! ONNX session loading for separation models.

use std::path::Path;

use ort::session::Session;
use tracing::info;

use crate::error::{AppError, Result};

/// Input tensor name the separation models expect.
pub const INPUT_NAME: &str = "input";

/// Output tensor name the separation models produce.
pub const OUTPUT_NAME: &str = "output";

/// Loads a separation model from a file.
pub fn load_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        return Err(AppError::model_load_failed(format!(
            "Model file not found: {}",
            model_path.display()
        )));
    }

    info!(model = %model_path.display(), "Loading separation model");

    Session::builder()
        .map_err(|e| AppError::model_load_failed(format!("Failed to create session: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| {
            AppError::model_load_failed(format!(
                "Failed to load {}: {}",
                model_path.display(),
                e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::tempdir;

    #[test]
    fn missing_model_file() {
        let dir = tempdir().unwrap();
        let err = load_session(&dir.path().join("absent.onnx")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelLoadFailed);
    }

    #[test]
    fn corrupt_model_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.onnx");
        std::fs::write(&path, b"definitely not protobuf").unwrap();

        let err = load_session(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelLoadFailed);
    }
}
