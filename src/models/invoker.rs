//! Inference invoker: raw source bytes in, instrumental WAV bytes out.
//!
//! The separation model itself is opaque. This adapter only decodes the
//! source into the `[1, n]` float tensor the model takes, runs it, and wraps
//! the output back into a WAV file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use half::f16;
use ort::session::Session;
use ort::value::{DynValue, Tensor};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::audio::{decode_audio, samples_to_duration, write_wav_to_buffer};
use crate::error::{AppError, Result};

use super::downloader::ensure_model;
use super::loader::{load_session, INPUT_NAME, OUTPUT_NAME};

/// Runs vocal separation on fetched audio.
#[async_trait]
pub trait InferenceInvoker: Send + Sync {
    /// Returns the processed audio for `audio_bytes` using the model at `model_url`.
    async fn infer(&self, audio_bytes: &[u8], model_url: &str) -> Result<Vec<u8>>;
}

type SharedSession = Arc<StdMutex<Session>>;

/// ONNX Runtime backed invoker.
///
/// Models are downloaded into `model_dir` on first use and their sessions
/// are kept for the lifetime of the invoker.
pub struct OrtInvoker {
    http: reqwest::Client,
    model_dir: PathBuf,
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl OrtInvoker {
    pub fn new(http: reqwest::Client, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            model_dir: model_dir.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the session for a model, downloading and loading it if needed.
    ///
    /// The map lock is held across download and load so two tracks asking
    /// for the same model never download it twice.
    async fn session(&self, model_url: &str) -> Result<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(model_url) {
            return Ok(Arc::clone(session));
        }

        let path = ensure_model(&self.http, model_url, &self.model_dir).await?;
        let session = tokio::task::spawn_blocking(move || load_session(&path))
            .await
            .map_err(|e| AppError::model_load_failed(format!("Loader task failed: {}", e)))??;

        let session = Arc::new(StdMutex::new(session));
        sessions.insert(model_url.to_string(), Arc::clone(&session));
        Ok(session)
    }
}

#[async_trait]
impl InferenceInvoker for OrtInvoker {
    async fn infer(&self, audio_bytes: &[u8], model_url: &str) -> Result<Vec<u8>> {
        let audio = decode_audio(audio_bytes)?;
        if audio.samples.is_empty() {
            return Err(AppError::audio_decode_failed("source contains no samples"));
        }
        debug!(
            samples = audio.samples.len(),
            sample_rate = audio.sample_rate,
            channels = audio.channels,
            "Decoded source audio"
        );

        let session = self.session(model_url).await?;
        let samples = audio.samples;
        let separated = tokio::task::spawn_blocking(move || {
            let mut session = session
                .lock()
                .map_err(|_| AppError::model_inference_failed("model session poisoned"))?;
            run_separation(&mut session, samples)
        })
        .await
        .map_err(|e| AppError::model_inference_failed(format!("Inference task failed: {}", e)))??;

        // Keep the source layout only if the output still divides into frames.
        let channels = if separated.len() % audio.channels.max(1) as usize == 0 {
            audio.channels
        } else {
            1
        };
        info!(
            duration_sec = samples_to_duration(separated.len(), audio.sample_rate, channels),
            "Separation complete"
        );

        write_wav_to_buffer(&separated, audio.sample_rate, channels)
    }
}

/// Runs one separation pass over a flat sample buffer.
pub fn run_separation(session: &mut Session, samples: Vec<f32>) -> Result<Vec<f32>> {
    let len = samples.len();
    let input = Tensor::from_array(([1usize, len], samples)).map_err(|e| {
        AppError::model_inference_failed(format!("Failed to create input tensor: {}", e))
    })?;

    let mut outputs = session
        .run(ort::inputs![INPUT_NAME => input])
        .map_err(|e| AppError::model_inference_failed(format!("Model run failed: {}", e)))?;

    let output: DynValue = outputs.remove(OUTPUT_NAME).ok_or_else(|| {
        AppError::model_inference_failed(format!("{} not found in model output", OUTPUT_NAME))
    })?;

    // Try f32 first, then f16
    if let Ok((_shape, data)) = output.try_extract_tensor::<f32>() {
        return Ok(data.to_vec());
    }
    if let Ok((_shape, data)) = output.try_extract_tensor::<f16>() {
        return Ok(data.iter().map(|e| f32::from(*e)).collect());
    }

    Err(AppError::model_inference_failed(
        "Model output must be either f16 or f32",
    ))
}
