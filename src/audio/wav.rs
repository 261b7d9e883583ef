//! WAV encoding for separated audio.
//!
//! Writes audio samples to WAV format using the hound crate.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{AppError, Result};

/// Writes interleaved samples to an in-memory 32-bit float WAV.
///
/// Returns the WAV file contents as a byte vector.
pub fn write_wav_to_buffer(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: channels.max(1),
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut buffer = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec).map_err(|e| {
            AppError::model_inference_failed(format!("Failed to create WAV writer: {}", e))
        })?;

        for sample in samples {
            writer.write_sample(*sample).map_err(|e| {
                AppError::model_inference_failed(format!("Failed to write sample: {}", e))
            })?;
        }

        writer.finalize().map_err(|e| {
            AppError::model_inference_failed(format!("Failed to finalize WAV: {}", e))
        })?;
    }

    Ok(buffer)
}

/// Calculates the duration of interleaved audio in seconds.
pub fn samples_to_duration(sample_count: usize, sample_rate: u32, channels: u16) -> f32 {
    let frames = sample_count as f32 / channels.max(1) as f32;
    frames / sample_rate as f32
}
