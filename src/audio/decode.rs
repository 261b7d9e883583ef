//! Source audio decoding.
//!
//! Any container symphonia recognizes (mp3, ogg, flac, wav, ...) is decoded
//! to interleaved f32 samples. Bytes that are not a recognised container
//! are read as raw little-endian f32 samples.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{AppError, Result};

/// Sample rate assumed for raw float input.
pub const RAW_SAMPLE_RATE: u32 = 44100;

/// Decoded interleaved audio.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Decodes fetched bytes into samples.
pub fn decode_audio(bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.is_empty() {
        return Err(AppError::audio_decode_failed("source is empty"));
    }

    match decode_container(bytes) {
        Ok(audio) => Ok(audio),
        Err(SymphoniaError::Unsupported(reason)) => {
            debug!(reason, "Unrecognised container, reading raw f32 samples");
            decode_raw_f32(bytes)
        }
        Err(e) => Err(AppError::audio_decode_failed(e.to_string())),
    }
}

fn decode_container(bytes: &[u8]) -> std::result::Result<DecodedAudio, SymphoniaError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let probed = symphonia::default::get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or(SymphoniaError::Unsupported("no audio track"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(RAW_SAMPLE_RATE);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(1);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(e),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            // Corrupt packet; skip it and keep going.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

fn decode_raw_f32(bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.len() < 4 {
        return Err(AppError::audio_decode_failed(format!(
            "{} bytes is not a single f32 sample",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate: RAW_SAMPLE_RATE,
        channels: 1,
    })
}
