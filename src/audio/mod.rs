//! Audio marshaling module.
//!
//! Turns fetched source bytes into f32 samples for the separation model and
//! turns the model's output back into a WAV file.

pub mod decode;
pub mod wav;

// Re-export commonly used items
pub use decode::{decode_audio, DecodedAudio};
pub use wav::{samples_to_duration, write_wav_to_buffer};
