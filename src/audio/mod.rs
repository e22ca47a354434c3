//! Reference audio input: chunked PCM reading and voice-activity detection.

pub mod stream;
pub mod vad;

pub use stream::{SampleChunk, SampleStream};
pub use vad::{Vad, VadConfig, VadState};
