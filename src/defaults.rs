//! Default configuration constants for subsync.
//!
//! Shared by the config file, the CLI and the native engine so that every
//! layer agrees on the same baseline.

/// Sample rate of raw reference audio in Hz.
///
/// Reference PCM is 8kHz mono 16-bit signed little-endian, no header.
pub const SAMPLE_RATE: u32 = 8000;

/// Bytes per reference sample (16-bit PCM).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Default chunk size in bytes for streaming the reference audio file.
pub const CHUNK_BYTES: usize = 4096;

/// Largest accepted chunk size (1 MiB).
pub const MAX_CHUNK_BYTES: usize = 1 << 20;

/// Default smallest time unit recognized by the aligner (milliseconds).
pub const INTERVAL_MS: u32 = 60;

/// Default penalty applied to each split in split mode.
pub const SPLIT_PENALTY: f64 = 7.0;

/// Upper bound for the split penalty. At this value the aligner applies a
/// single constant shift.
pub const MAX_SPLIT_PENALTY: f64 = 1000.0;

/// Default speed optimization. `0.0` disables it.
pub const OPTIMIZATION: f64 = 1.0;

/// Reference framerates outside this range trigger a warning.
pub const STANDARD_FPS_RANGE: (f64, f64) = (24.0, 60.0);

/// Framerates tried during framerate correction.
pub const FRAMERATES: &[f64] = &[
    23.976023976024,
    24.0,
    25.0,
    29.97002997003,
    30.0,
    50.0,
    59.9400599400599,
    60.0,
];

/// Largest framerate ratio tried during framerate correction, either way.
///
/// A candidate whose ratio to the reference is above this or below its
/// inverse is skipped.
pub const MAX_FPS_RATIO: f64 = 4.0;

/// Framerate used to turn MicroDVD frame numbers into times.
pub const MICRODVD_FPS: f64 = 30.0;

/// Encoding label that triggers charset detection.
pub const AUTO_ENCODING: &str = "auto";

/// Default RMS threshold for the reference voice-activity detector.
pub const VAD_THRESHOLD: f32 = 0.02;

/// Duration of one voice-activity frame in milliseconds.
pub const VAD_FRAME_MS: u32 = 30;

/// Trailing silence still counted as speech (milliseconds).
///
/// Bridges the short gaps between words so one sentence yields one span.
pub const VAD_HANGOVER_MS: u32 = 150;
