//! subsync - subtitle timing synchronization
//!
//! Aligns a subtitle file to a reference, either a correctly timed subtitle
//! or raw 8 kHz mono PCM audio, and writes the corrected file.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
#[cfg(feature = "cli")]
pub mod logging;
pub mod options;
pub mod pipeline;

// Composition root
#[cfg(feature = "cli")]
pub mod app;

// Engine boundary
pub use engine::{EngineError, NativeEngine, ResultCode, SyncEngine, SyncRequest};

// Pipeline
pub use pipeline::{ReferencePipeline, SyncInvoker};

// Error handling
pub use error::{Result, SubsyncError};

// Options and config
pub use config::Config;
pub use options::{ReferenceSource, SyncOptions, SyncOptionsBuilder};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
