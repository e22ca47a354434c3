//! Synchronization engine boundary.
//!
//! The reference pipeline only talks to an engine through [`SyncEngine`]. The
//! engine hands out opaque handles (sink, voice activity, time spans); every
//! handle is either consumed by a later engine call or given back through the
//! matching `release_*` method, exactly once.

pub mod align;
pub mod error;
pub mod native;
pub mod result_code;
pub mod sink;
pub mod subtitle;
pub mod timespans;
pub mod voice;

pub use error::EngineError;
pub use native::NativeEngine;
pub use result_code::{ResultCode, SyncFailure};

use crate::audio::SampleChunk;
use crate::options::{RefFps, SyncOptions};
use std::path::Path;

/// Paths and per-run parameters of one alignment call.
#[derive(Debug, Clone, Copy)]
pub struct SyncRequest<'a> {
    /// Subtitle file with incorrect timing.
    pub sub_in: &'a Path,
    /// Where the corrected subtitle file is written.
    pub sub_out: &'a Path,
    /// Known framerate of the reference. Enables framerate correction.
    pub ref_fps: Option<RefFps>,
    /// Charset label of `sub_in`; `None` or `"auto"` detects it.
    pub sub_encoding: Option<&'a str>,
}

/// Operations the reference pipeline and the sync invoker consume.
///
/// Consuming methods take their input handle by value: once called, the
/// engine owns the handle and is responsible for releasing it, on success
/// and on failure alike.
pub trait SyncEngine {
    /// Accumulates reference samples.
    type Sink;
    /// Voice activity derived from a finished sink.
    type Voice;
    /// Reference time spans used as alignment anchors.
    type Spans;

    /// Creates an empty sink.
    fn create_sink(&self) -> Result<Self::Sink, EngineError>;

    /// Appends one chunk of samples, in stream order.
    fn sink_append(&self, sink: &mut Self::Sink, chunk: &SampleChunk) -> Result<(), EngineError>;

    /// Releases a sink that was never consumed.
    fn release_sink(&self, sink: Self::Sink);

    /// Finishes the sink and derives voice activity. Consumes the sink.
    fn compute_voice_activity(&self, sink: Self::Sink) -> Result<Self::Voice, EngineError>;

    /// Releases voice activity that was never consumed.
    fn release_voice(&self, voice: Self::Voice);

    /// Derives reference spans from voice activity. Consumes the voice activity.
    fn compute_timespans(&self, voice: Self::Voice) -> Result<Self::Spans, EngineError>;

    /// Reads reference spans from a correctly timed subtitle file.
    fn load_subtitle_timespans(
        &self,
        path: &Path,
        encoding: Option<&str>,
    ) -> Result<Self::Spans, EngineError>;

    /// Releases reference spans.
    fn release_spans(&self, spans: Self::Spans);

    /// Aligns `request.sub_in` to `spans` and writes `request.sub_out`.
    ///
    /// The spans are only borrowed; the caller still releases them.
    fn synchronize(
        &self,
        request: &SyncRequest<'_>,
        spans: &Self::Spans,
        options: &SyncOptions,
    ) -> ResultCode;
}
