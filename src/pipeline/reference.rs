//! Reference construction.
//!
//! Turns a reference source into engine time spans. The audio branch runs
//! three engine stages (sink → voice activity → time spans); every handle
//! created along the way is owned by a guard, so it is released exactly once
//! no matter which stage fails.

use super::error::at_stage;
use super::handle::Owned;
use super::types::{IngestStats, PipelineState, Stage};
use crate::audio::SampleStream;
use crate::defaults;
use crate::engine::SyncEngine;
use crate::error::{Result, SubsyncError};
use crate::options::ReferenceSource;
use log::{debug, info};
use std::io::Read;
use std::path::Path;

/// Time spans owned by the caller, released when dropped.
pub type SpansGuard<'e, E> = Owned<'e, E, <E as SyncEngine>::Spans>;

/// Drives the engine through one reference construction.
pub struct ReferencePipeline<'e, E: SyncEngine> {
    engine: &'e E,
    chunk_bytes: usize,
    state: PipelineState,
    stats: IngestStats,
}

impl<'e, E: SyncEngine> ReferencePipeline<'e, E> {
    /// Creates a pipeline reading reference audio in chunks of `chunk_bytes`.
    pub fn new(engine: &'e E, chunk_bytes: usize) -> Self {
        Self {
            engine,
            chunk_bytes,
            state: PipelineState::Idle,
            stats: IngestStats::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters of the last audio ingestion.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Builds spans from whichever reference was selected.
    pub fn build(&mut self, source: &ReferenceSource) -> Result<SpansGuard<'e, E>> {
        match source {
            ReferenceSource::Audio { path } => self.build_audio_reference(path),
            ReferenceSource::Subtitle { path, encoding } => {
                self.build_subtitle_reference(path, encoding.as_deref())
            }
        }
    }

    /// Streams a raw PCM file through the engine and returns its spans.
    ///
    /// The sink is created before the file is opened; if opening fails the
    /// sink is released and the error is [`SubsyncError::ReferenceOpen`].
    pub fn build_audio_reference(&mut self, path: &Path) -> Result<SpansGuard<'e, E>> {
        self.start();
        let result = self.run_audio(path, |chunk_bytes| SampleStream::open(path, chunk_bytes));
        self.finish(result)
    }

    /// Streams raw PCM from an already open reader. `name` labels the
    /// source in errors and logs.
    pub fn build_audio_reference_from<R: Read>(
        &mut self,
        reader: R,
        name: &Path,
    ) -> Result<SpansGuard<'e, E>> {
        self.start();
        let result = self.run_audio(name, |chunk_bytes| {
            Ok(SampleStream::new(reader, chunk_bytes))
        });
        self.finish(result)
    }

    /// Reads spans from a correctly timed subtitle file.
    pub fn build_subtitle_reference(
        &mut self,
        path: &Path,
        encoding: Option<&str>,
    ) -> Result<SpansGuard<'e, E>> {
        self.start();
        let result = self
            .engine
            .load_subtitle_timespans(path, encoding)
            .map_err(|e| at_stage(Stage::LoadSubtitle, e))
            .map(|spans| {
                self.transition(PipelineState::SpansComputed);
                Owned::spans(self.engine, spans)
            });
        self.finish(result)
    }

    fn run_audio<R: Read>(
        &mut self,
        path: &Path,
        open: impl FnOnce(usize) -> Result<SampleStream<R>>,
    ) -> Result<SpansGuard<'e, E>> {
        let sink = self
            .engine
            .create_sink()
            .map_err(|e| at_stage(Stage::CreateSink, e))?;
        let mut sink = Owned::sink(self.engine, sink);
        self.transition(PipelineState::SinkOpen);

        let mut stream = open(self.chunk_bytes)?;
        self.ingest(&mut stream, sink.get_mut(), path)?;
        self.transition(PipelineState::SinkPopulated);

        let voice = self
            .engine
            .compute_voice_activity(sink.into_inner())
            .map_err(|e| at_stage(Stage::VoiceActivity, e))?;
        let voice = Owned::voice(self.engine, voice);
        self.transition(PipelineState::VoiceComputed);

        let spans = self
            .engine
            .compute_timespans(voice.into_inner())
            .map_err(|e| at_stage(Stage::TimeSpans, e))?;
        self.transition(PipelineState::SpansComputed);

        Ok(Owned::spans(self.engine, spans))
    }

    /// Appends every chunk of `stream` to `sink`, in order.
    fn ingest<R: Read>(
        &mut self,
        stream: &mut SampleStream<R>,
        sink: &mut E::Sink,
        path: &Path,
    ) -> Result<()> {
        for chunk in stream.by_ref() {
            let chunk = chunk.map_err(|source| SubsyncError::ReferenceRead {
                path: path.display().to_string(),
                source,
            })?;
            self.engine
                .sink_append(sink, &chunk)
                .map_err(|e| at_stage(Stage::Ingest, e))?;
            self.stats.chunks += 1;
            self.stats.samples += chunk.len() as u64;
        }
        self.stats.dropped_trailing_byte = stream.dropped_trailing_byte();

        info!(
            "Ingested {} samples ({}ms) in {} chunks from {}",
            self.stats.samples,
            self.stats.duration_ms(defaults::SAMPLE_RATE),
            self.stats.chunks,
            path.display()
        );
        Ok(())
    }

    fn start(&mut self) {
        self.state = PipelineState::Idle;
        self.stats = IngestStats::default();
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Reference pipeline: {} -> {}", self.state, next);
        self.state = next;
    }

    fn finish(&mut self, result: Result<SpansGuard<'e, E>>) -> Result<SpansGuard<'e, E>> {
        if let Err(e) = &result
            && let Some(stage) = e.stage()
        {
            self.transition(PipelineState::Failed(stage));
        }
        result
    }
}
