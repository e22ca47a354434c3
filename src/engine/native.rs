//! Built-in synchronization engine.

use super::align;
use super::error::EngineError;
use super::result_code::{ResultCode, SyncFailure};
use super::sink::AudioSink;
use super::subtitle::SubtitleDocument;
use super::timespans::{TimeSpan, TimeSpans};
use super::voice::VoiceActivity;
use super::{SyncEngine, SyncRequest};
use crate::audio::{SampleChunk, VadConfig};
use crate::defaults;
use crate::options::{RefFps, SyncOptions};
use alass_core::TimeSpan as AlignSpan;
use log::{debug, error, info, trace, warn};
use std::path::Path;

/// Tuning of the reference voice-activity analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub vad: VadConfig,
    pub frame_ms: u32,
    pub sample_rate: u32,
    /// Radius of the opening applied to voice activity, in frames.
    pub opening_radius: usize,
    /// Radius of the closing applied to voice activity, in frames.
    pub closing_radius: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            vad: VadConfig::default(),
            frame_ms: defaults::VAD_FRAME_MS,
            sample_rate: defaults::SAMPLE_RATE,
            opening_radius: 0,
            closing_radius: 0,
        }
    }
}

/// Voice-activity detector feeding `subparse` files into `alass-core`.
#[derive(Debug, Clone, Default)]
pub struct NativeEngine {
    settings: EngineSettings,
}

impl NativeEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn sync(
        &self,
        request: &SyncRequest<'_>,
        ref_spans: &TimeSpans,
        options: &SyncOptions,
    ) -> Result<(), SyncFailure> {
        let mut document = SubtitleDocument::open(request.sub_in, request.sub_encoding)?;
        document.ensure_updatable()?;
        let sub_spans = document.timespans()?;

        let interval = i64::from(options.interval_ms());
        let reference = ref_spans.to_units(interval);
        let incorrect = sub_spans.to_units(interval);

        let ratio = framerate_ratio(request.ref_fps, &reference, &incorrect);
        let incorrect: Vec<AlignSpan> = incorrect.iter().map(|s| s.scaled(ratio)).collect();

        if reference.is_empty() {
            warn!("Reference has no time spans, subtitle timing is left unchanged");
        }

        let split = options.split_mode() && options.split_penalty() < defaults::MAX_SPLIT_PENALTY;
        if options.split_mode() && !split {
            info!(
                "split penalty {} allows no splits, using a constant shift",
                options.split_penalty()
            );
        }

        let deltas = if split {
            let deltas = align::align_split(
                &reference,
                &incorrect,
                options.split_penalty(),
                options.optimization(),
            );
            info!(
                "split mode: shifting first subtitle by {}ms and last by {}ms",
                delta_str(deltas.first(), interval),
                delta_str(deltas.last(), interval)
            );
            deltas
        } else {
            let (delta, score) = align::align_constant(&reference, &incorrect);
            info!("no split mode: shifting subtitles by {}ms", delta * interval);
            debug!("constant shift score: {:.4}", score);
            vec![delta; incorrect.len()]
        };

        let corrected: Vec<TimeSpan> = sub_spans
            .iter()
            .zip(&deltas)
            .map(|(span, &delta)| span.rescaled(ratio, delta.saturating_mul(interval)))
            .collect();

        document.retime(&corrected)?;
        document.save(request.sub_out)
    }
}

/// Ratio the subtitle timeline is scaled by before alignment.
fn framerate_ratio(
    ref_fps: Option<RefFps>,
    reference: &[AlignSpan],
    incorrect: &[AlignSpan],
) -> f64 {
    let Some(fps) = ref_fps else {
        return 1.0;
    };
    if fps.get() <= 0.0 {
        warn!("Ignoring non-positive reference framerate {}", fps.get());
        return 1.0;
    }

    match align::guess_fps_ratio(reference, incorrect, fps.get()) {
        Some(guess) => {
            info!(
                "detected framerate = {:.3} (reference framerate = {:.3})",
                guess.fps,
                fps.get()
            );
            guess.ratio
        }
        None => {
            warn!(
                "No usable framerate for reference framerate {:.3}, skipping framerate correction",
                fps.get()
            );
            1.0
        }
    }
}

fn delta_str(delta: Option<&i64>, interval: i64) -> String {
    delta.map_or_else(|| "???".to_string(), |d| (d * interval).to_string())
}

impl SyncEngine for NativeEngine {
    type Sink = AudioSink;
    type Voice = VoiceActivity;
    type Spans = TimeSpans;

    fn create_sink(&self) -> Result<AudioSink, EngineError> {
        Ok(AudioSink::new(
            self.settings.vad,
            self.settings.frame_ms,
            self.settings.sample_rate,
        ))
    }

    fn sink_append(&self, sink: &mut AudioSink, chunk: &SampleChunk) -> Result<(), EngineError> {
        sink.send_samples(chunk.samples())
    }

    fn release_sink(&self, sink: AudioSink) {
        trace!("Releasing sink with {} samples", sink.samples_received());
        drop(sink);
    }

    fn compute_voice_activity(&self, sink: AudioSink) -> Result<VoiceActivity, EngineError> {
        let voice = sink.into_voice_activity();
        if voice.is_empty() {
            return Err(EngineError::Rejected(
                "no audio samples were received".to_string(),
            ));
        }
        let voice = voice.clean(self.settings.opening_radius, self.settings.closing_radius);
        debug!(
            "Voice activity: {} of {} frames active",
            voice.active_frames(),
            voice.len()
        );
        Ok(voice)
    }

    fn release_voice(&self, voice: VoiceActivity) {
        trace!("Releasing voice activity with {} frames", voice.len());
        drop(voice);
    }

    fn compute_timespans(&self, voice: VoiceActivity) -> Result<TimeSpans, EngineError> {
        let spans = TimeSpans::from(&voice);
        debug!(
            "Derived {} reference spans covering {}ms",
            spans.len(),
            spans.total_duration_ms()
        );
        Ok(spans)
    }

    fn load_subtitle_timespans(
        &self,
        path: &Path,
        encoding: Option<&str>,
    ) -> Result<TimeSpans, EngineError> {
        SubtitleDocument::open(path, encoding)
            .and_then(|document| document.timespans())
            .map_err(|e| EngineError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn release_spans(&self, spans: TimeSpans) {
        trace!("Releasing {} time spans", spans.len());
        drop(spans);
    }

    fn synchronize(
        &self,
        request: &SyncRequest<'_>,
        spans: &TimeSpans,
        options: &SyncOptions,
    ) -> ResultCode {
        match self.sync(request, spans, options) {
            Ok(()) => ResultCode::Success,
            Err(e) => {
                error!("{}", e);
                e.result_code()
            }
        }
    }
}
