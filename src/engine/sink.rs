//! Frame-classifying sink for reference samples.

use super::error::EngineError;
use super::voice::VoiceActivity;
use crate::audio::{Vad, VadConfig};
use log::trace;

/// Lifecycle of an [`AudioSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Open,
    Closed,
}

/// Receives reference samples in order and classifies them frame by frame.
///
/// Holds at most one partial frame of samples plus one decision per
/// finished frame, so memory stays small for long references.
pub struct AudioSink {
    state: SinkState,
    frame_len: usize,
    frame_ms: u32,
    pending: Vec<i16>,
    vad: Vad,
    activity: Vec<bool>,
    samples_received: u64,
}

impl AudioSink {
    /// Creates an open sink with frames of `frame_ms` milliseconds.
    pub fn new(vad_config: VadConfig, frame_ms: u32, sample_rate: u32) -> Self {
        let frame_len = ((u64::from(sample_rate) * u64::from(frame_ms) / 1000) as usize).max(1);
        Self {
            state: SinkState::Open,
            frame_len,
            frame_ms,
            pending: Vec::with_capacity(frame_len),
            vad: Vad::new(vad_config, sample_rate),
            activity: Vec::new(),
            samples_received: 0,
        }
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn samples_received(&self) -> u64 {
        self.samples_received
    }

    /// Number of frames classified so far.
    pub fn frames(&self) -> usize {
        self.activity.len()
    }

    /// Appends samples. Fails once the sink has been closed.
    pub fn send_samples(&mut self, samples: &[i16]) -> Result<(), EngineError> {
        if self.state == SinkState::Closed {
            return Err(EngineError::SinkClosed);
        }
        self.samples_received += samples.len() as u64;

        let mut rest = samples;
        if !self.pending.is_empty() {
            let take = (self.frame_len - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending.len() < self.frame_len {
                return Ok(());
            }
            let frame = std::mem::take(&mut self.pending);
            self.classify(&frame);
            self.pending = frame;
            self.pending.clear();
        }

        let mut frames = rest.chunks_exact(self.frame_len);
        for frame in frames.by_ref() {
            self.classify(frame);
        }
        self.pending.extend_from_slice(frames.remainder());
        Ok(())
    }

    /// Flushes a trailing partial frame, zero padded, and stops accepting
    /// samples. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == SinkState::Closed {
            return;
        }
        if !self.pending.is_empty() {
            let mut frame = std::mem::take(&mut self.pending);
            frame.resize(self.frame_len, 0);
            self.classify(&frame);
        }
        self.state = SinkState::Closed;
        trace!(
            "Sink closed after {} samples in {} frames",
            self.samples_received,
            self.activity.len()
        );
    }

    /// Closes the sink and hands over its frame decisions.
    pub fn into_voice_activity(mut self) -> VoiceActivity {
        self.close();
        VoiceActivity::new(self.activity, self.frame_ms)
    }

    fn classify(&mut self, frame: &[i16]) {
        let active = self.vad.process(frame);
        self.activity.push(active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> AudioSink {
        let config = VadConfig {
            speech_threshold: 0.02,
            hangover_ms: 0,
            auto_level: false,
        };
        AudioSink::new(config, 30, 8000)
    }

    #[test]
    fn test_frames_span_chunk_boundaries() {
        let mut sink = sink();
        // 100 + 300 samples: one full frame, 160 pending
        sink.send_samples(&[0; 100]).unwrap();
        assert_eq!(sink.frames(), 0);
        sink.send_samples(&[0; 300]).unwrap();
        assert_eq!(sink.frames(), 1);
        assert_eq!(sink.samples_received(), 400);
    }

    #[test]
    fn test_close_pads_partial_frame() {
        let mut sink = sink();
        sink.send_samples(&[3000; 440]).unwrap();
        let voice = sink.into_voice_activity();
        assert_eq!(voice.frames(), &[true, true]);
        assert_eq!(voice.frame_ms(), 30);
    }

    #[test]
    fn test_send_after_close_fails() {
        let mut sink = sink();
        sink.close();
        assert_eq!(sink.state(), SinkState::Closed);
        assert_eq!(sink.send_samples(&[0; 10]), Err(EngineError::SinkClosed));
    }

    #[test]
    fn test_empty_sink_has_no_activity() {
        assert!(sink().into_voice_activity().is_empty());
    }

    #[test]
    fn test_speech_and_silence_frames() {
        let mut sink = sink();
        sink.send_samples(&[0; 240]).unwrap();
        sink.send_samples(&[3000; 480]).unwrap();
        sink.send_samples(&[0; 240]).unwrap();
        let voice = sink.into_voice_activity();
        assert_eq!(voice.frames(), &[false, true, true, false]);
    }
}
