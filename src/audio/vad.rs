//! Voice Activity Detection (VAD) for reference audio.
//!
//! Classifies fixed-length frames using RMS-based thresholding and a small
//! state machine that keeps short pauses inside a speech run. Works on sample
//! counts rather than wall-clock time, since reference audio is processed
//! offline and much faster than real time.

use crate::defaults;

/// Configuration for Voice Activity Detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadConfig {
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub speech_threshold: f32,
    /// Duration of silence still counted as speech after a speech frame (milliseconds).
    pub hangover_ms: u32,
    /// Derive the threshold from the observed noise floor.
    pub auto_level: bool,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            speech_threshold: defaults::VAD_THRESHOLD,
            hangover_ms: defaults::VAD_HANGOVER_MS,
            auto_level: true,
        }
    }
}

/// Current state of voice activity detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    /// No speech detected.
    Idle,
    /// Speech is being detected.
    Speaking,
    /// Silence detected, waiting to confirm speech end.
    MaybeSilence,
}

/// Number of recent frame levels used to estimate the noise floor.
const LEVEL_HISTORY_MAX: usize = 100;

/// Frames needed before the noise floor estimate is trusted.
const LEVEL_HISTORY_MIN: usize = 10;

/// Frame-driven Voice Activity Detector.
pub struct Vad {
    config: VadConfig,
    state: VadState,
    threshold: f32,
    silence_samples: u64,
    hangover_samples: u64,
    level_history: Vec<f32>,
}

impl Vad {
    /// Creates a detector for audio at the given sample rate.
    pub fn new(config: VadConfig, sample_rate: u32) -> Self {
        Self {
            config,
            state: VadState::Idle,
            threshold: config.speech_threshold,
            silence_samples: 0,
            hangover_samples: u64::from(config.hangover_ms) * u64::from(sample_rate) / 1000,
            level_history: Vec::with_capacity(LEVEL_HISTORY_MAX),
        }
    }

    /// Classifies one frame. Returns `true` while inside a speech run.
    pub fn process(&mut self, frame: &[i16]) -> bool {
        let rms = calculate_rms(frame);
        if self.config.auto_level {
            self.track_level(rms);
        }
        let is_speech = rms > self.threshold;

        match self.state {
            VadState::Idle => {
                if is_speech {
                    self.state = VadState::Speaking;
                }
                is_speech
            }
            VadState::Speaking => {
                if !is_speech {
                    self.state = VadState::MaybeSilence;
                    self.silence_samples = frame.len() as u64;
                    return self.within_hangover();
                }
                true
            }
            VadState::MaybeSilence => {
                if is_speech {
                    self.state = VadState::Speaking;
                    self.silence_samples = 0;
                    return true;
                }
                self.silence_samples += frame.len() as u64;
                self.within_hangover()
            }
        }
    }

    fn within_hangover(&mut self) -> bool {
        if self.silence_samples <= self.hangover_samples {
            true
        } else {
            self.state = VadState::Idle;
            self.silence_samples = 0;
            false
        }
    }

    /// Keeps a rolling level history and re-derives the threshold from it.
    fn track_level(&mut self, level: f32) {
        if self.level_history.len() == LEVEL_HISTORY_MAX {
            self.level_history.remove(0);
        }
        self.level_history.push(level);

        if self.level_history.len() < LEVEL_HISTORY_MIN {
            return;
        }

        // 25th percentile as noise floor
        let mut sorted = self.level_history.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let noise_floor = sorted[sorted.len() / 4];

        // Never drop below the configured threshold, clamp runaway noise
        self.threshold = (noise_floor * 2.0).clamp(self.config.speech_threshold, 0.2);
    }

    /// Returns the current VAD state.
    pub fn state(&self) -> VadState {
        self.state
    }

    /// Threshold currently in effect.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// # Returns
/// Normalized RMS value (0.0 to 1.0), where:
/// - 0.0 represents silence
/// - ~0.707 represents a full-scale sine wave
/// - 1.0 represents maximum amplitude
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 8000;
    const FRAME: usize = 240;

    fn fixed_config() -> VadConfig {
        VadConfig {
            speech_threshold: 0.02,
            hangover_ms: 60,
            auto_level: false,
        }
    }

    fn make_silence(count: usize) -> Vec<i16> {
        vec![0i16; count]
    }

    fn make_speech(count: usize, amplitude: i16) -> Vec<i16> {
        vec![amplitude; count]
    }

    #[test]
    fn test_rms_silence_is_zero() {
        assert_eq!(calculate_rms(&make_silence(1000)), 0.0);
    }

    #[test]
    fn test_rms_max_amplitude() {
        let rms = calculate_rms(&make_speech(1000, i16::MAX));
        assert!((rms - 1.0).abs() < 0.001, "RMS should be ~1.0, got {}", rms);
    }

    #[test]
    fn test_rms_mixed_positive_negative() {
        let mut mixed = make_speech(500, 1000);
        mixed.extend(make_speech(500, -1000));
        let rms = calculate_rms(&mixed);
        // RMS of ±1000 should be around 1000/32767 ≈ 0.0305
        assert!(rms > 0.025 && rms < 0.035, "RMS should be ~0.0305, got {}", rms);
    }

    #[test]
    fn test_calculate_rms_empty_samples() {
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn test_vad_starts_idle() {
        let vad = Vad::new(fixed_config(), RATE);
        assert_eq!(vad.state(), VadState::Idle);
    }

    #[test]
    fn test_vad_detects_speech_start() {
        let mut vad = Vad::new(fixed_config(), RATE);

        assert!(!vad.process(&make_silence(FRAME)));
        assert_eq!(vad.state(), VadState::Idle);

        assert!(vad.process(&make_speech(FRAME, 3000)));
        assert_eq!(vad.state(), VadState::Speaking);
    }

    #[test]
    fn test_vad_bridges_short_pause() {
        let mut vad = Vad::new(fixed_config(), RATE);
        let speech = make_speech(FRAME, 3000);
        let silence = make_silence(FRAME);

        vad.process(&speech);
        // 30ms of silence is within the 60ms hangover
        assert!(vad.process(&silence));
        assert_eq!(vad.state(), VadState::MaybeSilence);

        assert!(vad.process(&speech));
        assert_eq!(vad.state(), VadState::Speaking);
    }

    #[test]
    fn test_vad_ends_speech_after_hangover() {
        let mut vad = Vad::new(fixed_config(), RATE);
        let speech = make_speech(FRAME, 3000);
        let silence = make_silence(FRAME);

        vad.process(&speech);
        assert!(vad.process(&silence)); // 30ms
        assert!(vad.process(&silence)); // 60ms
        assert!(!vad.process(&silence)); // 90ms, past hangover
        assert_eq!(vad.state(), VadState::Idle);
    }

    #[test]
    fn test_auto_level_never_goes_below_configured_threshold() {
        let config = VadConfig {
            auto_level: true,
            ..fixed_config()
        };
        let mut vad = Vad::new(config, RATE);
        for _ in 0..50 {
            vad.process(&make_silence(FRAME));
        }
        assert_eq!(vad.threshold(), 0.02);
    }

    #[test]
    fn test_auto_level_raises_threshold_over_noise() {
        let config = VadConfig {
            auto_level: true,
            ..fixed_config()
        };
        let mut vad = Vad::new(config, RATE);
        // Constant hum at ~0.05 RMS
        for _ in 0..50 {
            vad.process(&make_speech(FRAME, 1640));
        }
        assert!(vad.threshold() > 0.09, "threshold={}", vad.threshold());
        assert!(!vad.process(&make_speech(FRAME, 1640)));
        assert_eq!(vad.state(), VadState::Idle);
    }
}
