//! Data types for the reference pipeline.

use std::fmt;

/// A step of reference construction. Errors are tagged with the step that
/// failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CreateSink,
    OpenReference,
    Ingest,
    VoiceActivity,
    TimeSpans,
    LoadSubtitle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            Stage::CreateSink => "creating the audio sink",
            Stage::OpenReference => "opening the reference audio",
            Stage::Ingest => "ingesting reference audio",
            Stage::VoiceActivity => "computing voice activity",
            Stage::TimeSpans => "computing time spans",
            Stage::LoadSubtitle => "loading the reference subtitle",
        };
        f.write_str(phrase)
    }
}

/// Progress of one reference construction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// A sink exists, no samples yet.
    SinkOpen,
    /// Every chunk of the source has been appended.
    SinkPopulated,
    VoiceComputed,
    /// Terminal success.
    SpansComputed,
    /// Terminal failure. Every handle has been released.
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::SpansComputed | PipelineState::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::SinkOpen => f.write_str("sink open"),
            PipelineState::SinkPopulated => f.write_str("sink populated"),
            PipelineState::VoiceComputed => f.write_str("voice computed"),
            PipelineState::SpansComputed => f.write_str("spans computed"),
            PipelineState::Failed(stage) => write!(f, "failed while {}", stage),
        }
    }
}

/// Counters of the ingestion loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub chunks: u64,
    pub samples: u64,
    /// The source had an odd byte count and its last byte was ignored.
    pub dropped_trailing_byte: bool,
}

impl IngestStats {
    /// Duration of the ingested audio in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        if sample_rate == 0 {
            return 0;
        }
        self.samples * 1000 / u64::from(sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::VoiceActivity.to_string(), "computing voice activity");
        assert_eq!(Stage::OpenReference.to_string(), "opening the reference audio");
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::SpansComputed.is_terminal());
        assert!(PipelineState::Failed(Stage::Ingest).is_terminal());
        assert!(!PipelineState::SinkPopulated.is_terminal());
        assert_eq!(
            PipelineState::Failed(Stage::TimeSpans).to_string(),
            "failed while computing time spans"
        );
    }

    #[test]
    fn test_ingest_duration() {
        let stats = IngestStats {
            chunks: 2,
            samples: 12_000,
            dropped_trailing_byte: false,
        };
        assert_eq!(stats.duration_ms(8000), 1500);
        assert_eq!(stats.duration_ms(0), 0);
    }
}
