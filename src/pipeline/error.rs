//! Tagging engine failures with the stage that produced them.

use crate::engine::EngineError;
use crate::error::SubsyncError;
use crate::pipeline::types::Stage;

/// Converts an engine failure during `stage` into a crate error.
pub fn at_stage(stage: Stage, error: EngineError) -> SubsyncError {
    match error {
        EngineError::ResourceExhausted => SubsyncError::ResourceExhausted { stage },
        EngineError::Parse { path, message } => SubsyncError::SubtitleParse { path, message },
        error @ (EngineError::Rejected(_) | EngineError::SinkClosed) => {
            SubsyncError::ComputationFailed {
                stage,
                message: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_exhaustion_keeps_stage() {
        let error = at_stage(Stage::CreateSink, EngineError::ResourceExhausted);
        assert!(matches!(
            error,
            SubsyncError::ResourceExhausted {
                stage: Stage::CreateSink
            }
        ));
    }

    #[test]
    fn test_rejection_is_computation_failure() {
        let error = at_stage(
            Stage::VoiceActivity,
            EngineError::Rejected("no audio samples".to_string()),
        );
        assert_eq!(
            error.to_string(),
            "Computation failed while computing voice activity: no audio samples"
        );
        assert_eq!(error.stage(), Some(Stage::VoiceActivity));
    }

    #[test]
    fn test_closed_sink_is_computation_failure() {
        let error = at_stage(Stage::Ingest, EngineError::SinkClosed);
        assert!(matches!(
            error,
            SubsyncError::ComputationFailed {
                stage: Stage::Ingest,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_error_is_subtitle_parse() {
        let error = at_stage(
            Stage::LoadSubtitle,
            EngineError::Parse {
                path: "ref.srt".to_string(),
                message: "no timed subtitle entries found".to_string(),
            },
        );
        assert!(matches!(error, SubsyncError::SubtitleParse { .. }));
    }
}
