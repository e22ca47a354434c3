//! Error types for subsync.

use crate::engine::ResultCode;
use crate::pipeline::types::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubsyncError {
    // Reference pipeline errors
    #[error("Out of resources while {stage}")]
    ResourceExhausted { stage: Stage },

    #[error("Unable to open reference audio file {path}: {source}")]
    ReferenceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed reading reference audio file {path}: {source}")]
    ReferenceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Computation failed while {stage}: {message}")]
    ComputationFailed { stage: Stage, message: String },

    #[error("Unable to load reference subtitle file {path}: {message}")]
    SubtitleParse { path: String, message: String },

    // Command-line errors
    #[error("Invalid value for --{name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("{}", ambiguous_message(.both))]
    AmbiguousReferenceSource { both: bool },

    #[error("{0}")]
    Usage(String),

    // Synchronization errors
    #[error("Unable to synchronize subtitles ({0})")]
    Sync(ResultCode),

    // Configuration errors
    #[error("Failed to load configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn ambiguous_message(both: &bool) -> &'static str {
    if *both {
        "Only one reference may be given: use either --ref-sub or --ref-audio"
    } else {
        "A reference is required: use either --ref-sub or --ref-audio"
    }
}

impl SubsyncError {
    /// Process exit status for this error.
    ///
    /// Engine result codes pass through verbatim, everything else is `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            SubsyncError::Sync(code) => code.as_u8(),
            _ => 1,
        }
    }

    /// The pipeline stage that produced this error, when there is one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SubsyncError::ResourceExhausted { stage }
            | SubsyncError::ComputationFailed { stage, .. } => Some(*stage),
            SubsyncError::ReferenceOpen { .. } => Some(Stage::OpenReference),
            SubsyncError::ReferenceRead { .. } => Some(Stage::Ingest),
            SubsyncError::SubtitleParse { .. } => Some(Stage::LoadSubtitle),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SubsyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_reference_open_display() {
        let error = SubsyncError::ReferenceOpen {
            path: "/tmp/ref.pcm".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(
            error.to_string(),
            "Unable to open reference audio file /tmp/ref.pcm: No such file"
        );
    }

    #[test]
    fn test_computation_failed_display_names_stage() {
        let error = SubsyncError::ComputationFailed {
            stage: Stage::VoiceActivity,
            message: "no audio samples".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Computation failed while computing voice activity: no audio samples"
        );
    }

    #[test]
    fn test_invalid_parameter_display() {
        let error = SubsyncError::InvalidParameter {
            name: "interval",
            message: "must be a positive integer".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for --interval: must be a positive integer"
        );
    }

    #[test]
    fn test_ambiguous_reference_display() {
        let both = SubsyncError::AmbiguousReferenceSource { both: true };
        assert!(both.to_string().contains("Only one reference"));

        let neither = SubsyncError::AmbiguousReferenceSource { both: false };
        assert!(neither.to_string().contains("A reference is required"));
    }

    #[test]
    fn test_exit_code_is_one_for_pipeline_errors() {
        let error = SubsyncError::ComputationFailed {
            stage: Stage::TimeSpans,
            message: "boom".to_string(),
        };
        assert_eq!(error.exit_code(), 1);
        assert_eq!(
            SubsyncError::AmbiguousReferenceSource { both: false }.exit_code(),
            1
        );
    }

    #[test]
    fn test_exit_code_passes_result_code_through() {
        let error = SubsyncError::Sync(ResultCode::WriteError);
        assert_eq!(error.exit_code(), 9);
        let error = SubsyncError::Sync(ResultCode::ParseError);
        assert_eq!(error.exit_code(), 8);
    }

    #[test]
    fn test_stage_is_reported() {
        let error = SubsyncError::ReferenceOpen {
            path: "x".to_string(),
            source: io::Error::other("denied"),
        };
        assert_eq!(error.stage(), Some(Stage::OpenReference));
        assert_eq!(SubsyncError::Usage("bad".to_string()).stage(), None);
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SubsyncError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_source_chain_reference_read() {
        let error = SubsyncError::ReferenceRead {
            path: "ref.pcm".to_string(),
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"),
        };
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SubsyncError>();
        assert_sync::<SubsyncError>();
    }
}
