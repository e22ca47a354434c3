//! Alignment outcomes.

use std::fmt;
use std::io;
use thiserror::Error;

/// Closed set of outcomes of a synchronization call.
///
/// `Success` is zero, every other variant is a distinct failure kind. The
/// numeric value doubles as the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResultCode {
    Success = 0,
    InternalError = 1,
    InvalidParams = 2,
    SinkClosed = 3,
    UnsupportedFormat = 4,
    ReadError = 5,
    FileDoesNotExist = 6,
    PermissionDenied = 7,
    ParseError = 8,
    WriteError = 9,
    SerializeError = 10,
}

impl ResultCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }

    pub fn description(self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::InternalError => "internal error",
            ResultCode::InvalidParams => "invalid parameters",
            ResultCode::SinkClosed => "sink closed",
            ResultCode::UnsupportedFormat => "unsupported subtitle format",
            ResultCode::ReadError => "read error",
            ResultCode::FileDoesNotExist => "file does not exist",
            ResultCode::PermissionDenied => "permission denied",
            ResultCode::ParseError => "parse error",
            ResultCode::WriteError => "write error",
            ResultCode::SerializeError => "serialize error",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.description(), self.as_u8())
    }
}

/// Why the native engine could not synchronize a subtitle file.
#[derive(Error, Debug)]
pub enum SyncFailure {
    #[error("Subtitle format not supported (path='{path}', format='{}')", .format.as_deref().unwrap_or("unknown"))]
    UnsupportedFormat {
        path: String,
        format: Option<String>,
    },

    #[error("Error reading subtitle file from disk (path='{path}'): {source}")]
    ReadError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Subtitle file does not exist (path='{path}')")]
    DoesNotExist { path: String },

    #[error("Insufficient privileges to open subtitle file (path='{path}')")]
    PermissionDenied { path: String },

    #[error("Error parsing subtitle file (path='{path}'): {message}")]
    ParseError { path: String, message: String },

    #[error("Error writing subtitle data to disk (path='{path}'): {source}")]
    WriteError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Error serializing subtitle data (path='{path}'): {message}")]
    Serialize { path: String, message: String },

    #[error("Unknown sync error occurred: {message}")]
    Internal { message: String },
}

impl SyncFailure {
    /// Maps an I/O error on reading `path` to the matching failure.
    pub fn from_read(path: &str, source: io::Error) -> Self {
        let path = path.to_string();
        match source.kind() {
            io::ErrorKind::NotFound => SyncFailure::DoesNotExist { path },
            io::ErrorKind::PermissionDenied => SyncFailure::PermissionDenied { path },
            _ => SyncFailure::ReadError { path, source },
        }
    }

    pub fn result_code(&self) -> ResultCode {
        match self {
            SyncFailure::UnsupportedFormat { .. } => ResultCode::UnsupportedFormat,
            SyncFailure::ReadError { .. } => ResultCode::ReadError,
            SyncFailure::DoesNotExist { .. } => ResultCode::FileDoesNotExist,
            SyncFailure::PermissionDenied { .. } => ResultCode::PermissionDenied,
            SyncFailure::ParseError { .. } => ResultCode::ParseError,
            SyncFailure::WriteError { .. } => ResultCode::WriteError,
            SyncFailure::Serialize { .. } => ResultCode::SerializeError,
            SyncFailure::Internal { .. } => ResultCode::InternalError,
        }
    }
}
