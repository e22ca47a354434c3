//! Subtitle files through `subparse`, with charset handling.
//!
//! Any format `subparse` understands can serve as a reference. Rewriting is
//! limited to files whose extension matches their detected format and whose
//! format supports updating entries.

use super::result_code::SyncFailure;
use super::timespans::{TimeSpan, TimeSpans};
use crate::defaults::{AUTO_ENCODING, MICRODVD_FPS};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use subparse::errors::ErrorKind;
use subparse::timetypes::{TimePoint, TimeSpan as CueSpan};
use subparse::{SubtitleEntry, SubtitleFile, SubtitleFormat};

/// A parsed subtitle file and the format it was read as.
pub struct SubtitleDocument {
    path: PathBuf,
    format: SubtitleFormat,
    file: SubtitleFile,
}

impl SubtitleDocument {
    /// Reads and parses a subtitle file.
    ///
    /// The format comes from the extension and the content. `encoding` is a
    /// charset label; `None` or `"auto"` detects the charset. If parsing
    /// fails with a user-supplied label, the detected charset is tried once
    /// more.
    pub fn open(path: &Path, encoding: Option<&str>) -> Result<Self, SyncFailure> {
        let path_str = path.display().to_string();
        let data = fs::read(path).map_err(|e| SyncFailure::from_read(&path_str, e))?;
        let format = subparse::get_subtitle_format_err(path.extension(), &data).map_err(|e| {
            debug!("No subtitle format found for {}: {}", path_str, e);
            SyncFailure::UnsupportedFormat {
                path: path_str.clone(),
                format: None,
            }
        })?;

        let parse_as = |encoding: &'static Encoding| {
            subparse::parse_bytes(format, &data, Some(encoding), MICRODVD_FPS)
        };
        let parsed = match lookup_encoding(encoding) {
            Some(user_encoding) => parse_as(user_encoding).or_else(|_| {
                let detected = detect_encoding(&data);
                error!(
                    "Error parsing subtitles as '{}', trying '{}'...",
                    user_encoding.name(),
                    detected.name()
                );
                parse_as(detected)
            }),
            None => parse_as(detect_encoding(&data)),
        };

        let file = parsed.map_err(|e| SyncFailure::ParseError {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        debug!("Parsed {} as {}", path_str, format.get_name());

        Ok(Self {
            path: path.to_path_buf(),
            format,
            file,
        })
    }

    pub fn format(&self) -> SubtitleFormat {
        self.format
    }

    /// Fails unless this file can be rewritten in its own format.
    pub fn ensure_updatable(&self) -> Result<(), SyncFailure> {
        check_updatable(&self.path, self.format)
    }

    /// Entries in file order.
    pub fn entries(&self) -> Result<Vec<SubtitleEntry>, SyncFailure> {
        self.file
            .get_subtitle_entries()
            .map_err(|e| SyncFailure::ParseError {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// One span per entry, in file order.
    pub fn timespans(&self) -> Result<TimeSpans, SyncFailure> {
        Ok(self
            .entries()?
            .iter()
            .map(|entry| {
                TimeSpan::new(entry.timespan.start.msecs(), entry.timespan.end.msecs())
            })
            .collect())
    }

    /// Replaces the timing of every entry, keeping its text.
    pub fn retime(&mut self, spans: &[TimeSpan]) -> Result<(), SyncFailure> {
        let entries: Vec<SubtitleEntry> = spans
            .iter()
            .map(|span| {
                SubtitleEntry::from(CueSpan::new(
                    TimePoint::from_msecs(span.start_ms),
                    TimePoint::from_msecs(span.end_ms),
                ))
            })
            .collect();

        self.file
            .update_subtitle_entries(&entries)
            .map_err(|e| match e.kind() {
                ErrorKind::UpdatingEntriesNotSupported { format } => {
                    SyncFailure::UnsupportedFormat {
                        path: self.path.display().to_string(),
                        format: Some(format.get_name().to_string()),
                    }
                }
                other => SyncFailure::Internal {
                    message: format!("Error while updating subtitle entries ({})", other),
                },
            })
    }

    /// Serializes the file in its own format and writes it to `path`.
    pub fn save(&self, path: &Path) -> Result<(), SyncFailure> {
        let path_str = path.display().to_string();
        let data = self.file.to_data().map_err(|e| SyncFailure::Serialize {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        fs::write(path, data).map_err(|source| SyncFailure::WriteError {
            path: path_str,
            source,
        })
    }
}

/// A file can be rewritten only if its extension matches the detected
/// format, and the format is not a VobSub picture stream.
pub fn check_updatable(path: &Path, format: SubtitleFormat) -> Result<(), SyncFailure> {
    let unsupported = || SyncFailure::UnsupportedFormat {
        path: path.display().to_string(),
        format: Some(format.get_name().to_string()),
    };
    if !subparse::is_valid_extension_for_subtitle_format(path.extension(), format) {
        return Err(unsupported());
    }
    match format {
        SubtitleFormat::VobSubSub => Err(unsupported()),
        _ => Ok(()),
    }
}

/// Resolves a charset label. `None`, `"auto"` and unknown labels yield `None`.
pub fn lookup_encoding(label: Option<&str>) -> Option<&'static Encoding> {
    let label = label?.trim();
    if label.eq_ignore_ascii_case(AUTO_ENCODING) {
        return None;
    }
    let encoding = Encoding::for_label(label.as_bytes());
    if encoding.is_none() {
        warn!("Unknown subtitle encoding '{}', detecting instead", label);
    }
    encoding
}

/// Guesses the charset of raw subtitle bytes: BOM first, then statistical
/// detection, then UTF-8.
pub fn detect_encoding(data: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(data) {
        debug!("Subtitle encoding '{}' taken from BOM", encoding.name());
        return encoding;
    }

    let (charset, confidence, _) = chardet::detect(data);
    let label = chardet::charset2encoding(&charset);
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => {
            info!(
                "Subtitle encoding '{}' detected (confidence={:.2})",
                encoding.name(),
                confidence
            );
            encoding
        }
        None => UTF_8,
    }
}
