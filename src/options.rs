//! Validated synchronization parameters.
//!
//! Every numeric option has a newtype that can only hold an accepted value.
//! The `parse_*` functions take the raw text given on the command line (or
//! in the config file) and either return the newtype or an
//! [`SubsyncError::InvalidParameter`] naming the option.

use crate::defaults;
use crate::error::{Result, SubsyncError};
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

/// Smallest time unit of the aligner, in milliseconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval(NonZeroU32);

impl Interval {
    pub fn new(ms: u32) -> Result<Self> {
        NonZeroU32::new(ms)
            .map(Self)
            .ok_or_else(|| invalid("interval", "must be a positive integer"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self(NonZeroU32::new(defaults::INTERVAL_MS).unwrap_or(NonZeroU32::MIN))
    }
}

/// Cost of splitting, in `(0, 1000]`. At 1000 no splits are made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPenalty(f64);

impl SplitPenalty {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 && value <= defaults::MAX_SPLIT_PENALTY {
            Ok(Self(value))
        } else {
            Err(invalid(
                "split-penalty",
                "must be greater than 0 and at most 1000",
            ))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SplitPenalty {
    fn default() -> Self {
        Self(defaults::SPLIT_PENALTY)
    }
}

/// Speed optimization level, `>= 0`. Zero disables it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimization(f64);

impl Optimization {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(invalid("optimization", "must be zero or greater"))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Optimization {
    fn default() -> Self {
        Self(defaults::OPTIMIZATION)
    }
}

/// Framerate of the reference video, in frames per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefFps(f64);

impl RefFps {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(invalid("ref-fps", "must be a finite number"))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Outside the range of common video framerates. Accepted, but worth a
    /// warning.
    pub fn is_nonstandard(self) -> bool {
        let (low, high) = defaults::STANDARD_FPS_RANGE;
        self.0 < low || self.0 > high
    }
}

impl fmt::Display for RefFps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

pub fn parse_interval(text: &str) -> Result<Interval> {
    let ms: u32 = text
        .parse()
        .map_err(|_| invalid("interval", "must be a positive integer"))?;
    Interval::new(ms)
}

pub fn parse_split_penalty(text: &str) -> Result<SplitPenalty> {
    SplitPenalty::new(parse_finite("split-penalty", text)?)
}

pub fn parse_optimization(text: &str) -> Result<Optimization> {
    Optimization::new(parse_finite("optimization", text)?)
}

pub fn parse_ref_fps(text: &str) -> Result<RefFps> {
    RefFps::new(parse_finite("ref-fps", text)?)
}

/// The whole text must be a finite number.
fn parse_finite(name: &'static str, text: &str) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid(name, "must be a finite number")),
    }
}

fn invalid(name: &'static str, message: &str) -> SubsyncError {
    SubsyncError::InvalidParameter {
        name,
        message: message.to_string(),
    }
}

/// Where the correct timing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// A subtitle file with correct timing, and its charset label.
    Subtitle {
        path: PathBuf,
        encoding: Option<String>,
    },
    /// Raw 8 kHz mono 16-bit little-endian PCM.
    Audio { path: PathBuf },
}

impl ReferenceSource {
    /// Picks the reference from the two mutually exclusive inputs.
    ///
    /// Exactly one of `ref_sub` and `ref_audio` must be present. The
    /// subtitle encoding only applies to a subtitle reference.
    pub fn select(
        ref_sub: Option<PathBuf>,
        ref_audio: Option<PathBuf>,
        ref_sub_encoding: Option<String>,
    ) -> Result<Self> {
        match (ref_sub, ref_audio) {
            (Some(path), None) => Ok(ReferenceSource::Subtitle {
                path,
                encoding: ref_sub_encoding,
            }),
            (None, Some(path)) => Ok(ReferenceSource::Audio { path }),
            (Some(_), Some(_)) => Err(SubsyncError::AmbiguousReferenceSource { both: true }),
            (None, None) => Err(SubsyncError::AmbiguousReferenceSource { both: false }),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ReferenceSource::Subtitle { path, .. } | ReferenceSource::Audio { path } => path,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, ReferenceSource::Audio { .. })
    }
}

/// Parameters of one alignment. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOptions {
    interval: Interval,
    split_mode: bool,
    split_penalty: SplitPenalty,
    optimization: Optimization,
}

impl SyncOptions {
    pub fn builder() -> SyncOptionsBuilder {
        SyncOptionsBuilder::default()
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval.get()
    }

    /// Whether subtitles may be shifted by different amounts.
    pub fn split_mode(&self) -> bool {
        self.split_mode
    }

    pub fn split_penalty(&self) -> f64 {
        self.split_penalty.get()
    }

    pub fn optimization(&self) -> f64 {
        self.optimization.get()
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptionsBuilder::default().build()
    }
}

impl fmt::Display for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interval={}ms split_mode={} split_penalty={} optimization={}",
            self.interval_ms(),
            self.split_mode,
            self.split_penalty(),
            self.optimization()
        )
    }
}

/// Layers option values over the defaults, last write wins.
#[derive(Debug, Clone)]
pub struct SyncOptionsBuilder {
    options: SyncOptions,
}

impl Default for SyncOptionsBuilder {
    fn default() -> Self {
        Self {
            options: SyncOptions {
                interval: Interval::default(),
                split_mode: true,
                split_penalty: SplitPenalty::default(),
                optimization: Optimization::default(),
            },
        }
    }
}

impl SyncOptionsBuilder {
    pub fn interval(mut self, interval: Interval) -> Self {
        self.options.interval = interval;
        self
    }

    pub fn split_mode(mut self, split_mode: bool) -> Self {
        self.options.split_mode = split_mode;
        self
    }

    pub fn split_penalty(mut self, split_penalty: SplitPenalty) -> Self {
        self.options.split_penalty = split_penalty;
        self
    }

    pub fn optimization(mut self, optimization: Optimization) -> Self {
        self.options.optimization = optimization;
        self
    }

    pub fn build(self) -> SyncOptions {
        self.options
    }
}
