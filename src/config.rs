use crate::audio::VadConfig;
use crate::defaults;
use crate::engine::native::EngineSettings;
use crate::error::{Result, SubsyncError};
use crate::options::{self, SyncOptionsBuilder};
use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub reference: ReferenceConfig,
    pub vad: VadSection,
}

/// Alignment defaults, overridden by command-line flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub interval_ms: u32,
    pub split_penalty: f64,
    pub optimization: f64,
    pub split_mode: bool,
}

/// Reference audio ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReferenceConfig {
    pub chunk_bytes: usize,
}

/// Voice-activity analysis of reference audio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VadSection {
    pub threshold: f32,
    pub frame_ms: u32,
    pub hangover_ms: u32,
    pub auto_level: bool,
    pub opening_radius: usize,
    pub closing_radius: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: defaults::INTERVAL_MS,
            split_penalty: defaults::SPLIT_PENALTY,
            optimization: defaults::OPTIMIZATION,
            split_mode: true,
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: defaults::CHUNK_BYTES,
        }
    }
}

impl Default for VadSection {
    fn default() -> Self {
        Self {
            threshold: defaults::VAD_THRESHOLD,
            frame_ms: defaults::VAD_FRAME_MS,
            hangover_ms: defaults::VAD_HANGOVER_MS,
            auto_level: true,
            opening_radius: 0,
            closing_radius: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("invalid TOML in {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file falls back to defaults. Unreadable files and
    /// invalid TOML are errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(SubsyncError::ConfigParse {
                message: format!("{}: {:#}", path.display(), e),
            }),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SUBSYNC_CHUNK_BYTES → reference.chunk_bytes
    /// - SUBSYNC_VAD_THRESHOLD → vad.threshold
    /// - SUBSYNC_INTERVAL_MS → sync.interval_ms
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(chunk_bytes) = env_value("SUBSYNC_CHUNK_BYTES") {
            self.reference.chunk_bytes = chunk_bytes;
        }

        if let Some(threshold) = env_value("SUBSYNC_VAD_THRESHOLD") {
            self.vad.threshold = threshold;
        }

        if let Some(interval) = env_value("SUBSYNC_INTERVAL_MS") {
            self.sync.interval_ms = interval;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/subsync/config.toml on Linux, `None` if the platform
    /// has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("subsync").join("config.toml"))
    }

    /// Alignment options from the `[sync]` section, checked by the same
    /// rules as the command line.
    pub fn sync_options(&self) -> Result<SyncOptionsBuilder> {
        let interval = options::Interval::new(self.sync.interval_ms)
            .map_err(|e| invalid_value("sync.interval_ms", e))?;
        let split_penalty = options::SplitPenalty::new(self.sync.split_penalty)
            .map_err(|e| invalid_value("sync.split_penalty", e))?;
        let optimization = options::Optimization::new(self.sync.optimization)
            .map_err(|e| invalid_value("sync.optimization", e))?;

        Ok(SyncOptionsBuilder::default()
            .interval(interval)
            .split_penalty(split_penalty)
            .optimization(optimization)
            .split_mode(self.sync.split_mode))
    }

    /// Chunk size for streaming reference audio, in `1..=MAX_CHUNK_BYTES`.
    pub fn chunk_bytes(&self) -> Result<usize> {
        let chunk_bytes = self.reference.chunk_bytes;
        if chunk_bytes == 0 || chunk_bytes > defaults::MAX_CHUNK_BYTES {
            return Err(SubsyncError::ConfigInvalidValue {
                key: "reference.chunk_bytes".to_string(),
                message: format!(
                    "must be greater than 0 and at most {}",
                    defaults::MAX_CHUNK_BYTES
                ),
            });
        }
        Ok(chunk_bytes)
    }

    /// Settings of the built-in engine from the `[vad]` section.
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let vad = &self.vad;
        if !(vad.threshold.is_finite() && (0.0..=1.0).contains(&vad.threshold)) {
            return Err(SubsyncError::ConfigInvalidValue {
                key: "vad.threshold".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if vad.frame_ms == 0 {
            return Err(SubsyncError::ConfigInvalidValue {
                key: "vad.frame_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(EngineSettings {
            vad: VadConfig {
                speech_threshold: vad.threshold,
                hangover_ms: vad.hangover_ms,
                auto_level: vad.auto_level,
            },
            frame_ms: vad.frame_ms,
            sample_rate: defaults::SAMPLE_RATE,
            opening_radius: vad.opening_radius,
            closing_radius: vad.closing_radius,
        })
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok().filter(|value| !value.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

fn invalid_value(key: &str, error: SubsyncError) -> SubsyncError {
    let message = match error {
        SubsyncError::InvalidParameter { message, .. } => message,
        other => other.to_string(),
    };
    SubsyncError::ConfigInvalidValue {
        key: key.to_string(),
        message,
    }
}
