//! Composition root: turns parsed arguments into one synchronization run.
//!
//! Order matters. The reference choice and every numeric flag are checked
//! before anything touches the filesystem; only then is the config file
//! read, the engine built and the reference pipeline run.

use crate::cli::Cli;
use crate::config::Config;
use crate::engine::{NativeEngine, SyncEngine, SyncRequest};
use crate::error::{Result, SubsyncError};
use crate::options::{
    self, Interval, Optimization, RefFps, ReferenceSource, SplitPenalty, SyncOptions,
};
use crate::pipeline::{ReferencePipeline, SyncInvoker, check};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Option values given on the command line, already validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub interval: Option<Interval>,
    pub split_penalty: Option<SplitPenalty>,
    pub optimization: Option<Optimization>,
    pub ref_fps: Option<RefFps>,
    pub no_split: bool,
}

impl CliOverrides {
    pub fn parse(cli: &Cli) -> Result<Self> {
        Ok(Self {
            interval: cli.interval.as_deref().map(options::parse_interval).transpose()?,
            split_penalty: cli
                .split_penalty
                .as_deref()
                .map(options::parse_split_penalty)
                .transpose()?,
            optimization: cli
                .optimization
                .as_deref()
                .map(options::parse_optimization)
                .transpose()?,
            ref_fps: cli.ref_fps.as_deref().map(options::parse_ref_fps).transpose()?,
            no_split: cli.no_split,
        })
    }
}

/// Everything one run needs, resolved from defaults, config, environment
/// and flags.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub reference: ReferenceSource,
    pub sub_in: PathBuf,
    pub sub_out: PathBuf,
    pub sub_encoding: Option<String>,
    pub ref_fps: Option<RefFps>,
    pub options: SyncOptions,
    pub chunk_bytes: usize,
}

impl SyncPlan {
    /// Layers the command-line overrides on top of the config values.
    pub fn resolve(
        reference: ReferenceSource,
        sub_in: PathBuf,
        sub_out: PathBuf,
        sub_encoding: Option<String>,
        overrides: CliOverrides,
        config: &Config,
    ) -> Result<Self> {
        let mut builder = config.sync_options()?;
        if let Some(interval) = overrides.interval {
            builder = builder.interval(interval);
        }
        if let Some(split_penalty) = overrides.split_penalty {
            builder = builder.split_penalty(split_penalty);
        }
        if let Some(optimization) = overrides.optimization {
            builder = builder.optimization(optimization);
        }
        if overrides.no_split {
            builder = builder.split_mode(false);
        }

        Ok(Self {
            reference,
            sub_in,
            sub_out,
            sub_encoding,
            ref_fps: overrides.ref_fps,
            options: builder.build(),
            chunk_bytes: config.chunk_bytes()?,
        })
    }

    /// Operator-facing summary of the inputs, one line per item.
    pub fn banner(&self) -> Vec<String> {
        let mut lines = vec![
            format!(" [ sub-in      ] = {}", self.sub_in.display()),
            format!(" [ sub-out     ] = {}", self.sub_out.display()),
            format!(" [ ref-file    ] = {}", self.reference.path().display()),
        ];
        if let Some(encoding) = &self.sub_encoding {
            lines.push(format!(" [ sub-enc     ] = {}", encoding));
        }
        if let ReferenceSource::Subtitle {
            encoding: Some(encoding),
            ..
        } = &self.reference
        {
            lines.push(format!(" [ ref-sub-enc ] = {}", encoding));
        }
        lines
    }

    pub fn request(&self) -> SyncRequest<'_> {
        SyncRequest {
            sub_in: &self.sub_in,
            sub_out: &self.sub_out,
            ref_fps: self.ref_fps,
            sub_encoding: self.sub_encoding.as_deref(),
        }
    }
}

/// Loads the config file, falling back to the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        // An explicitly named file must exist
        Some(path) => Config::load(path).map_err(|e| SubsyncError::ConfigParse {
            message: format!("{}: {:#}", path.display(), e),
        })?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

/// Builds the reference, runs the alignment and releases the reference.
pub fn execute<E: SyncEngine>(engine: &E, plan: &SyncPlan) -> Result<()> {
    let mut pipeline = ReferencePipeline::new(engine, plan.chunk_bytes);
    let spans = pipeline.build(&plan.reference)?;
    debug!("Reference ready ({})", pipeline.state());

    let code = SyncInvoker::new(engine).invoke(&plan.request(), spans.get(), &plan.options);
    spans.release();
    check(code)
}

/// Runs the synchronize command with the built-in engine.
pub fn run(cli: Cli) -> Result<()> {
    info!("subsync {}", crate::version_string());

    let reference = ReferenceSource::select(
        cli.ref_sub.clone(),
        cli.ref_audio.clone(),
        cli.ref_sub_enc.clone(),
    )?;
    let overrides = CliOverrides::parse(&cli)?;
    if let Some(fps) = overrides.ref_fps
        && fps.is_nonstandard()
    {
        warn!("Reference framerate {} is outside the usual 24-60 range", fps);
    }

    let (Some(sub_in), Some(sub_out)) = (cli.sub_in.clone(), cli.sub_out.clone()) else {
        return Err(SubsyncError::Usage(
            "both SUB_IN and SUB_OUT are required".to_string(),
        ));
    };

    let config = load_config(cli.config.as_deref())?;
    let plan = SyncPlan::resolve(
        reference,
        sub_in,
        sub_out,
        cli.sub_enc.clone(),
        overrides,
        &config,
    )?;

    for line in plan.banner() {
        println!("{}", line);
    }
    info!("Options: {}", plan.options);

    let engine = NativeEngine::new(config.engine_settings()?);
    execute(&engine, &plan)?;

    println!("Sync complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["subsync"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn plan_for(args: &[&str], config: &Config) -> Result<SyncPlan> {
        let cli = cli(args);
        let reference =
            ReferenceSource::select(cli.ref_sub.clone(), cli.ref_audio.clone(), None)?;
        SyncPlan::resolve(
            reference,
            PathBuf::from("in.srt"),
            PathBuf::from("out.srt"),
            cli.sub_enc.clone(),
            CliOverrides::parse(&cli)?,
            config,
        )
    }

    #[test]
    fn test_overrides_parse_valid_values() {
        let overrides =
            CliOverrides::parse(&cli(&["-s", "r.srt", "-i", "123", "-p", "7.5", "a", "b"]))
                .unwrap();
        assert_eq!(overrides.interval.map(Interval::get), Some(123));
        assert_eq!(overrides.split_penalty.map(SplitPenalty::get), Some(7.5));
        assert!(overrides.optimization.is_none());
        assert!(overrides.ref_fps.is_none());
    }

    #[test]
    fn test_overrides_reject_bad_interval() {
        let result = CliOverrides::parse(&cli(&["-s", "r.srt", "-i", "12a", "a", "b"]));
        assert!(matches!(
            result,
            Err(SubsyncError::InvalidParameter {
                name: "interval",
                ..
            })
        ));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let mut config = Config::default();
        config.sync.interval_ms = 30;
        config.sync.split_penalty = 3.0;

        let plan = plan_for(&["-s", "r.srt", "-i", "90", "-n", "a", "b"], &config).unwrap();
        assert_eq!(plan.options.interval_ms(), 90);
        assert_eq!(plan.options.split_penalty(), 3.0);
        assert!(!plan.options.split_mode());
        assert_eq!(plan.chunk_bytes, 4096);
    }

    #[test]
    fn test_config_values_apply_without_flags() {
        let mut config = Config::default();
        config.sync.optimization = 0.0;
        config.reference.chunk_bytes = 1024;

        let plan = plan_for(&["-a", "r.pcm", "a", "b"], &config).unwrap();
        assert_eq!(plan.options.optimization(), 0.0);
        assert!(plan.options.split_mode());
        assert_eq!(plan.chunk_bytes, 1024);
    }

    #[test]
    fn test_banner_lists_inputs() {
        let plan = plan_for(&["-s", "r.srt", "-e", "latin1", "a", "b"], &Config::default())
            .unwrap();
        let banner = plan.banner();
        assert_eq!(banner[0], " [ sub-in      ] = in.srt");
        assert_eq!(banner[2], " [ ref-file    ] = r.srt");
        assert_eq!(banner[3], " [ sub-enc     ] = latin1");
        assert_eq!(banner.len(), 4);
    }

    #[test]
    fn test_run_rejects_ambiguous_reference_before_io() {
        let result = run(cli(&[
            "-s",
            "/nonexistent/r.srt",
            "-a",
            "/nonexistent/r.pcm",
            "--config",
            "/nonexistent/config.toml",
            "a.srt",
            "b.srt",
        ]));
        let error = result.unwrap_err();
        assert!(matches!(
            error,
            SubsyncError::AmbiguousReferenceSource { both: true }
        ));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let result = load_config(Some(Path::new("/nonexistent/subsync/config.toml")));
        assert!(matches!(result, Err(SubsyncError::ConfigParse { .. })));
    }
}
