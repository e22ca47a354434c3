//! Command-line interface for subsync
//!
//! Provides argument parsing using clap derive macros. Numeric values are
//! kept as text here and validated by [`crate::options`], so a bad value is
//! reported as an invalid parameter rather than a usage error.

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Align subtitle timing to a reference subtitle or raw audio track
#[derive(Parser, Debug)]
#[command(
    name = "subsync",
    version,
    about = "Align subtitle timing to a reference subtitle or raw audio track",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Reference subtitle file with correct timing
    #[arg(short = 's', long, value_name = "REF_SUB_FILE")]
    pub ref_sub: Option<PathBuf>,

    /// Reference audio: raw 16-bit little-endian mono PCM at 8000 Hz
    #[arg(short = 'a', long, value_name = "REF_PCM_FILE")]
    pub ref_audio: Option<PathBuf>,

    /// Shift all subtitles by one constant offset
    #[arg(short = 'n', long)]
    pub no_split: bool,

    /// Penalty for splitting, greater than 0 and at most 1000 (default: 7)
    #[arg(short = 'p', long, value_name = "FLOAT")]
    pub split_penalty: Option<String>,

    /// Smallest time unit of the aligner in milliseconds (default: 60)
    #[arg(short = 'i', long, value_name = "INT")]
    pub interval: Option<String>,

    /// Speed optimization, 0 disables it (default: 1)
    #[arg(short = 'o', long, value_name = "FLOAT")]
    pub optimization: Option<String>,

    /// Framerate of the reference, enables framerate correction
    #[arg(short = 'f', long, value_name = "FLOAT")]
    pub ref_fps: Option<String>,

    /// Charset of the input subtitle (default: auto)
    #[arg(short = 'e', long, value_name = "LABEL")]
    pub sub_enc: Option<String>,

    /// Charset of the reference subtitle (default: auto)
    #[arg(short = 'r', long, value_name = "LABEL")]
    pub ref_sub_enc: Option<String>,

    /// Verbose output (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,

    /// Subtitle file with incorrect timing
    #[arg(value_name = "SUB_IN", required_unless_present = "completions")]
    pub sub_in: Option<PathBuf>,

    /// Where to write the corrected subtitle file
    #[arg(value_name = "SUB_OUT", required_unless_present = "completions")]
    pub sub_out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_minimal_subtitle_reference() {
        let cli = Cli::try_parse_from(["subsync", "-s", "ref.srt", "in.srt", "out.srt"]).unwrap();
        assert_eq!(cli.ref_sub, Some(PathBuf::from("ref.srt")));
        assert!(cli.ref_audio.is_none());
        assert_eq!(cli.sub_in, Some(PathBuf::from("in.srt")));
        assert_eq!(cli.sub_out, Some(PathBuf::from("out.srt")));
        assert!(!cli.no_split);
        assert!(cli.split_penalty.is_none());
        assert!(cli.interval.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_all_short_flags() {
        let cli = Cli::try_parse_from([
            "subsync", "-a", "ref.pcm", "-n", "-p", "12.5", "-i", "40", "-o", "0", "-f", "25",
            "-e", "latin1", "-r", "utf-8", "-vv", "in.srt", "out.srt",
        ])
        .unwrap();
        assert_eq!(cli.ref_audio, Some(PathBuf::from("ref.pcm")));
        assert!(cli.no_split);
        assert_eq!(cli.split_penalty.as_deref(), Some("12.5"));
        assert_eq!(cli.interval.as_deref(), Some("40"));
        assert_eq!(cli.optimization.as_deref(), Some("0"));
        assert_eq!(cli.ref_fps.as_deref(), Some("25"));
        assert_eq!(cli.sub_enc.as_deref(), Some("latin1"));
        assert_eq!(cli.ref_sub_enc.as_deref(), Some("utf-8"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_long_flags() {
        let cli = Cli::try_parse_from([
            "subsync",
            "--ref-sub",
            "ref.srt",
            "--split-penalty",
            "3",
            "--interval",
            "20",
            "--no-split",
            "--config",
            "/tmp/subsync.toml",
            "in.srt",
            "out.srt",
        ])
        .unwrap();
        assert_eq!(cli.split_penalty.as_deref(), Some("3"));
        assert_eq!(cli.interval.as_deref(), Some("20"));
        assert!(cli.no_split);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/subsync.toml")));
    }

    #[test]
    fn test_numeric_values_are_not_validated_by_parser() {
        let cli = Cli::try_parse_from(["subsync", "-s", "r.srt", "-i", "12a", "in.srt", "out.srt"])
            .unwrap();
        assert_eq!(cli.interval.as_deref(), Some("12a"));
    }

    #[test]
    fn test_negative_values_reach_the_validator() {
        let cli = Cli::try_parse_from(["subsync", "-s", "r.srt", "-p", "-1", "in.srt", "out.srt"])
            .unwrap();
        assert_eq!(cli.split_penalty.as_deref(), Some("-1"));
    }

    #[test]
    fn test_both_references_parse() {
        // Exclusivity is checked by ReferenceSource::select, not by clap
        let cli = Cli::try_parse_from([
            "subsync", "-s", "r.srt", "-a", "r.pcm", "in.srt", "out.srt",
        ])
        .unwrap();
        assert!(cli.ref_sub.is_some() && cli.ref_audio.is_some());
    }

    #[test]
    fn test_missing_output_is_error() {
        let result = Cli::try_parse_from(["subsync", "-s", "ref.srt", "in.srt"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_positional_is_error() {
        let result = Cli::try_parse_from(["subsync", "-s", "r.srt", "a.srt", "b.srt", "c.srt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_completions_needs_no_positionals() {
        let cli = Cli::try_parse_from(["subsync", "--completions", "bash"]).unwrap();
        assert_eq!(cli.completions, Some(Shell::Bash));
        assert!(cli.sub_in.is_none());
    }

    #[test]
    fn test_help_flag() {
        let result = Cli::try_parse_from(["subsync", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["subsync", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
