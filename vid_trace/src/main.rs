use anyhow::Context;
use clap::{Parser, ValueEnum};
use shared_utils::logging::{init_logging, init_stderr_logging, LogConfig};
use shared_utils::FrameTypeMap;
use std::path::PathBuf;
use tracing::debug;

use vid_trace::{run, TimeBase, TraceConfig, TraceLayout};

#[derive(Parser, Debug)]
#[command(name = "vid-trace")]
#[command(version, about = "MPEG-4 video trace extractor for ns-3", long_about = None)]
struct Cli {
    /// Input files, processed along with the contents of --input-dir
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Enables verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Path to the ffprobe binary
    #[arg(long, value_name = "PATH")]
    ffprobe_path: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Scan --input-dir recursively
    #[arg(short, long)]
    recursive: bool,

    /// Number of files converted in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    #[arg(long)]
    time_base: Option<TimeBaseArg>,

    #[arg(long)]
    layout: Option<LayoutArg>,

    /// JSON frame type → symbol table, e.g. {"unknown": "P"}
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overwrite existing traces
    #[arg(short, long)]
    force: bool,

    /// Accepted input extension (repeatable, default: mp4)
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TimeBaseArg {
    /// Milliseconds since the first frame
    First,
    /// Milliseconds since the previous frame
    Previous,
}

impl From<TimeBaseArg> for TimeBase {
    fn from(arg: TimeBaseArg) -> Self {
        match arg {
            TimeBaseArg::First => TimeBase::First,
            TimeBaseArg::Previous => TimeBase::Previous,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// <time ms> <size> <type>
    Simple,
    /// <frame no> <type> <time ms> <size>
    Ns3,
}

impl From<LayoutArg> for TraceLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Simple => TraceLayout::Simple,
            LayoutArg::Ns3 => TraceLayout::Ns3,
        }
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<TraceConfig> {
    let mut config = match &cli.config {
        Some(path) => TraceConfig::load(path)?,
        None => TraceConfig::default(),
    };

    if let Some(path) = &cli.ffprobe_path {
        config.probe_path = Some(path.clone());
    }
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if let Some(time_base) = cli.time_base {
        config.time_base = time_base.into();
    }
    if let Some(layout) = cli.layout {
        config.layout = layout.into();
    }
    if !cli.extensions.is_empty() {
        config.extensions = cli.extensions.clone();
    }
    config.recursive |= cli.recursive;
    config.force |= cli.force;

    if let Some(path) = &cli.symbols {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbol table: {}", path.display()))?;
        config.symbols = FrameTypeMap::from_json(&text)
            .with_context(|| format!("Invalid symbol table: {}", path.display()))?;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::default().verbose(cli.verbose);
    let level = log_config.level;
    if let Err(e) = init_logging("vid_trace", log_config) {
        eprintln!("⚠️ Log file unavailable, logging to stderr only: {:#}", e);
        if let Err(e) = init_stderr_logging(level) {
            eprintln!("⚠️ Logging disabled: {:#}", e);
        }
    }

    let config = build_config(&cli)?;
    debug!(?config, "Configuration resolved");

    let flags = run(&cli.inputs, &config, cli.quiet);
    if !flags.is_success() {
        std::process::exit(i32::from(flags.bits()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shared_utils::FrameType;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::parse_from(["vid-trace"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config, TraceConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "vid-trace",
            "--ffprobe-path",
            "/usr/local/bin/ffprobe",
            "--output-dir",
            "traces",
            "--time-base",
            "previous",
            "--layout",
            "ns3",
            "--extension",
            "mp4",
            "--extension",
            "mov",
            "-j",
            "3",
            "-rf",
            "a.mp4",
            "b.mp4",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.probe_path, Some(PathBuf::from("/usr/local/bin/ffprobe")));
        assert_eq!(config.output_dir, PathBuf::from("traces"));
        assert_eq!(config.time_base, TimeBase::Previous);
        assert_eq!(config.layout, TraceLayout::Ns3);
        assert_eq!(config.extensions, vec!["mp4".to_string(), "mov".to_string()]);
        assert_eq!(config.jobs, 3);
        assert!(config.recursive);
        assert!(config.force);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
    }

    #[test]
    fn test_symbols_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbols.json");
        std::fs::write(&path, r#"{"unknown": "B"}"#).unwrap();

        let cli = Cli::parse_from(["vid-trace", "--symbols", path.to_str().unwrap()]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.symbols.symbol(FrameType::Unknown), "B");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cli = Cli::parse_from(["vid-trace", "--input-dir", "same", "--output-dir", "same"]);
        assert!(build_config(&cli).is_err());
    }
}
