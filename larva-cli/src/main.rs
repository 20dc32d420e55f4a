//! Larva Analyzer CLI Application
//!
//! This is the command-line interface for the larva analyzer.
//! It uses the larva-analyzer library and adds:
//! - Replay discovery (most recent dump in a replay directory)
//! - TOML configuration with command-line overrides
//! - Parallel analysis of several replays
//! - Report generation (TXT/JSON)

use anyhow::{Context, Result};
use clap::Parser;
use larva_analyzer::{Analyzer, ReplayLog};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

mod config;
mod locate;
mod report;

use config::{AppConfig, OutputFormat};
use report::ReplayReport;

/// Larva Analyzer - Measure Zerg larva efficiency from replay dumps
#[derive(Parser, Debug)]
#[command(name = "larva-cli")]
#[command(about = "Analyze larva usage in replay event dumps", long_about = None)]
#[command(version)]
struct Args {
    /// Replay dump(s) to analyze (default: most recent in the replay directory)
    #[arg(value_name = "FILE")]
    replays: Vec<PathBuf>,

    /// Directory searched for the most recent replay dump
    #[arg(long, value_name = "DIR", env = "LARVA_REPLAY_DIR")]
    replay_dir: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only report players whose name contains this text
    #[arg(short, long, value_name = "NAME")]
    player: Option<String>,

    /// Game-speed multiplier (default: 1.4, "Faster")
    #[arg(long, value_name = "FACTOR")]
    speed: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Hide the larva timeline chart
    #[arg(long)]
    no_timeline: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Larva Analyzer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using analyzer library v{}", larva_analyzer::VERSION);

    let config = effective_config(&args)?;
    let analyzer = Analyzer::new(config.analysis.clone()).context("Invalid analysis settings")?;

    let replay_dir = args.replay_dir.as_deref().or(config.input.replay_dir.as_deref());
    let paths = locate::resolve_replays(&args.replays, replay_dir, |dir| {
        locate::most_recent_replay(dir, &config.input.extension)
    })?;

    // Each replay is an independent analysis; results keep input order.
    let results: Vec<Result<ReplayReport>> = paths
        .par_iter()
        .map(|path| analyze_file(&analyzer, path, args.player.as_deref()))
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                log::error!("{:?}: {:#}", path, e);
            }
        }
    }

    match config.output.format {
        OutputFormat::Txt => {
            for report in &reports {
                print!("{}", report::render_text(report, config.output.show_timeline));
            }
        }
        OutputFormat::Json => println!("{}", report::render_json(&reports)?),
    }

    if failures > 0 {
        anyhow::bail!("{} of {} replays could not be analyzed", failures, paths.len());
    }
    Ok(())
}

/// Config file (if any) with command-line overrides applied
fn effective_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(speed) = args.speed {
        config.analysis = config.analysis.with_speed_multiplier(speed);
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.no_timeline {
        config.output.show_timeline = false;
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Load one replay dump and analyze it
fn analyze_file(analyzer: &Analyzer, path: &Path, player_filter: Option<&str>) -> Result<ReplayReport> {
    let replay = ReplayLog::from_json_file(path)
        .with_context(|| format!("Failed to load replay dump: {:?}", path))?;

    let mut players = analyzer
        .analyze(&replay)
        .with_context(|| format!("Failed to analyze replay: {:?}", path))?;

    if let Some(filter) = player_filter {
        let filter = filter.to_lowercase();
        players.retain(|report| report.player.name.to_lowercase().contains(&filter));
    }

    Ok(ReplayReport {
        replay: replay.name,
        players,
    })
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "larva-cli",
            "game.json",
            "--speed",
            "1.0",
            "--format",
            "json",
            "--no-timeline",
        ]);
        let config = effective_config(&args).unwrap();

        assert_eq!(args.replays, vec![PathBuf::from("game.json")]);
        assert_eq!(config.analysis.speed_multiplier, 1.0);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.show_timeline);
    }

    #[test]
    fn test_missing_replay_is_an_error() {
        let analyzer = Analyzer::new(Default::default()).unwrap();
        let result = analyze_file(&analyzer, Path::new("missing/replay.json"), None);
        assert!(result.is_err());
    }
}
