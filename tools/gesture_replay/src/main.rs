mod logging;
mod trace;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use gesture_engine::{EngineConfig, GestureEngine};
use log::LevelFilter;
use logging::Logger;
use trace::ReplayEvent;

#[derive(Debug, Parser)]
#[command(name = "gesture_replay")]
#[command(about = "Replay a captured sensor trace through the gesture engine")]
struct Cli {
    /// CSV trace with `sample,...` and `record,t_ms,name` lines.
    trace: PathBuf,
    /// Engine configuration; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// File with one expected event token per line (`gesture:swipe`, `jerk:X+`, ...).
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Compare jerk events against `--expect` too.
    #[arg(long)]
    with_jerks: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    Logger::from_env(level)?.install()?;

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut engine = GestureEngine::new(config).context("invalid engine config")?;

    let lines = trace::parse_trace(&cli.trace)?;
    let events = trace::replay(&mut engine, &lines)?;
    print_events(&events, cli.format)?;

    if let Some(expect_path) = &cli.expect {
        let expected = trace::parse_expected(expect_path)?;
        let actual: Vec<String> = events
            .iter()
            .map(ReplayEvent::token)
            .filter(|token| cli.with_jerks || !token.starts_with("jerk:"))
            .collect();
        if actual != expected {
            eprintln!("expected events: {}", expected.join(","));
            eprintln!("actual events:   {}", actual.join(","));
            bail!("event sequence mismatch");
        }
    }

    let state = engine.snapshot();
    log::info!(
        "replayed {} samples, templates: {}",
        state.packet_count,
        engine.template_names().join(",")
    );
    Ok(())
}

fn print_events(events: &[ReplayEvent], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            println!("event,t_ms,kind,detail");
            for event in events {
                println!("event,{},{},{}", event.t_ms, event.kind.as_str(), event.detail);
            }
        }
        OutputFormat::Json => {
            for event in events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }
    Ok(())
}
