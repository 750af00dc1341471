mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, format_report_json, humanize};
use crate::run::{RoundParams, RoundReport, make_backend, run_round};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = player_config::load_file(&cli.config).wrap_err("load config")?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::SelfCheck => self_check(&cfg, cli.json),
        Commands::Run {
            max_ticks,
            sim_press_ms,
        } => run(&cfg, cli.json, max_ticks, sim_press_ms),
    }
}

fn self_check(cfg: &player_config::Config, json: bool) -> eyre::Result<()> {
    let backend = make_backend(cfg, 1)?;
    let state = backend.player.state();
    tracing::info!(backend = backend.name, %state, "self-check passed");
    if json {
        println!(
            "{}",
            serde_json::json!({ "status": "ok", "backend": backend.name, "state": state.label() })
        );
    } else {
        println!("ok ({} backend, {state})", backend.name);
    }
    Ok(())
}

fn run(
    cfg: &player_config::Config,
    json: bool,
    max_ticks: Option<u64>,
    sim_press_ms: u64,
) -> eyre::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let mut backend = make_backend(cfg, sim_press_ms)?;
    let params = RoundParams {
        tick: Duration::from_millis(cfg.runner.tick_ms),
        max_ticks: max_ticks.unwrap_or(cfg.runner.max_ticks),
    };
    let mut report = RoundReport::default();
    let result = run_round(&mut backend, params, &shutdown, &mut report);

    if json {
        println!("{}", format_report_json(&report, result.as_ref().err()));
    } else {
        for (tick, t) in &report.transitions {
            println!("[tick {tick:>6}] {t}");
        }
        if result.is_ok() {
            println!(
                "round complete: {} ticks, {} ms",
                report.ticks, report.duration_ms
            );
        }
    }
    result
}

/// Console layer on stderr (pretty or JSON), plus an optional JSON file
/// layer from `[logging]`. `RUST_LOG` overrides `--log-level` for the console.
fn init_tracing(json: bool, level: &str, logging: &player_config::Logging) -> eyre::Result<()> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err("invalid --log-level")?,
    };
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_filter = EnvFilter::try_new(logging.level.as_deref().unwrap_or("info"))
            .wrap_err("invalid logging.level")?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")
}
