// crates/em_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, logging, config loading with flag
// overrides, the tick loop (timer or back-to-back) and the final report.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::fs;
use std::process::ExitCode;

use chrono::Utc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::Args;
use clap::Parser;
use em_core::config::MonitorConfig;
use em_core::entities::Severity;
use em_pipeline::{drive, Monitor, PipelineError, TickReport};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug, thiserror::Error)]
enum MainError {
    /// Bad configuration file contents or rejected overrides
    #[error("{0}")]
    Validation(String),
    /// Reading the config file or starting the runtime
    #[error("{0}")]
    Io(String),
    /// Report serialization
    #[error("render: {0}")]
    Render(String),
}

fn main() -> ExitCode {
    // clap exits with status 2 on usage errors
    let args = Args::parse();

    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("em: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) | MainError::Render(_) => exitcodes::IO,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    // every construction failure is an input problem
    MainError::Validation(e.to_string())
}

fn run(args: &Args) -> Result<(), MainError> {
    let config = load_config(args)?;
    let start = Utc::now();
    let mut monitor = Monitor::new_at(config, start).map_err(map_pipeline_err)?;

    monitor.start();
    if args.no_timer {
        // simulated clock: one interval per tick, so seeded runs are reproducible
        let step = chrono::Duration::milliseconds(monitor.tick_interval().as_millis() as i64);
        let mut now = start;
        for _ in 0..args.ticks.unwrap_or(0) {
            now += step;
            let report = monitor.tick_at(now);
            log_tick(&report);
        }
    } else {
        run_timer(&mut monitor, args.ticks)?;
    }
    monitor.pause();

    print_report(args, &monitor)
}

/// Config file (if any) with CLI overrides applied, validated.
fn load_config(args: &Args) -> Result<MonitorConfig, MainError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| MainError::Io(format!("read {}: {e}", path.display())))?;
            MonitorConfig::from_json_str(&text)
                .map_err(|e| MainError::Validation(format!("{}: {e}", path.display())))?
        }
        None => MonitorConfig::default(),
    };

    if let Some(interval) = args.interval {
        config.tick_interval = interval;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(rate) = args.anomaly_rate {
        config.simulation.anomaly_rate = rate;
    }
    config.validate().map_err(|e| MainError::Validation(e.to_string()))?;
    Ok(config)
}

fn run_timer(monitor: &mut Monitor, limit: Option<u64>) -> Result<(), MainError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MainError::Io(format!("runtime: {e}")))?;

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Ctrl-C handler unavailable; stop with --ticks");
            std::future::pending::<()>().await;
        }
    };

    let summary = runtime.block_on(drive(monitor, limit, None, shutdown, |_, report| log_tick(report)));
    tracing::info!(ticks = summary.ticks, reason = ?summary.reason, "run finished");
    Ok(())
}

fn log_tick(report: &TickReport) {
    for ev in &report.events {
        tracing::debug!(tick = report.tick, event = ?ev, "district event");
    }
    for a in &report.alerts {
        match a.severity {
            Severity::High => tracing::warn!(tick = report.tick, district = %a.district_id, kind = a.kind().as_str(), "{}", a.message),
            _ => tracing::info!(tick = report.tick, district = %a.district_id, kind = a.kind().as_str(), "{}", a.message),
        }
    }
    tracing::debug!(
        tick = report.tick,
        total_votes = report.history_entry.total_votes,
        anomalies = report.anomalies.len(),
        "tick"
    );
}

fn print_report(args: &Args, monitor: &Monitor) -> Result<(), MainError> {
    let history = monitor.history().to_vec();
    let model = em_report::build_model(monitor.list_candidates(), monitor.districts(), monitor.anomalies(), &history);

    match args.render.as_str() {
        #[cfg(feature = "report-json")]
        "json" => {
            let out = em_report::render_json(&model).map_err(|e| MainError::Render(e.to_string()))?;
            println!("{out}");
        }
        #[cfg(feature = "report-text")]
        "text" => print!("{}", em_report::render_text(&model)),
        other => return Err(MainError::Render(format!("renderer '{other}' not compiled in"))),
    }
    Ok(())
}
