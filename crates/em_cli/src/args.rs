// crates/em_cli/src/args.rs
//
// CLI argument surface for the `em` runner.
//
// Rules:
// - --config is a JSON file; flags override its fields
// - --interval accepts only 1000 | 2000 | 5000 (ms)
// - --seed is a decimal u64 or 0x-hex up to 16 nybbles
// - --no-timer runs ticks back-to-back and therefore needs --ticks

use std::path::PathBuf;

use clap::Parser;
use em_core::config::TickInterval;

/// Parsed CLI arguments.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "em",
    disable_help_subcommand = true,
    about = "Simulated election-night monitor: live district tallies with statistical anomaly alerts"
)]
pub struct Args {
    /// Monitor configuration JSON (every field optional).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tick interval in milliseconds (1000, 2000 or 5000).
    #[arg(long, value_parser = parse_interval)]
    pub interval: Option<TickInterval>,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    pub ticks: Option<u64>,

    /// RNG seed. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Per-district, per-tick anomaly injection probability in [0, 1].
    #[arg(long, value_parser = parse_rate)]
    pub anomaly_rate: Option<f64>,

    /// Run ticks back-to-back without the timer (requires --ticks).
    #[arg(long, requires = "ticks")]
    pub no_timer: bool,

    /// Final report format.
    #[arg(long, value_parser = ["json", "text"], default_value = "text")]
    pub render: String,

    /// Only log errors (the final report is still printed).
    #[arg(long)]
    pub quiet: bool,
}

/// `--seed` value: decimal u64, or `0x` followed by 1..=16 hex digits.
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if (1..=16).contains(&hex.len()) => (hex, 16),
        Some(_) => return Err(format!("hex seed must have 1 to 16 digits: {s}")),
        None => (s, 10),
    };
    // from_str_radix tolerates a leading '+'
    if digits.starts_with('+') {
        return Err(format!("not a seed: {s}"));
    }
    u64::from_str_radix(digits, radix).map_err(|e| format!("not a seed: {s} ({e})"))
}

pub fn parse_interval(s: &str) -> Result<TickInterval, String> {
    let ms: u64 = s.trim().parse().map_err(|_| format!("not a number of milliseconds: {s}"))?;
    TickInterval::try_from(ms).map_err(|e| e.to_string())
}

pub fn parse_rate(s: &str) -> Result<f64, String> {
    let p: f64 = s.trim().parse().map_err(|_| format!("not a number: {s}"))?;
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is outside [0, 1]"))
    }
}
