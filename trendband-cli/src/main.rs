//! TrendBand CLI: compute SuperTrend variants over CSV bar files.
//!
//! Commands:
//! - `compute`: read a CSV, run the configured variant, print a summary and
//!   optionally write the full result as JSON
//! - `synthetic`: write a deterministic random-walk series as CSV
//! - `config`: print the default config file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendband_core::data::{generate_series, read_csv_path, write_csv, CanonicalizeOptions};
use trendband_core::indicators::{pivot_breakout, pivot_strength, AtrSeries};
use trendband_core::{
    CenterPolicy, EngineConfig, IndicatorResult, Series, Supertrend, SupertrendConfig,
    TrendIndicator, WorkerPool,
};

#[derive(Parser)]
#[command(
    name = "trendband",
    about = "TrendBand CLI: SuperTrend hysteresis bands over OHLCV bars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute SuperTrend over a CSV of bars.
    Compute {
        /// Input CSV with a header row. Columns are detected by name.
        #[arg(long)]
        input: PathBuf,

        /// Path to a TOML config file. Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// ATR period.
        #[arg(long)]
        atr_period: Option<u32>,

        /// Band width in ATRs.
        #[arg(long)]
        multiplier: Option<f64>,

        /// Use the pivot center with this pivot period.
        #[arg(long)]
        pivot_period: Option<u32>,

        /// Force the HL2 center even if the config file selects pivots.
        #[arg(long, default_value_t = false)]
        hl2: bool,

        /// Discard the last row (a bar that is still forming).
        #[arg(long, default_value_t = false)]
        drop_last: bool,

        /// Write the full result as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print only the latest value.
        #[arg(long, default_value_t = false)]
        latest: bool,
    },
    /// Write a deterministic synthetic series as CSV.
    Synthetic {
        /// Number of bars.
        #[arg(long, default_value_t = 1000)]
        bars: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Opening price of the first bar.
        #[arg(long, default_value_t = 100.0)]
        start_price: f64,

        /// Output CSV path. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the default config file.
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendband=info,trendband_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            input,
            config,
            atr_period,
            multiplier,
            pivot_period,
            hl2,
            drop_last,
            output,
            latest,
        } => {
            let engine = build_config(config, atr_period, multiplier, pivot_period, hl2)?;
            run_compute(&engine, &input, drop_last, output, latest)
        }
        Commands::Synthetic {
            bars,
            seed,
            start_price,
            output,
        } => run_synthetic(bars, seed, start_price, output),
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&EngineConfig::default())?);
            Ok(())
        }
    }
}

fn build_config(
    path: Option<PathBuf>,
    atr_period: Option<u32>,
    multiplier: Option<f64>,
    pivot_period: Option<u32>,
    hl2: bool,
) -> Result<EngineConfig> {
    if hl2 && pivot_period.is_some() {
        bail!("--hl2 and --pivot-period are mutually exclusive");
    }

    let mut engine = match path {
        Some(p) => EngineConfig::from_file(&p)
            .with_context(|| format!("loading config {}", p.display()))?,
        None => EngineConfig::default(),
    };

    let st: &mut SupertrendConfig = &mut engine.supertrend;
    if let Some(p) = atr_period {
        st.atr_period = p;
    }
    if let Some(m) = multiplier {
        st.multiplier = m;
    }
    if let Some(pivot_period) = pivot_period {
        st.center = CenterPolicy::Pivot { pivot_period };
    }
    if hl2 {
        st.center = CenterPolicy::Hl2;
    }

    engine.validate()?;
    Ok(engine)
}

fn run_compute(
    engine: &EngineConfig,
    input: &Path,
    drop_last: bool,
    output: Option<PathBuf>,
    latest_only: bool,
) -> Result<()> {
    let pool = WorkerPool::new(engine.parallel.clone())?;
    let options = CanonicalizeOptions { drop_last };
    let series = read_csv_path(input, None, &options, &pool)
        .with_context(|| format!("reading {}", input.display()))?;
    tracing::info!(bars = series.len(), input = %input.display(), "loaded series");

    let indicator = Supertrend::new(engine.supertrend)?.with_parallel(pool);
    let result = indicator.compute(&series)?;

    if let Some(path) = output {
        write_report(&path, engine, indicator.name(), &result)?;
        tracing::info!(output = %path.display(), "result written");
    }

    let Some(reading) = result.latest() else {
        bail!("empty result");
    };

    if latest_only {
        println!("{}", reading.value);
        return Ok(());
    }

    print_summary(engine, indicator.name(), &series, &result)?;
    Ok(())
}

fn write_report(
    path: &Path,
    engine: &EngineConfig,
    name: &str,
    result: &IndicatorResult,
) -> Result<()> {
    let report = json!({
        "indicator": name,
        "config_id": engine.supertrend.config_id()?,
        "config": engine.supertrend,
        "digest": result.digest(),
        "result": result,
    });
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

fn print_summary(
    engine: &EngineConfig,
    name: &str,
    series: &Series,
    result: &IndicatorResult,
) -> Result<()> {
    let Some(reading) = result.latest() else {
        bail!("empty result");
    };
    let last_time = chrono::DateTime::from_timestamp_millis(series.last().timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| series.last().timestamp.to_string());

    println!("Indicator:   {name}");
    println!("Center:      {}", engine.supertrend.center.label());
    let config_id = engine.supertrend.config_id()?;
    println!("Config id:   {}", &config_id[..12]);
    println!("Bars:        {}", series.len());
    println!("Last bar:    {last_time}");
    println!();
    println!("{:<22} {:>14}", "Value", format!("{:.4}", reading.value));
    println!("{:<22} {:>14}", "Direction", format!("{:?}", reading.direction));
    println!("{:<22} {:>14}", "Upper", format!("{:.4}", reading.upper));
    println!("{:<22} {:>14}", "Lower", format!("{:.4}", reading.lower));
    println!("{:<22} {:>14}", "Trend duration", result.trend_duration());
    println!(
        "{:<22} {:>14}",
        "Bandwidth",
        format!("{:.4}", result.bandwidth().unwrap_or(0.0))
    );
    println!(
        "{:<22} {:>14}",
        "Trend quality",
        format!("{:.4}", result.trend_quality().unwrap_or(0.0))
    );
    let atr = AtrSeries::compute(series.bars(), engine.supertrend.atr_period)?;
    println!("{:<22} {:>14}", "ATR", format!("{:.4}", atr.value()));
    println!(
        "{:<22} {:>14}",
        "Volatility change %",
        format_optional(atr.volatility_change())
    );
    println!(
        "{:<22} {:>14}",
        "Volatility ratio",
        format_optional(atr.volatility_ratio())
    );
    println!("{:<22} {:>14}", "Trend change", result.is_trend_change());
    println!("{:<22} {:>14}", "Bullish cross", result.is_bullish_cross());
    println!("{:<22} {:>14}", "Bearish cross", result.is_bearish_cross());
    println!("{:<22} {:>14}", "Breakout possible", result.is_breakout_possible(None));

    if let CenterPolicy::Pivot { pivot_period } = engine.supertrend.center {
        println!(
            "{:<22} {:>14}",
            "Pivot breakout",
            pivot_breakout(series, pivot_period)?
        );
        println!(
            "{:<22} {:>14}",
            "Pivot strength",
            format!("{:.4}", pivot_strength(series, pivot_period)?)
        );
    }

    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn run_synthetic(bars: usize, seed: u64, start_price: f64, output: Option<PathBuf>) -> Result<()> {
    let series = generate_series(bars, seed, start_price)?;
    match output {
        Some(path) => {
            write_csv(BufWriter::new(File::create(&path)?), &series)?;
            tracing::info!(bars, seed, output = %path.display(), "synthetic series written");
        }
        None => write_csv(std::io::stdout().lock(), &series)?,
    }
    Ok(())
}
