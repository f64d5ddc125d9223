//! Pricewatch CLI — inspect a fetched price history batch.
//!
//! Commands:
//! - `timeline` — merged timeline plus each store's aligned price line (JSON)
//! - `outages` — shared out-of-stock intervals (JSON)
//! - `tooltip` — ranked store prices near an instant, as a tooltip shows them

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use pricewatch_core::{
    batch, ChartSession, EngineConfig, PriceChart, ReportingPeriod, StoreBatch, StoreId,
};
use serde_json::json;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pricewatch",
    about = "Pricewatch CLI — align multi-store price histories and query them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged timeline and per-store aligned prices as JSON.
    Timeline {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print shared out-of-stock intervals as JSON.
    Outages {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the ranked tooltip for one instant.
    Tooltip {
        #[command(flatten)]
        input: InputArgs,

        /// Query instant (RFC 3339, e.g. 2024-09-01T12:00:00Z).
        #[arg(long)]
        at: String,

        /// Only show this store (legend isolation).
        #[arg(long)]
        isolate: Option<String>,

        /// Print the snapshot as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// History batch file (.json or .csv).
    #[arg(long)]
    batch: PathBuf,

    /// Path to a TOML engine config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Current instant (RFC 3339). Defaults to the wall clock.
    #[arg(long)]
    now: Option<String>,

    /// Reporting period: 30d, 90d, 180d, 365d or all. Overrides the config.
    #[arg(long)]
    period: Option<String>,

    /// Currency rate for a CSV store, as store=rate. Repeatable.
    #[arg(long = "rate", value_name = "STORE=RATE")]
    rates: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Timeline { input } => run_timeline(&input),
        Commands::Outages { input } => run_outages(&input),
        Commands::Tooltip {
            input,
            at,
            isolate,
            json,
        } => run_tooltip(&input, &at, isolate, json),
    }
}

fn run_timeline(input: &InputArgs) -> Result<()> {
    let chart = load_chart(input)?;
    let lines: serde_json::Map<String, serde_json::Value> = chart
        .price_lines()
        .iter()
        .map(|(store, prices)| (store.to_string(), json!(prices)))
        .collect();

    let out = json!({
        "now": chart.now(),
        "period": chart.period().to_string(),
        "has_displayable_prices": chart.has_displayable_prices(),
        "timeline": chart.timeline(),
        "price_lines": lines,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_outages(input: &InputArgs) -> Result<()> {
    let chart = load_chart(input)?;
    let intervals: Vec<serde_json::Value> = chart
        .outages()
        .iter()
        .filter_map(|interval| {
            let (start, end) = interval.span(chart.timeline())?;
            Some(json!({
                "start_index": interval.start_index,
                "end_index": interval.end_index,
                "start": start,
                "end": end,
            }))
        })
        .collect();

    info!(count = intervals.len(), "outage intervals detected");
    println!("{}", serde_json::to_string_pretty(&intervals)?);
    Ok(())
}

fn run_tooltip(input: &InputArgs, at: &str, isolate: Option<String>, as_json: bool) -> Result<()> {
    let query_time = parse_instant(at).context("invalid --at")?;
    let chart = load_chart(input)?;

    let mut session = ChartSession::new();
    session.replace(chart);
    if let Some(store) = isolate {
        let store = StoreId::from(store);
        if !session.toggle(&store) {
            bail!("unknown store '{store}' for --isolate");
        }
    }

    let view = session.tooltip(query_time);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let Some(anchor) = view.anchor else {
        println!("No data at or before {query_time}");
        return Ok(());
    };

    println!();
    println!("=== {} ===", anchor.format("%Y-%m-%d %H:%M UTC"));
    for row in &view.rows {
        let price = match (row.entry.has_data, row.entry.converted_price) {
            (false, _) => "no data".to_string(),
            (true, None) => "no price".to_string(),
            (true, Some(p)) => p.to_string(),
        };
        let delta = match row.delta_from_cheapest {
            Some(0) => "cheapest".to_string(),
            Some(d) => format!("+{d}"),
            None => String::new(),
        };
        println!("{:<20} {:>10}  {}", row.entry.store_id, price, delta);
    }
    Ok(())
}

/// Read the batch and config, then build the chart against one `now`.
fn load_chart(input: &InputArgs) -> Result<PriceChart> {
    let mut config = match &input.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(period) = &input.period {
        config.period = ReportingPeriod::parse(period)?;
    }

    let now = match &input.now {
        Some(s) => parse_instant(s).context("invalid --now")?,
        None => Utc::now(),
    };

    let batches = read_batches(&input.batch, &input.rates)?;
    debug!(stores = batches.len(), %now, period = %config.period, "building chart");
    Ok(PriceChart::build(batches, &config, now)?)
}

fn read_batches(path: &Path, rate_args: &[String]) -> Result<Vec<StoreBatch>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => {
            if !rate_args.is_empty() {
                bail!("--rate only applies to CSV batches; JSON batches carry currency_rate");
            }
            Ok(batch::from_json_reader(reader)?)
        }
        Some("csv") => {
            let rates = parse_rates(rate_args)?;
            Ok(batch::from_csv_reader(reader, &rates)?)
        }
        _ => bail!(
            "unsupported batch file '{}': expected a .json or .csv extension",
            path.display()
        ),
    }
}

fn parse_rates(args: &[String]) -> Result<HashMap<StoreId, f64>> {
    let mut rates = HashMap::new();
    for arg in args {
        let Some((store, rate)) = arg.split_once('=') else {
            bail!("invalid --rate '{arg}': expected STORE=RATE");
        };
        let rate: f64 = rate
            .trim()
            .parse()
            .with_context(|| format!("invalid rate in --rate '{arg}'"))?;
        if rates.insert(StoreId::from(store.trim()), rate).is_some() {
            bail!("--rate given twice for store '{}'", store.trim());
        }
    }
    Ok(rates)
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
