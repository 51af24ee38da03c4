// Engine main entry point
use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use engine::config::EngineSettings;
use engine::data::market_data::HistoryRange;
use engine::services::{ComparisonRequest, DashboardService, SecurityRequest};
use shared::indicator::IndicatorSpec;
use shared::models::{Interval, Period};
use std::path::PathBuf;
use tracing::info;

/// Renders dashboard views from local OHLCV files as JSON.
#[derive(Debug, Parser)]
#[command(name = "engine", version, about)]
struct Cli {
    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticker symbol; give it several times for the comparison view
    #[arg(short, long = "symbol", required = true)]
    symbols: Vec<String>,

    /// Look-back period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
    #[arg(short, long, conflicts_with = "start")]
    period: Option<Period>,

    /// Bar interval (1m ... 3mo)
    #[arg(short, long)]
    interval: Option<Interval>,

    /// Fetch from this date (YYYY-MM-DD) instead of a period
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Indicator token such as SMA_20, RSI or Crossover_SMA_20/50
    #[arg(long = "indicator")]
    indicators: Vec<IndicatorSpec>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let settings = EngineSettings::load_or_default(cli.config.as_deref())?;
    info!(data_dir = %settings.data_dir.display(), "Starting dashboard engine...");

    let range = match cli.start {
        Some(date) => HistoryRange::Start(date),
        None => HistoryRange::Period(cli.period.unwrap_or(settings.default_period)),
    };
    let interval = cli.interval.unwrap_or(settings.default_interval);
    let service = DashboardService::from_settings(&settings);

    let output = if cli.symbols.len() == 1 {
        let indicators = if cli.indicators.is_empty() {
            settings.default_indicators.clone()
        } else {
            cli.indicators
        };
        let view = service
            .render_security(SecurityRequest {
                symbol: cli.symbols[0].clone(),
                range,
                interval,
                indicators,
            })
            .await?;
        serde_json::to_string_pretty(&view)
    } else {
        let view = service
            .render_comparison(ComparisonRequest {
                symbols: cli.symbols,
                range,
                interval,
            })
            .await?;
        let columns: Vec<&str> = view.performance.columns.iter().map(|c| c.symbol.as_str()).collect();
        info!(?columns, skipped = ?view.performance.skipped, "Performance table");
        for (label, cells) in view.performance.formatted_rows() {
            info!(row = label, values = ?cells, "Performance");
        }
        serde_json::to_string_pretty(&view)
    }
    .context("Failed to serialize view")?;

    println!("{}", output);
    Ok(())
}
