// chart/src/main.rs
//
// Live candlestick chart over the Binance spot REST klines endpoint.
//
//   - Polls GET /api/v3/klines every N seconds (5..60) on a worker thread.
//   - Symbol / interval / candles-shown / refresh inputs in the top bar;
//     any change refetches right away.
//   - Candles, last close with delta vs. previous close, and a collapsible
//     panel with the newest candle's fields.
//
// Env:
//   KLINE_CHART_CONFIG=path/to/fetcher.toml   (endpoint, timeout_secs)
//   RUST_LOG=kline_chart=debug,kline_client=debug
//
// Run:
//   cargo run --release -p kline_chart
//

mod app;
mod config;
mod poller;

use anyhow::{anyhow, Context, Result};
use kline_client::KlineFetcher;
use tracing_subscriber::EnvFilter;

use crate::app::ChartApp;
use crate::config::{fetcher_config_from_env, ChartConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_tracing();

    let fetcher_cfg = fetcher_config_from_env()?;
    tracing::info!(
        endpoint = %fetcher_cfg.endpoint,
        timeout_secs = fetcher_cfg.timeout_secs,
        "starting kline chart"
    );
    let fetcher = KlineFetcher::new(fetcher_cfg).context("build http client")?;
    let chart_cfg = ChartConfig::default();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Kline Chart (Binance REST)",
        native_options,
        Box::new(move |_cc| Box::new(ChartApp::new(fetcher, chart_cfg))),
    )
    .map_err(|e| anyhow!("eframe error: {e}"))
}
