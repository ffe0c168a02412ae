use anyhow::{Context, Result};
use egui::Color32;
use kline_client::FetcherConfig;

/// Names a TOML file with `endpoint` / `timeout_secs` overrides.
pub const CONFIG_ENV: &str = "KLINE_CHART_CONFIG";

/// Look of the chart; handed to the renderer every frame.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub title_suffix: &'static str,
    pub chart_height: f32,
    /// Body width as a fraction of the interval.
    pub body_ratio: f64,
    pub up: Color32,
    pub down: Color32,
    pub accent: Color32,
    pub warn: Color32,
    pub error: Color32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title_suffix: "Candlestick — Live (Binance REST)",
            chart_height: 620.0,
            body_ratio: 0.7,
            up: Color32::from_rgb(0, 200, 0),
            down: Color32::from_rgb(220, 50, 47),
            accent: Color32::from_rgb(255, 200, 0),
            warn: Color32::from_rgb(230, 170, 40),
            error: Color32::from_rgb(235, 80, 80),
        }
    }
}

pub fn fetcher_config_from_env() -> Result<FetcherConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            tracing::info!(path = %path.to_string_lossy(), "loading fetcher config");
            FetcherConfig::from_file(&path).with_context(|| format!("{CONFIG_ENV}={}", path.to_string_lossy()))
        }
        None => Ok(FetcherConfig::default()),
    }
}
