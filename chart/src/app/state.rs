use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use kline_client::{CandleTable, KlineInterval, KlineQuery, Symbol};

use super::event::FetchFailure;

pub const LIMIT_MIN: u32 = 50;
pub const LIMIT_MAX: u32 = 1000;
pub const LIMIT_STEP: u32 = 50;
pub const LIMIT_DEFAULT: u32 = 200;

pub const REFRESH_MIN_SECS: u64 = 5;
pub const REFRESH_MAX_SECS: u64 = 60;
pub const REFRESH_DEFAULT_SECS: u64 = 5;

/// User-adjustable inputs. Every change schedules a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    pub symbol: Symbol,
    pub interval: KlineInterval,
    pub limit: u32,
    pub refresh_secs: u64,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            symbol: Symbol::default(),
            interval: KlineInterval::default(),
            limit: LIMIT_DEFAULT,
            refresh_secs: REFRESH_DEFAULT_SECS,
        }
    }
}

impl ChartParams {
    pub fn query(&self) -> KlineQuery {
        KlineQuery::new(self.symbol.clone(), self.interval, self.limit)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

/// Snap to the slider grid (50..=1000 in steps of 50).
pub fn clamp_limit(limit: u32) -> u32 {
    let snapped = ((limit + LIMIT_STEP / 2) / LIMIT_STEP) * LIMIT_STEP;
    snapped.clamp(LIMIT_MIN, LIMIT_MAX)
}

pub fn clamp_refresh_secs(secs: u64) -> u64 {
    secs.clamp(REFRESH_MIN_SECS, REFRESH_MAX_SECS)
}

/// The last successful non-empty fetch.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub query: KlineQuery,
    pub table: CandleTable,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoData,
    EmptySymbol,
    Failure(FetchFailure),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::NoData => "No data returned. Try a different symbol or interval.".to_string(),
            Notice::EmptySymbol => "Enter a symbol to load candles.".to_string(),
            Notice::Failure(f) => f.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Failure(_))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub params: ChartParams,
    /// Text box contents; becomes `params.symbol` on submit.
    pub symbol_draft: String,

    pub view: Option<ChartView>,
    pub notice: Option<Notice>,
    /// Plot bounds are reset to the data once, then left to the user.
    pub fit_pending: bool,

    pub in_flight: Option<u64>,
    pub last_started: Option<Instant>,
    pub refetch_pending: bool,
    pub cycles_completed: u64,
}

impl Default for AppState {
    fn default() -> Self {
        let params = ChartParams::default();
        Self {
            symbol_draft: params.symbol.to_string(),
            params,
            view: None,
            notice: None,
            fit_pending: false,
            in_flight: None,
            last_started: None,
            refetch_pending: true,
            cycles_completed: 0,
        }
    }
}

impl AppState {
    /// Query to start now, if any.
    ///
    /// Only one fetch runs at a time; a refresh that comes due while one is
    /// outstanding is skipped rather than queued.
    pub fn fetch_due(&self, now: Instant) -> Option<KlineQuery> {
        if self.in_flight.is_some() || self.params.symbol.is_empty() {
            return None;
        }
        let due = self.refetch_pending
            || match self.last_started {
                None => true,
                Some(t) => now.saturating_duration_since(t) >= self.params.refresh_period(),
            };
        due.then(|| self.params.query())
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }
}

pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
