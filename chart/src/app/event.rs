use std::time::Instant;

use kline_client::{CandleTable, FailureKind, FetchError, KlineInterval, KlineQuery};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Ui(UiEvent),
    Fetch(FetchEvent),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    SymbolTyped { text: String },
    SymbolSubmitted,
    IntervalChanged { interval: KlineInterval },
    LimitChanged { limit: u32 },
    RefreshSecsChanged { secs: u64 },
    RefreshNow,
    /// The plot took the bounds of a freshly loaded view.
    ChartFitted,
}

#[derive(Debug, Clone)]
pub enum FetchEvent {
    Started {
        cycle: u64,
        query: KlineQuery,
        at: Instant,
    },
    Completed {
        cycle: u64,
        query: KlineQuery,
        result: Result<CandleTable, FetchFailure>,
    },
}

/// What the UI needs to know about a failed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unexpected,
            message: message.into(),
        }
    }
}

impl From<FetchError> for FetchFailure {
    fn from(err: FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
