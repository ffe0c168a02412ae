use chrono::{DateTime, Utc};

/// One kline row after normalization.
///
/// Numeric cells that could not be read (prices, volumes, trade count) are
/// `None` rather than failing the whole fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub close_time: DateTime<Utc>,
    pub num_trades: Option<u64>,

    // pass-through, not used by the chart
    pub quote_volume: Option<f64>,
    pub taker_buy_base_volume: Option<f64>,
    pub taker_buy_quote_volume: Option<f64>,
}

impl Candle {
    /// `(open, high, low, close)` when all four are present.
    pub fn ohlc(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.open?, self.high?, self.low?, self.close?))
    }

    pub fn is_bullish(&self) -> Option<bool> {
        Some(self.close? >= self.open?)
    }
}

/// Candles in the order the upstream returned them (open time ascending).
///
/// Built fresh per fetch and never edited afterwards; there is
/// no way to push, sort or merge rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleTable {
    candles: Vec<Candle>,
}

impl CandleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Close of the newest candle and its change against the one before.
    ///
    /// With a single row the delta is zero. `None` if the table is empty or
    /// either close is missing.
    pub fn last_close(&self) -> Option<LastClose> {
        let last = self.candles.last()?;
        let value = last.close?;
        let prev = match self.candles.len() {
            0 | 1 => value,
            n => self.candles[n - 2].close?,
        };
        Some(LastClose {
            value,
            delta: value - prev,
        })
    }

    /// Lowest low and highest high over candles that have both.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.candles
            .iter()
            .filter_map(|c| Some((c.low?, c.high?)))
            .fold(None, |acc, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            })
    }
}

impl From<Vec<Candle>> for CandleTable {
    fn from(candles: Vec<Candle>) -> Self {
        Self { candles }
    }
}

impl IntoIterator for CandleTable {
    type Item = Candle;
    type IntoIter = std::vec::IntoIter<Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandleTable {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastClose {
    pub value: f64,
    pub delta: f64,
}
