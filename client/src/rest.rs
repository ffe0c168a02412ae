use reqwest::blocking::Client;

use crate::candle::CandleTable;
use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::interval::KlineInterval;
use crate::normalize::normalize_payload;
use crate::symbol::Symbol;

/// Parameters of one klines request.
///
/// The interval is kept as the wire code so that codes outside
/// [`KlineInterval`] still reach the exchange, which rejects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub symbol: Symbol,
    pub interval: String,
    pub limit: u32,
}

impl KlineQuery {
    pub fn new(symbol: impl Into<Symbol>, interval: KlineInterval, limit: u32) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.as_str().to_string(),
            limit,
        }
    }

    pub fn with_raw_interval(symbol: impl Into<Symbol>, interval: impl Into<String>, limit: u32) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            limit,
        }
    }

    fn params(&self) -> [(&'static str, String); 3] {
        [
            ("symbol", self.symbol.to_string()),
            ("interval", self.interval.clone()),
            ("limit", self.limit.to_string()),
        ]
    }
}

/// Blocking klines client.
///
/// Holds only the HTTP client and its settings; every [`fetch`](Self::fetch)
/// is an independent request with no memory of earlier results.
#[derive(Debug, Clone)]
pub struct KlineFetcher {
    http: Client,
    config: FetcherConfig,
}

impl KlineFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// One GET against the configured endpoint, normalized into a table.
    ///
    /// Blocks for at most the configured timeout. Never retries.
    pub fn fetch(&self, query: &KlineQuery) -> Result<CandleTable, FetchError> {
        log::debug!(
            "GET {} symbol={} interval={} limit={}",
            self.config.endpoint,
            query.symbol,
            query.interval,
            query.limit
        );

        let resp = self
            .http
            .get(&self.config.endpoint)
            .query(&query.params())
            .send()
            .map_err(FetchError::Network)?;

        let status = resp.status();
        let url = resp.url().to_string();
        if !status.is_success() {
            // error body is informational only; a failed read must not mask the status
            let body = resp.text().unwrap_or_default();
            log::warn!("klines request failed: {status} ({url}) body={body}");
            return Err(FetchError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                url,
                body,
            });
        }

        let body = resp.text().map_err(FetchError::Network)?;
        let payload: serde_json::Value = serde_json::from_str(&body)?;
        let table = normalize_payload(&payload)?;
        log::debug!("{} candles for {} {}", table.len(), query.symbol, query.interval);
        Ok(table)
    }
}

/// Fetch with default settings (Binance spot, 10 s timeout).
pub fn fetch_klines(symbol: &str, interval: KlineInterval, limit: u32) -> Result<CandleTable, FetchError> {
    KlineFetcher::new(FetcherConfig::default())?.fetch(&KlineQuery::new(symbol, interval, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_use_wire_codes() {
        let q = KlineQuery::new("btcusdt", KlineInterval::FifteenMinutes, 200);
        let params = q.params();
        assert_eq!(params[0], ("symbol", "BTCUSDT".to_string()));
        assert_eq!(params[1], ("interval", "15m".to_string()));
        assert_eq!(params[2], ("limit", "200".to_string()));
    }

    #[test]
    fn raw_interval_passes_through_unchecked() {
        let q = KlineQuery::with_raw_interval("ETHUSDT", "7m", 5);
        assert_eq!(q.params()[1].1, "7m");
    }
}
