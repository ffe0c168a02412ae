//! Raw kline payload → [`CandleTable`].
//!
//! Each row is a positional array:
//!
//! | idx | field                         |
//! |-----|-------------------------------|
//! | 0   | open time (ms)                |
//! | 1-4 | open, high, low, close        |
//! | 5   | volume                        |
//! | 6   | close time (ms)               |
//! | 7   | quote asset volume            |
//! | 8   | number of trades              |
//! | 9   | taker buy base asset volume   |
//! | 10  | taker buy quote asset volume  |
//! | 11  | ignore                        |

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::candle::{Candle, CandleTable};
use crate::error::FetchError;

/// Rows must reach at least the trade count column.
pub const MIN_ROW_FIELDS: usize = 9;

const OPEN_TIME: usize = 0;
const OPEN: usize = 1;
const HIGH: usize = 2;
const LOW: usize = 3;
const CLOSE: usize = 4;
const VOLUME: usize = 5;
const CLOSE_TIME: usize = 6;
const QUOTE_VOLUME: usize = 7;
const NUM_TRADES: usize = 8;
const TAKER_BUY_BASE: usize = 9;
const TAKER_BUY_QUOTE: usize = 10;

/// Reads a price-like cell. Numbers and numeric strings parse; anything else,
/// including non-finite values, is missing.
pub fn parse_decimal(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Reads an integer cell given as a JSON integer or an integer string.
pub fn parse_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a trade count. Integral floats such as `10.0` are accepted;
/// negatives, fractions and non-numbers are missing.
pub fn parse_count(v: &Value) -> Option<u64> {
    if let Some(n) = parse_integer(v) {
        return u64::try_from(n).ok();
    }
    let x = parse_decimal(v)?;
    (x >= 0.0 && x.fract() == 0.0 && x <= u64::MAX as f64).then_some(x as u64)
}

pub fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Turns a decoded response body into a table.
///
/// Anything other than a non-empty array is treated as "no data" and yields
/// an empty table. Rows that cannot be laid out as klines fail the call;
/// single numeric cells that fail to parse only become `None`.
pub fn normalize_payload(payload: &Value) -> Result<CandleTable, FetchError> {
    let rows = match payload {
        Value::Array(rows) if !rows.is_empty() => rows,
        other => {
            log::debug!("kline payload has no rows (type: {})", json_type(other));
            return Ok(CandleTable::empty());
        }
    };

    let candles = rows
        .iter()
        .enumerate()
        .map(|(index, row)| normalize_row(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CandleTable::from(candles))
}

pub fn normalize_row(index: usize, row: &Value) -> Result<Candle, FetchError> {
    let cells = row
        .as_array()
        .ok_or_else(|| FetchError::malformed(index, format!("expected an array, got {}", json_type(row))))?;

    if cells.len() < MIN_ROW_FIELDS {
        return Err(FetchError::malformed(
            index,
            format!("expected at least {MIN_ROW_FIELDS} fields, got {}", cells.len()),
        ));
    }

    let timestamp = |col: usize, name: &str| -> Result<DateTime<Utc>, FetchError> {
        parse_integer(&cells[col])
            .and_then(millis_to_utc)
            .ok_or_else(|| FetchError::malformed(index, format!("{name} is not an epoch-ms integer: {}", cells[col])))
    };

    let decimal = |col: usize, name: &str| -> Option<f64> {
        let v = cells.get(col).and_then(parse_decimal);
        if v.is_none() {
            if let Some(raw) = cells.get(col) {
                log::trace!("row {index}: {name} {raw} treated as missing");
            }
        }
        v
    };

    let num_trades = parse_count(&cells[NUM_TRADES]);
    if num_trades.is_none() {
        log::trace!("row {index}: numTrades {} treated as missing", cells[NUM_TRADES]);
    }

    Ok(Candle {
        open_time: timestamp(OPEN_TIME, "openTime")?,
        open: decimal(OPEN, "open"),
        high: decimal(HIGH, "high"),
        low: decimal(LOW, "low"),
        close: decimal(CLOSE, "close"),
        volume: decimal(VOLUME, "volume"),
        close_time: timestamp(CLOSE_TIME, "closeTime")?,
        num_trades,
        quote_volume: decimal(QUOTE_VOLUME, "quoteVolume"),
        taker_buy_base_volume: decimal(TAKER_BUY_BASE, "takerBuyBase"),
        taker_buy_quote_volume: decimal(TAKER_BUY_QUOTE, "takerBuyQuote"),
    })
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
