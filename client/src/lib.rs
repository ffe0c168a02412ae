//! Blocking client for the Binance spot klines endpoint.
//!
//! [`KlineFetcher::fetch`] performs one GET per call and turns the positional
//! array-of-arrays payload into a [`CandleTable`]. Nothing is cached between
//! calls.

pub mod candle;
pub mod config;
pub mod error;
pub mod interval;
pub mod normalize;
pub mod rest;
pub mod symbol;

pub use candle::{Candle, CandleTable, LastClose};
pub use config::FetcherConfig;
pub use error::{FailureKind, FetchError};
pub use interval::KlineInterval;
pub use rest::{fetch_klines, KlineFetcher, KlineQuery};
pub use symbol::Symbol;
