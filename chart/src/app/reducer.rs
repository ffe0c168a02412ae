use chrono::Utc;
use kline_client::Symbol;

use super::event::*;
use super::state::*;

/// Applies one event. Returns true if anything visible changed.
pub fn reduce(state: &mut AppState, ev: AppEvent) -> bool {
    match ev {
        AppEvent::Ui(u) => reduce_ui(state, u),
        AppEvent::Fetch(f) => reduce_fetch(state, f),
    }
}

fn reduce_ui(state: &mut AppState, ev: UiEvent) -> bool {
    match ev {
        UiEvent::SymbolTyped { text } => {
            state.symbol_draft = text.to_ascii_uppercase();
            true
        }
        UiEvent::SymbolSubmitted => {
            let symbol = Symbol::new(&state.symbol_draft);
            state.symbol_draft = symbol.to_string();
            if symbol.is_empty() {
                state.params.symbol = symbol;
                state.view = None;
                state.notice = Some(Notice::EmptySymbol);
                return true;
            }
            if symbol == state.params.symbol {
                return false;
            }
            tracing::info!(%symbol, "symbol changed");
            state.params.symbol = symbol;
            state.refetch_pending = true;
            true
        }
        UiEvent::IntervalChanged { interval } => {
            if interval == state.params.interval {
                return false;
            }
            tracing::info!(%interval, "interval changed");
            state.params.interval = interval;
            state.refetch_pending = true;
            true
        }
        UiEvent::LimitChanged { limit } => {
            let limit = clamp_limit(limit);
            if limit == state.params.limit {
                return false;
            }
            state.params.limit = limit;
            state.refetch_pending = true;
            true
        }
        UiEvent::RefreshSecsChanged { secs } => {
            let secs = clamp_refresh_secs(secs);
            if secs == state.params.refresh_secs {
                return false;
            }
            state.params.refresh_secs = secs;
            state.refetch_pending = true;
            true
        }
        UiEvent::RefreshNow => {
            state.refetch_pending = true;
            true
        }
        UiEvent::ChartFitted => {
            state.fit_pending = false;
            false
        }
    }
}

fn reduce_fetch(state: &mut AppState, ev: FetchEvent) -> bool {
    match ev {
        FetchEvent::Started { cycle, query, at } => {
            tracing::debug!(cycle, symbol = %query.symbol, interval = %query.interval, limit = query.limit, "fetch started");
            state.in_flight = Some(cycle);
            state.last_started = Some(at);
            state.refetch_pending = false;
            true
        }
        FetchEvent::Completed { cycle, query, result } => {
            if state.in_flight != Some(cycle) {
                tracing::debug!(cycle, "dropping result of a cycle that is no longer current");
                return false;
            }
            state.in_flight = None;
            state.cycles_completed += 1;

            if state.params.symbol.is_empty() {
                tracing::debug!(cycle, symbol = %query.symbol, "symbol was cleared, result not shown");
                return false;
            }

            match result {
                Ok(table) if table.is_empty() => {
                    tracing::info!(cycle, symbol = %query.symbol, "no candles returned");
                    state.view = None;
                    state.notice = Some(Notice::NoData);
                }
                Ok(table) => {
                    tracing::debug!(cycle, rows = table.len(), "fetch completed");
                    if state.view.as_ref().map_or(true, |v| v.query != query) {
                        state.fit_pending = true;
                    }
                    state.view = Some(ChartView {
                        query,
                        table,
                        received_at: Utc::now(),
                    });
                    state.notice = None;
                }
                Err(failure) => {
                    tracing::warn!(cycle, symbol = %query.symbol, kind = %failure.kind, "{}", failure.message);
                    state.view = None;
                    state.notice = Some(Notice::Failure(failure));
                }
            }
            true
        }
    }
}
