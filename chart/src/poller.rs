use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use kline_client::{KlineFetcher, KlineQuery};

use crate::app::{FetchEvent, FetchFailure};

/// Runs each blocking fetch on its own short-lived thread so the UI keeps
/// painting while the request is out. Results come back over a channel and
/// are drained once per frame.
pub struct Poller {
    fetcher: KlineFetcher,
    tx: Sender<FetchEvent>,
    rx: Receiver<FetchEvent>,
    next_cycle: u64,
}

impl Poller {
    pub fn new(fetcher: KlineFetcher) -> Self {
        let (tx, rx) = channel();
        Self {
            fetcher,
            tx,
            rx,
            next_cycle: 1,
        }
    }

    /// Spawns the fetch for `query` and returns its cycle number.
    pub fn start(&mut self, query: KlineQuery) -> u64 {
        let cycle = self.next_cycle;
        self.next_cycle += 1;

        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let worker_query = query.clone();
        let spawned = thread::Builder::new()
            .name(format!("kline-fetch-{cycle}"))
            .spawn(move || {
                let query = worker_query;
                let result = match panic::catch_unwind(AssertUnwindSafe(|| fetcher.fetch(&query))) {
                    Ok(r) => r.map_err(FetchFailure::from),
                    Err(_) => Err(FetchFailure::unexpected("fetch worker panicked")),
                };
                let _ = tx.send(FetchEvent::Completed { cycle, query, result });
            });

        if let Err(err) = spawned {
            tracing::error!(cycle, "failed to spawn fetch worker: {err}");
            let _ = self.tx.send(FetchEvent::Completed {
                cycle,
                query,
                result: Err(FetchFailure::unexpected(format!("failed to spawn fetch worker: {err}"))),
            });
        }

        cycle
    }

    /// Completed cycles since the last call; never blocks.
    pub fn drain(&self) -> Vec<FetchEvent> {
        self.rx.try_iter().collect()
    }
}
