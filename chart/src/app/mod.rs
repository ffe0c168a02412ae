pub mod event;
pub mod reducer;
pub mod render;
pub mod state;

pub use event::*;
pub use state::*;

use std::time::{Duration, Instant};

use kline_client::KlineFetcher;

use crate::config::ChartConfig;
use crate::poller::Poller;

/// Frame cadence while idle; fetch timing is driven by `AppState::fetch_due`.
const REPAINT_EVERY: Duration = Duration::from_millis(250);

pub struct ChartApp {
    pub state: AppState,
    config: ChartConfig,
    poller: Poller,
}

impl ChartApp {
    pub fn new(fetcher: KlineFetcher, config: ChartConfig) -> Self {
        Self {
            state: AppState::default(),
            config,
            poller: Poller::new(fetcher),
        }
    }

    pub fn handle_event(&mut self, ev: AppEvent) -> bool {
        reducer::reduce(&mut self.state, ev)
    }

    /// Collects finished cycles and starts the next one if it is due.
    fn pump(&mut self, now: Instant) {
        for ev in self.poller.drain() {
            self.handle_event(AppEvent::Fetch(ev));
        }

        if let Some(query) = self.state.fetch_due(now) {
            let cycle = self.poller.start(query.clone());
            self.handle_event(AppEvent::Fetch(FetchEvent::Started { cycle, query, at: now }));
        }
    }
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump(Instant::now());

        for ev in render::render(ctx, &self.state, &self.config) {
            self.handle_event(AppEvent::Ui(ev));
        }

        ctx.request_repaint_after(REPAINT_EVERY);
    }
}
