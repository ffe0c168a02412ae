use chrono::DateTime;
use egui::{Color32, RichText, Stroke};
use egui_plot::{GridMark, HLine, Line, Plot, PlotBounds, PlotPoints, Polygon};
use kline_client::{Candle, KlineInterval};

use super::event::UiEvent;
use super::state::*;
use crate::config::ChartConfig;

/// Draws one frame and returns what the user changed in it.
pub fn render(ctx: &egui::Context, state: &AppState, cfg: &ChartConfig) -> Vec<UiEvent> {
    let mut events = Vec::new();

    egui::TopBottomPanel::top("params_panel").show(ctx, |ui| {
        ui.heading(format!("{} {}", state.params.symbol, cfg.title_suffix));
        ui_params(ui, state, &mut events);
        ui.label(
            RichText::new(format!(
                "Auto-refreshing every {} seconds…",
                state.params.refresh_secs
            ))
            .small()
            .weak(),
        );
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| ui_body(ui, state, cfg, &mut events));
    });

    events
}

fn ui_params(ui: &mut egui::Ui, state: &AppState, events: &mut Vec<UiEvent>) {
    ui.horizontal(|ui| {
        ui.label("Symbol (Binance)");
        let mut draft = state.symbol_draft.clone();
        let resp = ui.add(egui::TextEdit::singleline(&mut draft).desired_width(110.0));
        if resp.changed() {
            events.push(UiEvent::SymbolTyped { text: draft });
        }
        if resp.lost_focus() {
            events.push(UiEvent::SymbolSubmitted);
        }

        ui.separator();
        ui.label("Candle Interval");
        let current = state.params.interval;
        egui::ComboBox::from_id_source("interval_combo")
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                for iv in KlineInterval::UI_CHOICES {
                    if ui.selectable_label(iv == current, iv.as_str()).clicked() {
                        events.push(UiEvent::IntervalChanged { interval: iv });
                    }
                }
            })
            .response
            .on_hover_text("Binance native intervals (e.g., 1m = 1 minute).");

        ui.separator();
        ui.label("Candles Shown");
        let mut limit = state.params.limit;
        if ui
            .add(egui::Slider::new(&mut limit, LIMIT_MIN..=LIMIT_MAX).step_by(LIMIT_STEP as f64))
            .changed()
        {
            events.push(UiEvent::LimitChanged { limit });
        }

        ui.separator();
        ui.label("Refresh (sec)");
        let mut secs = state.params.refresh_secs;
        if ui
            .add(
                egui::DragValue::new(&mut secs)
                    .clamp_range(REFRESH_MIN_SECS..=REFRESH_MAX_SECS)
                    .speed(0.2),
            )
            .changed()
        {
            events.push(UiEvent::RefreshSecsChanged { secs });
        }

        if ui.button("Refresh now").clicked() {
            events.push(UiEvent::RefreshNow);
        }
        if state.is_fetching() {
            ui.spinner();
        }
    });
}

fn ui_body(ui: &mut egui::Ui, state: &AppState, cfg: &ChartConfig, events: &mut Vec<UiEvent>) {
    if let Some(notice) = &state.notice {
        let color = if notice.is_error() { cfg.error } else { cfg.warn };
        ui.colored_label(color, notice.text());
    }

    let Some(view) = &state.view else {
        if state.notice.is_none() {
            ui.label("Loading candles…");
        }
        return;
    };

    ui.label(
        RichText::new(format!(
            "{} {} · {} candles · updated {} · cycle {}",
            view.query.symbol,
            view.query.interval,
            view.table.len(),
            format_utc(view.received_at),
            state.cycles_completed
        ))
        .small()
        .weak(),
    );

    if ui_candles(ui, view, cfg, state.fit_pending) {
        events.push(UiEvent::ChartFitted);
    }
    ui.separator();
    ui_last_close(ui, view, cfg);
    ui.add_space(6.0);
    ui_latest_details(ui, view);
}

/// Returns true when the plot bounds were reset to the data this frame.
fn ui_candles(ui: &mut egui::Ui, view: &ChartView, cfg: &ChartConfig, fit: bool) -> bool {
    let table = &view.table;
    let (Some(first), Some(last), Some((lo, hi))) = (table.first(), table.last(), table.price_range()) else {
        ui.label("No complete candles to draw.");
        return false;
    };

    let (y_min, y_max) = padded_range(lo, hi);
    let x_min = first.open_time.timestamp_millis() as f64 / 1000.0;
    let x_max = last.close_time.timestamp_millis() as f64 / 1000.0;

    Plot::new("candles_plot")
        .height(cfg.chart_height)
        .allow_scroll(false)
        .allow_drag(true)
        .allow_zoom(true)
        .x_axis_formatter(|mark: GridMark, _chars, _range| format_axis_time(mark.value))
        .show(ui, |plot_ui| {
            if fit {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
            }

            for c in table {
                let Some((open, high, low, close)) = c.ohlc() else {
                    continue;
                };
                let span = candle_span_secs(c);
                let mid = c.open_time.timestamp_millis() as f64 / 1000.0 + span * 0.5;
                let body_half = span * cfg.body_ratio * 0.5;

                let top = open.max(close);
                let bot = open.min(close);
                let color = if close >= open { cfg.up } else { cfg.down };

                // wick
                let wick_pts: PlotPoints = vec![[mid, low], [mid, high]].into();
                plot_ui.line(Line::new(wick_pts).color(color));

                let body_pts: PlotPoints = vec![
                    [mid - body_half, bot],
                    [mid - body_half, top],
                    [mid + body_half, top],
                    [mid + body_half, bot],
                ]
                .into();
                plot_ui.polygon(
                    Polygon::new(body_pts)
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, color)),
                );
            }

            if let Some(m) = table.last_close() {
                plot_ui.hline(HLine::new(m.value).color(cfg.accent).name("last close"));
            }
        });
    fit
}

fn ui_last_close(ui: &mut egui::Ui, view: &ChartView, cfg: &ChartConfig) {
    ui.label(RichText::new(format!("Last Close ({})", view.query.symbol)).weak());
    match view.table.last_close() {
        Some(m) => {
            ui.label(RichText::new(format!("{:.2}", m.value)).size(28.0).strong());
            let color = delta_color(m.delta, cfg);
            ui.label(RichText::new(format_delta(m.delta)).color(color));
        }
        None => {
            ui.label(RichText::new("n/a").size(28.0).strong());
        }
    }
}

fn ui_latest_details(ui: &mut egui::Ui, view: &ChartView) {
    let Some(last) = view.table.last() else {
        return;
    };
    egui::CollapsingHeader::new("Latest Candle Details")
        .default_open(false)
        .show(ui, |ui| {
            egui::Grid::new("latest_candle_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (label, value) in latest_details(last) {
                        ui.label(label);
                        ui.monospace(value);
                        ui.end_row();
                    }
                });
        });
}

// ---- pure helpers ----

/// Interval length of a candle in seconds, from its own open/close times.
fn candle_span_secs(c: &Candle) -> f64 {
    let ms = (c.close_time - c.open_time).num_milliseconds() + 1;
    ms.max(1) as f64 / 1000.0
}

fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    let span = (hi - lo).max(1e-3);
    let pad = span * 0.05;
    (lo - pad, hi + pad)
}

fn format_axis_time(secs: f64) -> String {
    DateTime::from_timestamp(secs.floor() as i64, 0)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Delta at display precision; anything that rounds to zero is `0.0`.
fn rounded_delta(delta: f64) -> f64 {
    let d = (delta * 100.0).round() / 100.0;
    if d == 0.0 {
        0.0
    } else {
        d
    }
}

fn format_delta(delta: f64) -> String {
    format!("{:+.2}", rounded_delta(delta))
}

fn delta_color(delta: f64, cfg: &ChartConfig) -> Color32 {
    let d = rounded_delta(delta);
    if d > 0.0 {
        cfg.up
    } else if d < 0.0 {
        cfg.down
    } else {
        Color32::GRAY
    }
}

fn latest_details(c: &Candle) -> Vec<(&'static str, String)> {
    let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "missing".to_string());
    vec![
        ("Open Time", format_utc(c.open_time)),
        ("Close Time", format_utc(c.close_time)),
        ("Open", num(c.open)),
        ("High", num(c.high)),
        ("Low", num(c.low)),
        ("Close", num(c.close)),
        ("Volume", num(c.volume)),
        ("Trades", c.num_trades.map(|n| n.to_string()).unwrap_or_else(|| "missing".to_string())),
    ]
}
