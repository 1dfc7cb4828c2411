use serde::Serialize;

use super::badges::{EdgeBadge, desired_badges};
use super::markers::{
    EdgeInsets, EdgePosition, MarkerContext, MarkerLine, PredictionMarker, prepare_markers,
};
use super::value_objects::{Color, TimeWindow, Viewport};
use crate::config::ChartConfig;
use crate::domain::game::Zone;
use crate::domain::market_data::{PriceSample, PriceTimeline};
use crate::time_utils::{format_tick_label, tick_times};
use crate::view_state::ViewState;

/// Lifecycle of one chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartPhase {
    Uninitialized,
    HistoryLoading,
    Live,
}

/// A prediction line as it should be painted this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub y: f64,
    pub price: f64,
    pub title: String,
    pub axis_label_visible: bool,
    pub is_clamped: bool,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    pub x: f64,
    pub label: String,
}

/// Everything the renderer needs for one tick; no references back into the
/// chart so painting cannot observe a half-updated state.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub window: TimeWindow,
    pub width: f64,
    pub height: f64,
    pub viewport: Option<Viewport>,
    pub line: Vec<(f64, f64)>,
    pub last_sample: Option<PriceSample>,
    pub markers: Vec<RenderedMarker>,
    pub badges: Vec<EdgeBadge>,
    pub ticks: Vec<TimeTick>,
    pub zoom_label: String,
}

/// Rolling-window price chart: the timeline, the vertical zoom and the
/// prediction markers, advanced by an explicit clock.
#[derive(Debug, Clone)]
pub struct PriceChart {
    config: ChartConfig,
    asset: String,
    phase: ChartPhase,
    timeline: PriceTimeline,
    view_state: ViewState,
    predictions: Vec<PredictionMarker>,
    marker_context: MarkerContext,
    markers: Vec<MarkerLine>,
    zone: Option<Zone>,
    viewport: Option<Viewport>,
}

impl PriceChart {
    pub fn new(asset: impl Into<String>, config: ChartConfig) -> Self {
        Self {
            timeline: PriceTimeline::new(config.history_capacity()),
            asset: asset.into(),
            phase: ChartPhase::Uninitialized,
            view_state: ViewState::new(),
            predictions: Vec::new(),
            marker_context: MarkerContext::default(),
            markers: Vec::new(),
            zone: None,
            viewport: None,
            config,
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn phase(&self) -> ChartPhase {
        self.phase
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn timeline(&self) -> &PriceTimeline {
        &self.timeline
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn markers(&self) -> &[MarkerLine] {
        &self.markers
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn begin_history_load(&mut self) {
        if self.phase == ChartPhase::Uninitialized {
            self.phase = ChartPhase::HistoryLoading;
        }
    }

    /// History arrived (or failed with `None`). The chart goes live either
    /// way and the pending predictions are applied.
    pub fn finish_history_load(&mut self, history: Option<Vec<PriceSample>>) {
        if self.phase != ChartPhase::HistoryLoading {
            return;
        }
        if let Some(history) = history {
            self.timeline.load_history(history);
        }
        self.phase = ChartPhase::Live;
        self.rebuild_markers();
    }

    pub fn set_live_price(&mut self, price: f64) {
        self.timeline.set_live_price(price);
    }

    /// Replace the player's predictions. Applied immediately when live,
    /// otherwise held until history completes.
    pub fn set_predictions(&mut self, predictions: Vec<PredictionMarker>, context: MarkerContext) {
        self.predictions = predictions;
        self.marker_context = context;
        if self.phase == ChartPhase::Live {
            self.rebuild_markers();
        }
    }

    /// The tracked player's zone colours every marker and badge.
    pub fn set_zone(&mut self, zone: Zone) {
        self.zone = Some(zone);
        for marker in &mut self.markers {
            marker.set_zone(Some(zone));
        }
    }

    pub fn zone(&self) -> Option<Zone> {
        self.zone
    }

    fn rebuild_markers(&mut self) {
        self.markers = prepare_markers(&self.predictions, self.marker_context);
        if let Some(zone) = self.zone {
            for marker in &mut self.markers {
                marker.set_zone(Some(zone));
            }
        }
    }

    pub fn apply_wheel(&mut self, delta_y: f64) -> bool {
        self.view_state.apply_wheel(delta_y)
    }

    pub fn resize(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.config.width = width;
        }
    }

    /// Back to `Uninitialized` with fresh state, for a new asset or height.
    pub fn restart(&mut self, asset: impl Into<String>, height: f64) {
        self.asset = asset.into();
        if height.is_finite() && height > 0.0 {
            self.config.height = height;
        }
        self.phase = ChartPhase::Uninitialized;
        self.timeline.clear();
        self.markers.clear();
        self.viewport = None;
        self.view_state.reset();
    }

    fn insets(&self) -> EdgeInsets {
        EdgeInsets { top: self.config.top_inset_px, bottom: self.config.bottom_inset_px }
    }

    /// One render tick: price update, clamp recompute, then the frame.
    /// Nothing happens before the chart is live.
    pub fn tick(&mut self, now_ms: f64) -> Option<Frame> {
        if self.phase != ChartPhase::Live {
            return None;
        }
        let now_secs = now_ms / 1000.0;

        self.timeline.record_tick(now_secs);
        let window =
            TimeWindow::rolling(now_secs, self.config.window_secs, self.config.lookahead_secs);
        self.timeline.evict_before(window.from.floor() as i64);

        self.viewport = self.timeline.price_range_between(window.from, window.to).map(|range| {
            Viewport::fit(
                window,
                range,
                self.config.width,
                self.config.pane_height(),
                self.view_state.margin(),
            )
        });

        let insets = self.insets();
        let height = self.config.height;
        // В режиме бейджей линии не прижимаются к краю: вне диапазона их заменяет бейдж
        for marker in &mut self.markers {
            if self.config.badge_mode {
                marker.locate(self.viewport.as_ref(), height, insets);
            } else {
                marker.reposition(self.viewport.as_ref(), height, insets);
            }
        }

        Some(self.build_frame(window))
    }

    fn build_frame(&self, window: TimeWindow) -> Frame {
        let line = match &self.viewport {
            Some(vp) => self
                .timeline
                .samples()
                .iter()
                .map(|s| (vp.time_to_x(s.time as f64), vp.price_to_y(s.price)))
                .collect(),
            None => Vec::new(),
        };

        let markers = match &self.viewport {
            Some(_) => self
                .markers
                .iter()
                .filter(|m| !self.config.badge_mode || m.edge() == EdgePosition::Within)
                .filter_map(|m| {
                    Some(RenderedMarker {
                        y: m.y()?,
                        price: m.rendered_price(),
                        title: m.title().to_string(),
                        axis_label_visible: m.axis_label_visible(),
                        is_clamped: m.is_clamped(),
                        color: m.color(),
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        let badges = if self.config.badge_mode { desired_badges(&self.markers) } else { Vec::new() };

        let ticks = match &self.viewport {
            Some(vp) => tick_times(window.from, window.to)
                .filter_map(|t| {
                    Some(TimeTick { x: vp.time_to_x(t as f64), label: format_tick_label(t)? })
                })
                .collect(),
            None => Vec::new(),
        };

        Frame {
            window,
            width: self.config.width,
            height: self.config.height,
            viewport: self.viewport.clone(),
            line,
            last_sample: self.timeline.latest().copied(),
            markers,
            badges,
            ticks,
            zoom_label: self.view_state.zoom_label(),
        }
    }

    /// Canvas y → price, `None` while the scale is not ready.
    pub fn price_at_y(&self, y: f64) -> Option<f64> {
        self.viewport.as_ref().map(|vp| vp.y_to_price(y))
    }

    /// Price → canvas y, `None` while the scale is not ready.
    pub fn y_for_price(&self, price: f64) -> Option<f64> {
        self.viewport.as_ref().map(|vp| vp.price_to_y(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_inert_until_live() {
        let mut chart = PriceChart::new("BTC", ChartConfig::default());
        chart.set_live_price(10.0);
        assert!(chart.tick(1_000.0).is_none());
        chart.begin_history_load();
        assert!(chart.tick(1_000.0).is_none());
        assert!(chart.timeline().is_empty());
    }

    #[test]
    fn failed_history_still_goes_live() {
        let mut chart = PriceChart::new("BTC", ChartConfig::default());
        chart.begin_history_load();
        chart.finish_history_load(None);
        assert_eq!(chart.phase(), ChartPhase::Live);
        let frame = chart.tick(5_000.0);
        assert!(frame.is_some_and(|f| f.viewport.is_none()));
        assert_eq!(chart.price_at_y(10.0), None);
    }

    #[test]
    fn restart_clears_everything() {
        let mut chart = PriceChart::new("BTC", ChartConfig::default());
        chart.begin_history_load();
        chart.finish_history_load(Some(vec![PriceSample::new(1, 1.0)]));
        chart.apply_wheel(160.0);
        chart.restart("ETH", 400.0);
        assert_eq!(chart.phase(), ChartPhase::Uninitialized);
        assert_eq!(chart.asset(), "ETH");
        assert!(chart.timeline().is_empty());
        assert_eq!(chart.view_state().zoom_level(), 0.0);
        assert_eq!(chart.config().height, 400.0);
    }
}
