//! Prediction markers drawn as horizontal lines over the price chart.
//!
//! A marker whose true price maps outside the drawable band is pinned to
//! the nearest edge and relabelled with its true price, so the player can
//! always see where they stand.

use serde::{Deserialize, Serialize};

use super::value_objects::{Color, Viewport};
use crate::domain::game::{GameMode, Zone, checkpoint_minutes};
use crate::time_utils::format_price;

/// A player's prediction for one checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMarker {
    pub label: String,
    pub price: f64,
    #[serde(default)]
    pub zone: Option<Zone>,
}

/// Inputs that decide which markers are still worth showing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarkerContext {
    pub now_ms: f64,
    /// Known only once the game is live; without it nothing is filtered by time.
    pub kickoff_ms: Option<f64>,
    pub mode: Option<GameMode>,
}

/// Drawable band of the canvas, in pixels from the top and bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgePosition {
    Above,
    Within,
    Below,
}

impl EdgePosition {
    pub fn classify(y: f64, chart_height: f64, insets: EdgeInsets) -> Self {
        if y < insets.top {
            EdgePosition::Above
        } else if y > chart_height - insets.bottom {
            EdgePosition::Below
        } else {
            EdgePosition::Within
        }
    }
}

/// Result of repositioning a marker for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerUpdate {
    Skipped,
    Unchanged,
    Clamped,
    Restored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLine {
    marker: PredictionMarker,
    minutes: Option<u32>,
    opacity: f64,
    rendered_price: f64,
    title: String,
    axis_label_visible: bool,
    is_clamped: bool,
    edge: EdgePosition,
    y: Option<f64>,
}

impl MarkerLine {
    pub fn new(marker: PredictionMarker, opacity: f64) -> Self {
        Self {
            minutes: checkpoint_minutes(&marker.label),
            opacity,
            rendered_price: marker.price,
            title: marker.label.clone(),
            axis_label_visible: true,
            is_clamped: false,
            edge: EdgePosition::Within,
            y: None,
            marker,
        }
    }

    /// Place the line for this frame. Plain within-range frames touch
    /// nothing; label/price writes happen on state transitions and while
    /// pinned (the edge price moves with the scale).
    pub fn reposition(
        &mut self,
        viewport: Option<&Viewport>,
        chart_height: f64,
        insets: EdgeInsets,
    ) -> MarkerUpdate {
        let Some(viewport) = viewport else {
            return MarkerUpdate::Skipped;
        };
        let y = viewport.price_to_y(self.marker.price);
        if !y.is_finite() {
            return MarkerUpdate::Skipped;
        }

        let edge = EdgePosition::classify(y, chart_height, insets);
        self.edge = edge;
        match edge {
            EdgePosition::Within => {
                self.y = Some(y);
                if !self.is_clamped {
                    return MarkerUpdate::Unchanged;
                }
                self.is_clamped = false;
                self.rendered_price = self.marker.price;
                self.title = self.marker.label.clone();
                self.axis_label_visible = true;
                MarkerUpdate::Restored
            }
            EdgePosition::Above | EdgePosition::Below => {
                let edge_y = if edge == EdgePosition::Above {
                    insets.top
                } else {
                    chart_height - insets.bottom
                };
                self.y = Some(edge_y);
                self.rendered_price = viewport.y_to_price(edge_y);
                self.title = format!("{}  {}", self.marker.label, format_price(self.marker.price));
                self.axis_label_visible = false;
                self.is_clamped = true;
                MarkerUpdate::Clamped
            }
        }
    }

    /// Badge mode: only track which side of the band the marker is on.
    /// The line keeps its true price and label and is never pinned.
    pub fn locate(
        &mut self,
        viewport: Option<&Viewport>,
        chart_height: f64,
        insets: EdgeInsets,
    ) -> MarkerUpdate {
        let Some(viewport) = viewport else {
            return MarkerUpdate::Skipped;
        };
        let y = viewport.price_to_y(self.marker.price);
        if !y.is_finite() {
            return MarkerUpdate::Skipped;
        }
        self.edge = EdgePosition::classify(y, chart_height, insets);
        self.y = Some(y);
        MarkerUpdate::Unchanged
    }

    /// Recolour for the player's current zone; placement is untouched.
    pub fn set_zone(&mut self, zone: Option<Zone>) {
        self.marker.zone = zone;
    }

    pub fn marker(&self) -> &PredictionMarker {
        &self.marker
    }

    pub fn label(&self) -> &str {
        &self.marker.label
    }

    pub fn minutes(&self) -> Option<u32> {
        self.minutes
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn rendered_price(&self) -> f64 {
        self.rendered_price
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn axis_label_visible(&self) -> bool {
        self.axis_label_visible
    }

    pub fn is_clamped(&self) -> bool {
        self.is_clamped
    }

    pub fn edge(&self) -> EdgePosition {
        self.edge
    }

    /// Canvas y of the last successful placement.
    pub fn y(&self) -> Option<f64> {
        self.y
    }

    pub fn color(&self) -> Color {
        Color::for_zone(self.marker.zone).with_alpha(self.opacity)
    }
}

const OPACITY_STEPS: [f64; 4] = [1.0, 0.7, 0.5, 0.3];

/// Filter, order and fade the player's predictions.
///
/// Non-positive prices are dropped. Once kickoff is known, checkpoints that
/// already passed are dropped too. Nearest checkpoint first; labels without
/// a parsable `T+m` sort last. Long games fade later checkpoints.
pub fn prepare_markers(predictions: &[PredictionMarker], ctx: MarkerContext) -> Vec<MarkerLine> {
    let mut kept: Vec<(Option<u32>, &PredictionMarker)> = predictions
        .iter()
        .filter(|p| p.price.is_finite() && p.price > 0.0)
        .map(|p| (checkpoint_minutes(&p.label), p))
        .filter(|(minutes, _)| match (ctx.kickoff_ms, minutes) {
            (Some(kickoff), Some(m)) => kickoff + *m as f64 * 60_000.0 > ctx.now_ms,
            _ => true,
        })
        .collect();
    kept.sort_by_key(|(minutes, _)| minutes.unwrap_or(u32::MAX));

    let fade = ctx.mode == Some(GameMode::SixtyMinutes) && kept.len() > 1;
    kept.into_iter()
        .enumerate()
        .map(|(index, (_, marker))| {
            let opacity = if fade {
                OPACITY_STEPS.get(index).copied().unwrap_or(OPACITY_STEPS[OPACITY_STEPS.len() - 1])
            } else {
                1.0
            };
            MarkerLine::new(marker.clone(), opacity)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::TimeWindow;

    fn marker(label: &str, price: f64) -> PredictionMarker {
        PredictionMarker { label: label.into(), price, zone: None }
    }

    const INSETS: EdgeInsets = EdgeInsets { top: 3.0, bottom: 30.0 };

    fn viewport() -> Viewport {
        // canvas 360 px, pane 334 px
        Viewport::fit(TimeWindow { from: 0.0, to: 360.0 }, (100.0, 200.0), 800.0, 334.0, 0.1)
    }

    #[test]
    fn locate_tracks_the_edge_without_pinning() {
        let vp = viewport();
        let mut line = MarkerLine::new(marker("T+15", 10_000.0), 1.0);
        assert_eq!(line.locate(Some(&vp), 360.0, INSETS), MarkerUpdate::Unchanged);
        assert_eq!(line.edge(), EdgePosition::Above);
        assert!(!line.is_clamped());
        assert_eq!(line.title(), "T+15");
        assert_eq!(line.rendered_price(), 10_000.0);
        assert!(line.y().is_some_and(|y| y < 3.0));
    }

    #[test]
    fn within_range_is_written_once() {
        let vp = viewport();
        let mut line = MarkerLine::new(marker("T+15", 150.0), 1.0);
        assert_eq!(line.reposition(Some(&vp), 360.0, INSETS), MarkerUpdate::Unchanged);
        assert_eq!(line.reposition(Some(&vp), 360.0, INSETS), MarkerUpdate::Unchanged);
        assert_eq!(line.rendered_price(), 150.0);
    }

    #[test]
    fn clamps_above_and_restores() {
        let vp = viewport();
        let mut line = MarkerLine::new(marker("T+15", 10_000.0), 1.0);
        assert_eq!(line.reposition(Some(&vp), 360.0, INSETS), MarkerUpdate::Clamped);
        assert_eq!(line.edge(), EdgePosition::Above);
        assert!((vp.price_to_y(line.rendered_price()) - 3.0).abs() < 1e-6);
        assert_eq!(line.title(), "T+15  10,000");
        assert!(!line.axis_label_visible());

        let wide = Viewport::fit(TimeWindow { from: 0.0, to: 360.0 }, (100.0, 20_000.0), 800.0, 334.0, 0.1);
        assert_eq!(line.reposition(Some(&wide), 360.0, INSETS), MarkerUpdate::Restored);
        assert_eq!(line.rendered_price(), 10_000.0);
        assert_eq!(line.title(), "T+15");
        assert!(line.axis_label_visible());
        assert_eq!(line.reposition(Some(&wide), 360.0, INSETS), MarkerUpdate::Unchanged);
    }

    #[test]
    fn not_ready_scale_skips() {
        let mut line = MarkerLine::new(marker("T+15", 1.0), 1.0);
        assert_eq!(line.reposition(None, 360.0, INSETS), MarkerUpdate::Skipped);
        assert_eq!(line.y(), None);
    }

    #[test]
    fn preparation_filters_and_fades() {
        let preds = vec![
            marker("T+45", 3.0),
            marker("T+15", 1.0),
            marker("T+30", 0.0),
            marker("T+60", 4.0),
        ];
        let ctx = MarkerContext { now_ms: 0.0, kickoff_ms: None, mode: Some(GameMode::SixtyMinutes) };
        let lines = prepare_markers(&preds, ctx);
        let labels: Vec<&str> = lines.iter().map(|l| l.label()).collect();
        assert_eq!(labels, vec!["T+15", "T+45", "T+60"]);
        let opacity: Vec<f64> = lines.iter().map(|l| l.opacity()).collect();
        assert_eq!(opacity, vec![1.0, 0.7, 0.5]);
    }

    #[test]
    fn passed_checkpoints_are_dropped_after_kickoff() {
        let preds = vec![marker("T+15", 1.0), marker("T+30", 2.0)];
        let ctx = MarkerContext {
            now_ms: 20.0 * 60_000.0,
            kickoff_ms: Some(0.0),
            mode: Some(GameMode::SixtyMinutes),
        };
        let lines = prepare_markers(&preds, ctx);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].label(), "T+30");
        assert_eq!(lines[0].opacity(), 1.0);
    }
}
