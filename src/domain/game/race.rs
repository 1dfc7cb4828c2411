//! Geometry of the rank-over-time "race track" chart.

use super::tracker::RankSnapshot;
use crate::time_utils::format_elapsed;

pub const TRACK_WIDTH: f64 = 900.0;
pub const TRACK_HEIGHT: f64 = 360.0;
const LEFT: f64 = 1.0;
const RIGHT: f64 = 50.0;
const TOP: f64 = 12.0;
const BOTTOM: f64 = 28.0;
const NICE_INTERVALS_MS: [f64; 7] =
    [15_000.0, 30_000.0, 60_000.0, 120_000.0, 300_000.0, 600_000.0, 900_000.0];
const MAX_TIME_LABELS: f64 = 5.0;

/// Last rank in gold and silver for a field of `total` players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneThresholds {
    pub gold_end: u32,
    pub silver_end: u32,
}

impl ZoneThresholds {
    pub fn for_total(total: usize) -> Self {
        let total = total as f64;
        let gold_end = ((total * 0.40).floor() as u32).max(1);
        let silver_end = ((total * 0.60).floor() as u32).max(gold_end + 1);
        Self { gold_end, silver_end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub position: f64,
    pub text: String,
}

/// Everything the view needs to draw the track.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceTrackLayout {
    pub points: Vec<(f64, f64)>,
    pub current: (f64, f64),
    pub thresholds: ZoneThresholds,
    pub gold_boundary_y: f64,
    pub silver_boundary_y: f64,
    pub plot_left: f64,
    pub plot_right: f64,
    pub plot_top: f64,
    pub plot_bottom: f64,
    pub x_labels: Vec<AxisLabel>,
    pub y_labels: Vec<AxisLabel>,
}

impl RaceTrackLayout {
    /// `None` while there is nothing to draw ("waiting for rank data").
    pub fn compute(history: &[RankSnapshot], total: usize) -> Option<Self> {
        let first = history.first()?;
        let last = history.last()?;
        if total == 0 {
            return None;
        }

        let chart_w = TRACK_WIDTH - LEFT - RIGHT;
        let chart_h = TRACK_HEIGHT - TOP - BOTTOM;
        let thresholds = ZoneThresholds::for_total(total);

        let rank_to_y = |rank: f64| {
            if total <= 1 {
                TOP + chart_h / 2.0
            } else {
                TOP + (rank - 1.0) / (total as f64 - 1.0) * chart_h
            }
        };

        let t_min = first.time_ms;
        let t_max = last.time_ms;
        let t_span = (t_max - t_min).max(1.0);
        let single = history.len() < 2;
        let time_to_x = |t: f64| {
            if single { LEFT + chart_w / 2.0 } else { LEFT + (t - t_min) / t_span * chart_w }
        };

        let (gold_boundary_y, silver_boundary_y) = if total > 1 {
            (
                rank_to_y(thresholds.gold_end as f64 + 0.5),
                rank_to_y(thresholds.silver_end as f64 + 0.5),
            )
        } else {
            (TOP + chart_h * 0.40, TOP + chart_h * 0.60)
        };

        let points = history
            .iter()
            .map(|s| (time_to_x(s.time_ms), rank_to_y(s.rank as f64)))
            .collect();

        let mut x_labels = Vec::new();
        if !single {
            let elapsed = t_max - t_min;
            let interval = NICE_INTERVALS_MS
                .iter()
                .copied()
                .find(|iv| elapsed / iv <= MAX_TIME_LABELS)
                .unwrap_or(NICE_INTERVALS_MS[NICE_INTERVALS_MS.len() - 1]);
            let mut t = t_min;
            while t <= t_max + 1.0 {
                x_labels.push(AxisLabel { position: time_to_x(t), text: format_elapsed(t - t_min) });
                t += interval;
            }
        }

        let mut label_ranks: Vec<u32> = Vec::with_capacity(4);
        for rank in [1, thresholds.gold_end, thresholds.silver_end, total as u32] {
            if !label_ranks.contains(&rank) {
                label_ranks.push(rank);
            }
        }
        let y_labels = label_ranks
            .into_iter()
            .map(|rank| AxisLabel { position: rank_to_y(rank as f64), text: format!("#{}", rank) })
            .collect();

        Some(Self {
            points,
            current: (time_to_x(last.time_ms), rank_to_y(last.rank as f64)),
            thresholds,
            gold_boundary_y,
            silver_boundary_y,
            plot_left: LEFT,
            plot_right: LEFT + chart_w,
            plot_top: TOP,
            plot_bottom: TOP + chart_h,
            x_labels,
            y_labels,
        })
    }

    /// SVG `points` attribute for the rank polyline.
    pub fn polyline(&self) -> String {
        self.points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", x, y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
