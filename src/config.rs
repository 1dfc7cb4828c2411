//! Runtime configuration. Everything has a sensible default; the browser
//! entry points only override what the page knows (host, chart size).

use serde::{Deserialize, Serialize};

use crate::domain::{
    chart::PredictionMarker,
    errors::AppError,
    feed::FeedParams,
    game::GameMode,
};

/// Where and how the live feed connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// `host[:port]` of the page serving the game.
    pub host: String,
    /// `wss` instead of `ws`.
    pub secure: bool,
    pub path: String,
    pub reconnect_delay_ms: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            secure: false,
            path: "/ws".to_string(),
            reconnect_delay_ms: 3_000,
        }
    }
}

impl FeedConfig {
    /// Derive host and scheme from `window.location`.
    pub fn from_location() -> Result<Self, AppError> {
        let location = web_sys::window()
            .ok_or_else(|| AppError::ValidationError("window is not available".into()))?
            .location();
        let host = location
            .host()
            .map_err(|_| AppError::ValidationError("location.host unavailable".into()))?;
        let protocol = location.protocol().unwrap_or_default();
        Ok(Self {
            host,
            secure: protocol == "https:",
            ..Self::default()
        })
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure { "wss" } else { "ws" }
    }
}

/// REST endpoints used for the history bootstrap and peer predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "/api".to_string() }
    }
}

impl ApiConfig {
    pub fn price_history_url(&self, asset: &str) -> String {
        format!("{}/prices/history/{}", self.base_url, encode_path_segment(asset))
    }

    pub fn game_predictions_url(&self, game_id: &str) -> String {
        format!("{}/games/{}/predictions", self.base_url, encode_path_segment(game_id))
    }
}

/// Geometry and timing of the rolling price chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub window_secs: i64,
    pub lookahead_secs: i64,
    pub tick_ms: u32,
    pub top_inset_px: f64,
    pub bottom_inset_px: f64,
    /// Height reserved for the time axis at the bottom of the canvas.
    pub time_axis_px: f64,
    pub width: f64,
    pub height: f64,
    /// Draw off-screen predictions as edge badges instead of clamped lines.
    pub badge_mode: bool,
    pub enable_y_zoom: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window_secs: 300,
            lookahead_secs: 60,
            tick_ms: 40,
            top_inset_px: 3.0,
            bottom_inset_px: 30.0,
            time_axis_px: 26.0,
            width: 800.0,
            height: 360.0,
            badge_mode: false,
            enable_y_zoom: true,
        }
    }
}

impl ChartConfig {
    /// Samples older than the window are evicted, so this bounds memory.
    pub fn history_capacity(&self) -> usize {
        (self.window_secs + self.lookahead_secs).max(1) as usize * 2
    }

    pub fn pane_height(&self) -> f64 {
        (self.height - self.time_axis_px).max(1.0)
    }
}

/// Cadence of the ledger highlight animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    pub cadence_ms: f64,
    pub highlight_ms: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { cadence_ms: 500.0, highlight_ms: 1_000.0 }
    }
}

/// Everything the host page passes when mounting a live game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameOptions {
    pub game_id: String,
    pub player_id: Option<String>,
    pub token: Option<String>,
    pub asset: String,
    pub mode: Option<GameMode>,
    /// Kickoff as epoch milliseconds; passed checkpoints are hidden once set.
    pub kickoff_ms: Option<f64>,
    pub predictions: Vec<PredictionMarker>,
    pub chart: ChartConfig,
    pub api: ApiConfig,
}

impl GameOptions {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn feed_params(&self) -> Option<FeedParams> {
        FeedParams::new(&self.game_id, self.player_id.as_deref(), self.token.as_deref())
    }

    /// Checkpoint labels to offer in the histogram tabs.
    pub fn interval_labels(&self) -> Vec<String> {
        match self.mode {
            Some(mode) => mode.interval_labels().iter().map(|l| l.to_string()).collect(),
            None => {
                let mut labels: Vec<String> =
                    self.predictions.iter().map(|p| p.label.clone()).collect();
                labels.dedup();
                labels
            }
        }
    }
}

/// Percent-encode a value for use in a query string or path segment.
pub fn encode_path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
