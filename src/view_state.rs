/// Vertical zoom of the price pane, driven by the mouse wheel.
///
/// The level only ever changes the autoscale margin; the time axis is fixed
/// by the rolling window.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    zoom_level: f64,
    pub max_level: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { zoom_level: 0.0, max_level: Self::MAX_LEVEL }
    }
}

impl ViewState {
    pub const MAX_LEVEL: f64 = 15.0;
    const WHEEL_UNITS_PER_LEVEL: f64 = 80.0;
    const BASE_MARGIN: f64 = 0.10;
    const MARGIN_PER_LEVEL: f64 = 0.04;
    const MAX_MARGIN: f64 = 0.45;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Accumulate a wheel delta. Returns `true` if the level moved.
    pub fn apply_wheel(&mut self, delta_y: f64) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        let next = (self.zoom_level + delta_y / Self::WHEEL_UNITS_PER_LEVEL)
            .clamp(0.0, self.max_level);
        let changed = next != self.zoom_level;
        self.zoom_level = next;
        changed
    }

    /// Fraction of the pane height left empty above and below the data.
    pub fn margin(&self) -> f64 {
        (Self::BASE_MARGIN + self.zoom_level * Self::MARGIN_PER_LEVEL).min(Self::MAX_MARGIN)
    }

    /// `"1.4× zoom"`, or empty at the base level.
    pub fn zoom_label(&self) -> String {
        if self.zoom_level > 0.0 {
            format!("{:.1}× zoom", 1.0 + self.zoom_level * 0.4)
        } else {
            String::new()
        }
    }

    pub fn reset(&mut self) {
        self.zoom_level = 0.0;
    }
}
