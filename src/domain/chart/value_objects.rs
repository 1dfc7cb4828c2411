use serde::Serialize;

use crate::domain::game::Zone;

/// Visible time range of the rolling chart, in fractional epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeWindow {
    pub from: f64,
    pub to: f64,
}

impl TimeWindow {
    /// `[now − window, now + lookahead]`.
    pub fn rolling(now_secs: f64, window_secs: i64, lookahead_secs: i64) -> Self {
        Self { from: now_secs - window_secs as f64, to: now_secs + lookahead_secs as f64 }
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.from && time <= self.to
    }
}

/// Value Object - Viewport
///
/// Maps time/price to canvas pixels for one frame. Prices are autoscaled to
/// the visible samples with a symmetric margin (the vertical zoom).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub start_time: f64,
    pub end_time: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub width: f64,
    /// Height of the price pane (canvas minus time axis).
    pub height: f64,
    pub margin: f64,
}

impl Viewport {
    /// Relative padding applied when every visible sample has the same price.
    const FLAT_RANGE_PADDING: f64 = 0.0005;

    pub fn fit(
        window: TimeWindow,
        (low, high): (f64, f64),
        width: f64,
        pane_height: f64,
        margin: f64,
    ) -> Self {
        let (min_price, max_price) = if high - low > f64::EPSILON * high.abs().max(1.0) {
            (low, high)
        } else {
            let pad = (high.abs() * Self::FLAT_RANGE_PADDING).max(0.01);
            (low - pad, high + pad)
        };
        Self {
            start_time: window.from,
            end_time: window.to,
            min_price,
            max_price,
            width: width.max(1.0),
            height: pane_height.max(1.0),
            margin: margin.clamp(0.0, 0.49),
        }
    }

    pub fn time_range(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn price_range(&self) -> f64 {
        self.max_price - self.min_price
    }

    fn usable_height(&self) -> f64 {
        self.height * (1.0 - 2.0 * self.margin)
    }

    pub fn time_to_x(&self, timestamp: f64) -> f64 {
        if self.time_range() == 0.0 {
            return 0.0;
        }
        (timestamp - self.start_time) / self.time_range() * self.width
    }

    pub fn x_to_time(&self, x: f64) -> f64 {
        self.start_time + self.time_range() * (x / self.width)
    }

    /// Price → canvas y. Out-of-range prices land outside the pane.
    pub fn price_to_y(&self, price: f64) -> f64 {
        let top = self.height * self.margin;
        top + (self.max_price - price) / self.price_range() * self.usable_height()
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        let top = self.height * self.margin;
        self.max_price - (y - top) / self.usable_height() * self.price_range()
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 1.0,
        }
    }

    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self { a: alpha.clamp(0.0, 1.0), ..*self }
    }

    /// `rgba(r, g, b, a)` for canvas and inline styles.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    pub const BACKGROUND: Color = Color::from_hex(0x11151c);
    pub const GRID: Color = Color::from_hex(0x222a36);
    pub const TEXT: Color = Color::from_hex(0x9aa4b2);
    pub const LINE: Color = Color::from_hex(0x4f8cff);
    pub const PREDICTION: Color = Color::from_hex(0xb084f5);
    pub const GOLD: Color = Color::from_hex(0xf5c542);
    pub const SILVER: Color = Color::from_hex(0xc0c7d1);
    pub const DEAD: Color = Color::from_hex(0xe0525a);

    /// Marker colour for an optional zone.
    pub fn for_zone(zone: Option<Zone>) -> Self {
        match zone {
            Some(Zone::Gold) => Self::GOLD,
            Some(Zone::Silver) => Self::SILVER,
            Some(Zone::Dead) => Self::DEAD,
            None => Self::PREDICTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::fit(TimeWindow { from: 0.0, to: 360.0 }, (100.0, 200.0), 720.0, 300.0, 0.1)
    }

    #[test]
    fn margins_leave_room_at_edges() {
        let vp = viewport();
        assert!((vp.price_to_y(200.0) - 30.0).abs() < 1e-9);
        assert!((vp.price_to_y(100.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn y_to_price_inverts_price_to_y() {
        let vp = viewport();
        for price in [50.0, 100.0, 137.5, 250.0] {
            assert!((vp.y_to_price(vp.price_to_y(price)) - price).abs() < 1e-9);
        }
    }

    #[test]
    fn x_to_time_inverts_time_to_x() {
        let vp = viewport();
        assert!((vp.time_to_x(90.0) - 180.0).abs() < 1e-9);
        assert!((vp.x_to_time(180.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn flat_range_is_padded() {
        let vp = Viewport::fit(TimeWindow { from: 0.0, to: 1.0 }, (50.0, 50.0), 100.0, 100.0, 0.1);
        assert!(vp.price_range() > 0.0);
        assert!((vp.price_to_y(50.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn css_color_with_alpha() {
        assert_eq!(Color::from_hex(0xff8000).with_alpha(0.5).to_css(), "rgba(255, 128, 0, 0.5)");
    }
}
