use serde::{Deserialize, Serialize};

/// One price observation, bucketed to a whole second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub price: f64,
}

impl PriceSample {
    pub fn new(time: i64, price: f64) -> Self {
        Self { time, price }
    }

    /// Bucket a fractional wall-clock second (`floor`).
    pub fn at_second(now_secs: f64, price: f64) -> Self {
        Self { time: now_secs.floor() as i64, price }
    }

    pub fn is_valid(&self) -> bool {
        self.price.is_finite()
    }
}
