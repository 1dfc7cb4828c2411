use super::value_objects::PriceSample;
use std::collections::VecDeque;

/// Rolling store of per-second price samples plus the latest live price.
///
/// Samples stay sorted by `time` with at most one entry per second; a later
/// write for a second replaces the earlier one.
#[derive(Debug, Clone)]
pub struct PriceTimeline {
    samples: VecDeque<PriceSample>,
    max_size: usize,
    live_price: Option<f64>,
}

impl PriceTimeline {
    pub fn new(max_size: usize) -> Self {
        Self { samples: VecDeque::new(), max_size: max_size.max(1), live_price: None }
    }

    pub fn upsert(&mut self, sample: PriceSample) {
        if !sample.is_valid() {
            return;
        }

        if let Some(last) = self.samples.back_mut() {
            if last.time == sample.time {
                *last = sample;
                return;
            }

            if sample.time < last.time {
                self.insert_sorted(sample);
                return;
            }
        }

        self.samples.push_back(sample);
        self.enforce_capacity();
    }

    /// Late or out-of-order sample (history arriving after live ticks).
    fn insert_sorted(&mut self, sample: PriceSample) {
        let pos = self
            .samples
            .iter()
            .position(|s| s.time >= sample.time)
            .unwrap_or(self.samples.len());

        if pos < self.samples.len() && self.samples[pos].time == sample.time {
            self.samples[pos] = sample;
        } else {
            self.samples.insert(pos, sample);
        }
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        while self.samples.len() > self.max_size {
            self.samples.pop_front();
        }
    }

    /// Merge a history payload. Order of the payload does not matter.
    pub fn load_history(&mut self, mut history: Vec<PriceSample>) {
        history.sort_by_key(|s| s.time);
        for sample in history {
            self.upsert(sample);
        }
    }

    pub fn set_live_price(&mut self, price: f64) {
        if price.is_finite() {
            self.live_price = Some(price);
        }
    }

    pub fn live_price(&self) -> Option<f64> {
        self.live_price
    }

    /// Write the last known live price at `floor(now)`. No-op until a live
    /// price has been seen.
    pub fn record_tick(&mut self, now_secs: f64) -> Option<PriceSample> {
        let price = self.live_price?;
        let sample = PriceSample::at_second(now_secs, price);
        self.upsert(sample);
        Some(sample)
    }

    /// Drop samples older than `time`, keeping the newest one at or before
    /// it as an anchor so the line still enters from the left edge.
    pub fn evict_before(&mut self, time: i64) {
        while self.samples.len() > 1 && self.samples[1].time <= time {
            self.samples.pop_front();
        }
    }

    pub fn samples(&self) -> &VecDeque<PriceSample> {
        &self.samples
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Samples whose time lies in `[from, to]`.
    pub fn visible(&self, from: f64, to: f64) -> impl Iterator<Item = &PriceSample> + '_ {
        self.samples
            .iter()
            .filter(move |s| (s.time as f64) >= from && (s.time as f64) <= to)
    }

    /// Min/max price among visible samples.
    pub fn price_range_between(&self, from: f64, to: f64) -> Option<(f64, f64)> {
        self.visible(from, to).fold(None, |acc, s| match acc {
            None => Some((s.price, s.price)),
            Some((lo, hi)) => Some((lo.min(s.price), hi.max(s.price))),
        })
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.live_price = None;
    }
}
