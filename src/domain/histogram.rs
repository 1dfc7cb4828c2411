//! Distribution of the peers' predictions for one checkpoint.

use serde::{Deserialize, Serialize};

/// One peer's prediction as served by the predictions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerPrediction {
    pub alias: String,
    pub interval_label: String,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionHistogram {
    pub buckets: Vec<HistogramBucket>,
    pub bucket_width: f64,
    /// Price range the chart should show; `None` with neither data nor price.
    pub display_range: Option<(f64, f64)>,
}

const MIN_BUCKETS: usize = 3;
const MAX_BUCKETS: usize = 10;
const FLAT_WIDTH_RATIO: f64 = 0.002;
const RANGE_PADDING: f64 = 0.15;

/// Sturges' rule, bounded to `[3, 10]`.
pub fn bucket_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let k = (1.0 + (n as f64).log2()).ceil() as usize;
    k.clamp(MIN_BUCKETS, MAX_BUCKETS)
}

fn flat_width(price: f64) -> f64 {
    if price == 0.0 { 1.0 } else { (price * FLAT_WIDTH_RATIO).abs() }
}

impl PredictionHistogram {
    pub fn build(predictions: &[f64], current_price: Option<f64>) -> Self {
        let values: Vec<f64> = predictions.iter().copied().filter(|p| p.is_finite()).collect();
        let current = current_price.filter(|p| p.is_finite());

        let Some((min, max)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        }) else {
            return Self::without_predictions(current);
        };

        let k = bucket_count(values.len());
        let (start, width) = if max > min {
            (min, (max - min) / k as f64)
        } else {
            let width = flat_width(min);
            (min - width * k as f64 / 2.0, width)
        };
        let end = if max > min { max } else { start + width * k as f64 };

        let mut buckets: Vec<HistogramBucket> = (0..k)
            .map(|i| HistogramBucket {
                lower_bound: start + width * i as f64,
                upper_bound: if i + 1 == k { end } else { start + width * (i + 1) as f64 },
                count: 0,
            })
            .collect();

        for &p in &values {
            let last = buckets.len() - 1;
            let slot = buckets.iter().position(|b| p >= b.lower_bound && p < b.upper_bound);
            match slot {
                Some(i) => buckets[i].count += 1,
                // The last bucket is closed on the right; anything at `end`
                // (or a hair past it from rounding) lands there.
                None => buckets[last].count += 1,
            }
        }

        let lo = current.map_or(min.min(start), |c| min.min(c).min(start));
        let hi = current.map_or(max.max(end), |c| max.max(c).max(end));
        Self { buckets, bucket_width: width, display_range: Some(pad_range(lo, hi, width)) }
    }

    fn without_predictions(current: Option<f64>) -> Self {
        match current {
            Some(price) => {
                let width = flat_width(price);
                Self {
                    buckets: Vec::new(),
                    bucket_width: width,
                    display_range: Some(pad_range(price, price, width)),
                }
            }
            None => Self { buckets: Vec::new(), bucket_width: 0.0, display_range: None },
        }
    }

    /// Histogram of the peers that predicted `interval_label`.
    pub fn for_interval(
        peers: &[PeerPrediction],
        interval_label: &str,
        current_price: Option<f64>,
    ) -> Self {
        let values: Vec<f64> = peers
            .iter()
            .filter(|p| p.interval_label == interval_label)
            .map(|p| p.predicted_price)
            .collect();
        Self::build(&values, current_price)
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Index of the bucket holding `price`, if any.
    pub fn bucket_of(&self, price: f64) -> Option<usize> {
        let last = self.buckets.len().checked_sub(1)?;
        self.buckets.iter().enumerate().position(|(i, b)| {
            price >= b.lower_bound
                && (price < b.upper_bound || (i == last && price <= b.upper_bound))
        })
    }
}

fn pad_range(lo: f64, hi: f64, width: f64) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 { span * RANGE_PADDING } else { width / 2.0 };
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_count_follows_sturges() {
        assert_eq!(bucket_count(1), 3);
        assert_eq!(bucket_count(16), 5);
        assert_eq!(bucket_count(1000), 10);
    }

    #[test]
    fn every_prediction_is_counted_once() {
        let preds = [100.0, 101.0, 102.5, 104.0, 110.0];
        let hist = PredictionHistogram::build(&preds, Some(99.0));
        assert_eq!(hist.total(), preds.len());
        assert_eq!(hist.buckets.last().map(|b| b.upper_bound), Some(110.0));
        let (lo, hi) = hist.display_range.unwrap();
        assert!(lo < 99.0 && hi > 110.0);
    }

    #[test]
    fn identical_predictions_center_on_the_price() {
        let hist = PredictionHistogram::build(&[50_000.0, 50_000.0], None);
        assert_eq!(hist.buckets.len(), 3);
        assert!((hist.bucket_width - 100.0).abs() < 1e-9);
        assert_eq!(hist.buckets[1].count, 2);
        let first = hist.buckets[0].lower_bound;
        let last = hist.buckets[2].upper_bound;
        assert!(((first + last) / 2.0 - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_predictions() {
        let hist = PredictionHistogram::build(&[], Some(200.0));
        assert!(hist.buckets.is_empty());
        let (lo, hi) = hist.display_range.unwrap();
        assert!((lo - 199.8).abs() < 1e-9 && (hi - 200.2).abs() < 1e-9);
        assert_eq!(PredictionHistogram::build(&[], None).display_range, None);
    }

    #[test]
    fn zero_price_uses_unit_width() {
        let hist = PredictionHistogram::build(&[0.0], None);
        assert_eq!(hist.bucket_width, 1.0);
        assert_eq!(hist.total(), 1);
    }
}
