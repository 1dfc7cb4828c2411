//! Sequential highlight of freshly arrived ledger entries.
//!
//! A burst of ids is revealed one at a time: the first immediately when the
//! queue was idle, then one per cadence. Each revealed id stays animating for
//! the highlight duration. Driven by an explicit clock so the browser timer
//! only has to call [`RevealQueue::advance`] at [`RevealQueue::next_deadline`].

use std::collections::VecDeque;

use crate::config::RevealConfig;

/// What changed during one `advance` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealStep {
    pub started: Vec<String>,
    pub finished: Vec<String>,
}

impl RevealStep {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.finished.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RevealQueue {
    config: RevealConfig,
    pending: VecDeque<String>,
    animating: Vec<(String, f64)>,
    next_reveal_at: Option<f64>,
}

impl RevealQueue {
    pub fn new(config: RevealConfig) -> Self {
        Self { config, pending: VecDeque::new(), animating: Vec::new(), next_reveal_at: None }
    }

    /// Append ids (oldest first). Restarts the cadence if the queue had drained.
    pub fn enqueue<I>(&mut self, ids: I, now_ms: f64)
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.pending.len();
        self.pending.extend(ids);
        if self.pending.len() > before && self.next_reveal_at.is_none() {
            self.next_reveal_at = Some(now_ms);
        }
    }

    /// Reveal at most one id and expire finished highlights.
    pub fn advance(&mut self, now_ms: f64) -> RevealStep {
        let mut step = RevealStep::default();

        if let Some(at) = self.next_reveal_at {
            if now_ms >= at {
                if let Some(id) = self.pending.pop_front() {
                    self.animating.push((id.clone(), now_ms + self.config.highlight_ms));
                    step.started.push(id);
                }
                self.next_reveal_at =
                    (!self.pending.is_empty()).then(|| now_ms + self.config.cadence_ms);
            }
        }

        let mut still = Vec::with_capacity(self.animating.len());
        for (id, until) in self.animating.drain(..) {
            if now_ms >= until {
                step.finished.push(id);
            } else {
                still.push((id, until));
            }
        }
        self.animating = still;

        step
    }

    pub fn is_animating(&self, id: &str) -> bool {
        self.animating.iter().any(|(animating, _)| animating == id)
    }

    pub fn animating_ids(&self) -> Vec<String> {
        self.animating.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drained and nothing highlighted.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.animating.is_empty()
    }

    /// When `advance` next has something to do.
    pub fn next_deadline(&self) -> Option<f64> {
        let expiry = self.animating.iter().map(|(_, until)| *until).reduce(f64::min);
        match (self.next_reveal_at, expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.animating.clear();
        self.next_reveal_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_reveal_is_immediate() {
        let mut queue = RevealQueue::new(RevealConfig::default());
        queue.enqueue(ids(&["a", "b"]), 100.0);
        assert_eq!(queue.next_deadline(), Some(100.0));
        assert_eq!(queue.advance(100.0).started, ids(&["a"]));
        assert!(queue.advance(599.0).started.is_empty());
        assert_eq!(queue.advance(600.0).started, ids(&["b"]));
    }

    #[test]
    fn highlight_lasts_exactly_its_duration() {
        let mut queue = RevealQueue::new(RevealConfig::default());
        queue.enqueue(ids(&["a"]), 0.0);
        queue.advance(0.0);
        assert!(queue.is_animating("a"));
        assert!(queue.advance(999.0).finished.is_empty());
        assert_eq!(queue.advance(1_000.0).finished, ids(&["a"]));
        assert!(queue.is_idle());
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn empty_enqueue_does_not_arm() {
        let mut queue = RevealQueue::new(RevealConfig::default());
        queue.enqueue(Vec::new(), 0.0);
        assert_eq!(queue.next_deadline(), None);
    }
}
