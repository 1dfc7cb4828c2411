//! Edge badges for predictions that are off the visible price range.
//!
//! The registry owns one surface handle per label and reconciles it against
//! the desired set on every frame: create what appeared, update what moved,
//! remove what re-entered the range or vanished from the input.

use std::collections::BTreeMap;

use super::markers::{EdgePosition, MarkerLine};
use crate::domain::game::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeEdge {
    Top,
    Bottom,
}

impl BadgeEdge {
    pub fn glyph(&self) -> char {
        match self {
            BadgeEdge::Top => '↑',
            BadgeEdge::Bottom => '↓',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeBadge {
    pub label: String,
    pub edge: BadgeEdge,
    pub zone: Option<Zone>,
    pub opacity: f64,
}

impl EdgeBadge {
    pub fn text(&self) -> String {
        format!("{} {}", self.edge.glyph(), self.label)
    }
}

/// Whatever actually displays badges (DOM nodes in the browser).
pub trait BadgeSurface {
    type Handle;

    fn create(&mut self, badge: &EdgeBadge) -> Option<Self::Handle>;
    fn update(&mut self, handle: &Self::Handle, badge: &EdgeBadge);
    fn remove(&mut self, handle: Self::Handle);
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Badges wanted for the current frame, one per clamped marker.
pub fn desired_badges(markers: &[MarkerLine]) -> Vec<EdgeBadge> {
    markers
        .iter()
        .filter_map(|line| {
            let edge = match line.edge() {
                EdgePosition::Above => BadgeEdge::Top,
                EdgePosition::Below => BadgeEdge::Bottom,
                EdgePosition::Within => return None,
            };
            line.y()?;
            Some(EdgeBadge {
                label: line.label().to_string(),
                edge,
                zone: line.marker().zone,
                opacity: line.opacity(),
            })
        })
        .collect()
}

pub struct BadgeRegistry<H> {
    entries: BTreeMap<String, (EdgeBadge, H)>,
}

impl<H> Default for BadgeRegistry<H> {
    fn default() -> Self {
        Self { entries: BTreeMap::new() }
    }
}

impl<H> BadgeRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile<S>(&mut self, surface: &mut S, desired: Vec<EdgeBadge>) -> ReconcileReport
    where
        S: BadgeSurface<Handle = H>,
    {
        let mut report = ReconcileReport::default();

        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|label| !desired.iter().any(|b| &b.label == *label))
            .cloned()
            .collect();
        for label in stale {
            if let Some((_, handle)) = self.entries.remove(&label) {
                surface.remove(handle);
                report.removed += 1;
            }
        }

        for badge in desired {
            match self.entries.get_mut(&badge.label) {
                Some((current, handle)) => {
                    if *current != badge {
                        surface.update(handle, &badge);
                        *current = badge;
                        report.updated += 1;
                    }
                }
                None => {
                    if let Some(handle) = surface.create(&badge) {
                        self.entries.insert(badge.label.clone(), (badge, handle));
                        report.created += 1;
                    }
                }
            }
        }

        report
    }

    /// Remove every badge from the surface.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: BadgeSurface<Handle = H>,
    {
        for (_, (_, handle)) in std::mem::take(&mut self.entries) {
            surface.remove(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&EdgeBadge> {
        self.entries.get(label).map(|(badge, _)| badge)
    }
}
