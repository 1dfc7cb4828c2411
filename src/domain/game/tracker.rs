use serde::Serialize;

use super::messages::RankedPlayer;
use super::value_objects::{GameStatus, Zone};

/// Emitted when the tracked player's zone differs from the recorded one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneChange {
    pub player_id: String,
    pub from: Zone,
    pub to: Zone,
    pub rank: Option<u32>,
}

impl ZoneChange {
    pub fn cue_frequency_hz(&self) -> f32 {
        self.to.cue_frequency_hz()
    }
}

/// Rank of the tracked player at one leaderboard snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankSnapshot {
    /// Wall-clock milliseconds.
    pub time_ms: f64,
    pub rank: u32,
    pub total: usize,
}

/// What the stats panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub rank: u32,
    pub total: usize,
    pub distance: f64,
    pub zone: Zone,
    pub checkpoint: Option<String>,
    pub status: Option<GameStatus>,
}

/// Follows one player through successive leaderboard snapshots.
///
/// The first sighting records the zone silently; later snapshots emit a
/// [`ZoneChange`] only when the zone actually differs. Absent snapshots keep
/// the recorded zone.
#[derive(Debug, Clone, Default)]
pub struct RankZoneTracker {
    player_id: Option<String>,
    recorded_zone: Option<Zone>,
    latest: Option<RankedPlayer>,
    total: usize,
    history: Vec<RankSnapshot>,
    checkpoint: Option<String>,
    status: Option<GameStatus>,
}

impl RankZoneTracker {
    pub fn new(player_id: Option<String>) -> Self {
        Self { player_id: player_id.filter(|id| !id.is_empty()), ..Self::default() }
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn observe(&mut self, players: &[RankedPlayer], now_ms: f64) -> Option<ZoneChange> {
        let player_id = self.player_id.as_deref()?;
        let me = players.iter().find(|p| p.player_id == player_id)?.clone();

        self.total = players.len();
        self.history.push(RankSnapshot { time_ms: now_ms, rank: me.rank, total: players.len() });
        let rank = me.rank;
        let zone = me.zone;
        self.latest = Some(me);
        self.record_zone(zone, Some(rank))
    }

    /// Server-pushed zone notice; deduplicated against the leaderboard path.
    pub fn apply_zone_notice(&mut self, player_id: &str, zone: Zone) -> Option<ZoneChange> {
        if self.player_id.as_deref() != Some(player_id) {
            return None;
        }
        if let Some(latest) = self.latest.as_mut() {
            latest.zone = zone;
        }
        let rank = self.latest.as_ref().map(|p| p.rank);
        self.record_zone(zone, rank)
    }

    fn record_zone(&mut self, zone: Zone, rank: Option<u32>) -> Option<ZoneChange> {
        let previous = self.recorded_zone.replace(zone)?;
        if previous == zone {
            return None;
        }
        Some(ZoneChange {
            player_id: self.player_id.clone().unwrap_or_default(),
            from: previous,
            to: zone,
            rank,
        })
    }

    pub fn set_checkpoint(&mut self, checkpoint: Option<String>) {
        if checkpoint.is_some() {
            self.checkpoint = checkpoint;
        }
    }

    pub fn set_status(&mut self, status: GameStatus) {
        self.status = Some(status);
    }

    pub fn recorded_zone(&self) -> Option<Zone> {
        self.recorded_zone
    }

    pub fn history(&self) -> &[RankSnapshot] {
        &self.history
    }

    pub fn stats(&self) -> Option<StatsSnapshot> {
        let me = self.latest.as_ref()?;
        Some(StatsSnapshot {
            rank: me.rank,
            total: self.total,
            distance: me.distance,
            zone: me.zone,
            checkpoint: self.checkpoint.clone(),
            status: self.status,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.player_id.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, rank: u32, zone: Zone) -> RankedPlayer {
        RankedPlayer { player_id: id.into(), alias: id.to_uppercase(), distance: 1.0, zone, rank }
    }

    #[test]
    fn untracked_player_never_emits() {
        let mut tracker = RankZoneTracker::new(None);
        assert!(tracker.observe(&[row("a", 1, Zone::Gold)], 0.0).is_none());
        assert!(tracker.history().is_empty());
    }

    #[test]
    fn missing_player_keeps_zone() {
        let mut tracker = RankZoneTracker::new(Some("me".into()));
        tracker.observe(&[row("me", 1, Zone::Gold)], 0.0);
        assert!(tracker.observe(&[row("x", 1, Zone::Dead)], 1.0).is_none());
        assert_eq!(tracker.recorded_zone(), Some(Zone::Gold));
        assert_eq!(tracker.history().len(), 1);
    }

    #[test]
    fn zone_notice_is_deduplicated() {
        let mut tracker = RankZoneTracker::new(Some("me".into()));
        tracker.observe(&[row("me", 1, Zone::Gold)], 0.0);
        let change = tracker.apply_zone_notice("me", Zone::Silver);
        assert_eq!(change.map(|c| c.to), Some(Zone::Silver));
        assert!(tracker.observe(&[row("me", 2, Zone::Silver)], 1.0).is_none());
    }
}
