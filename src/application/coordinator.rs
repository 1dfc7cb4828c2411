use std::cell::RefCell;
use std::rc::Rc;

use crate::config::FeedConfig;
use crate::domain::{
    feed::{FeedHandlers, FeedParams},
    game::{
        GameStatus, LiveMessage, RaceTrackLayout, RankZoneTracker, RankedPlayer, StatsSnapshot,
        Zone, ZoneChange,
    },
    logging::{LogComponent, get_logger},
};
use crate::infrastructure::websocket::LiveFeedClient;

/// Something the view should react to after a feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum GameUpdate {
    Price(f64),
    Leaderboard,
    ZoneChanged(ZoneChange),
    Status(GameStatus),
}

/// Client-side picture of one running game, fed by live messages.
#[derive(Debug, Clone)]
pub struct GameState {
    asset: Option<String>,
    latest_price: Option<f64>,
    leaderboard: Vec<RankedPlayer>,
    tracker: RankZoneTracker,
}

impl GameState {
    pub fn new(asset: Option<String>, player_id: Option<String>) -> Self {
        Self {
            asset: asset.filter(|a| !a.is_empty()),
            latest_price: None,
            leaderboard: Vec::new(),
            tracker: RankZoneTracker::new(player_id),
        }
    }

    /// Prices for a different asset are ignored once the game's asset is known.
    pub fn on_price(&mut self, asset: &str, price: f64) -> Option<GameUpdate> {
        if let Some(expected) = &self.asset {
            if !expected.eq_ignore_ascii_case(asset) {
                return None;
            }
        }
        self.latest_price = Some(price);
        Some(GameUpdate::Price(price))
    }

    /// Returns the leaderboard update, plus a zone change if one happened.
    pub fn on_leaderboard(
        &mut self,
        players: &[RankedPlayer],
        checkpoint: Option<&str>,
        now_ms: f64,
    ) -> Vec<GameUpdate> {
        self.leaderboard = players.to_vec();
        self.tracker.set_checkpoint(checkpoint.map(str::to_string));
        let mut updates = vec![GameUpdate::Leaderboard];
        if let Some(change) = self.tracker.observe(players, now_ms) {
            updates.push(GameUpdate::ZoneChanged(change));
        }
        updates
    }

    pub fn on_zone_notice(&mut self, player_id: &str, zone: Zone) -> Option<GameUpdate> {
        self.tracker.apply_zone_notice(player_id, zone).map(GameUpdate::ZoneChanged)
    }

    pub fn on_status(&mut self, status: GameStatus) -> GameUpdate {
        self.tracker.set_status(status);
        GameUpdate::Status(status)
    }

    pub fn apply(&mut self, message: &LiveMessage, now_ms: f64) -> Vec<GameUpdate> {
        match message {
            LiveMessage::Price { asset, price } => self.on_price(asset, *price).into_iter().collect(),
            LiveMessage::Leaderboard { players, checkpoint } => {
                self.on_leaderboard(players, checkpoint.as_deref(), now_ms)
            }
            LiveMessage::ZoneChange { player_id, zone } => {
                self.on_zone_notice(player_id, *zone).into_iter().collect()
            }
            LiveMessage::GameStatus { status } => vec![self.on_status(*status)],
        }
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.latest_price
    }

    pub fn leaderboard(&self) -> &[RankedPlayer] {
        &self.leaderboard
    }

    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.tracker.stats()
    }

    /// Zone the chart markers are coloured by; known from the first sighting.
    pub fn zone(&self) -> Option<Zone> {
        self.tracker.recorded_zone()
    }

    pub fn tracker(&self) -> &RankZoneTracker {
        &self.tracker
    }

    pub fn race_layout(&self) -> Option<RaceTrackLayout> {
        RaceTrackLayout::compute(self.tracker.history(), self.leaderboard.len())
    }
}

/// A live game: the feed connection plus the state it keeps current.
pub struct GameSession {
    state: Rc<RefCell<GameState>>,
    feed: LiveFeedClient,
}

impl GameSession {
    /// Connect and route every message through [`GameState`]. `on_update`
    /// sees the state after the update has been applied.
    pub fn start(
        params: Option<FeedParams>,
        asset: Option<String>,
        config: FeedConfig,
        on_update: Rc<dyn Fn(&GameState, GameUpdate)>,
        on_connection: Rc<dyn Fn(bool)>,
    ) -> Self {
        let player_id = params.as_ref().and_then(|p| p.player_id.clone());
        let state = Rc::new(RefCell::new(GameState::new(asset, player_id)));
        let handlers = Self::handlers(&state, on_update, on_connection);
        get_logger().info(
            LogComponent::Application("GameSession"),
            &format!("starting session for game {:?}", params.as_ref().map(|p| &p.game_id)),
        );
        let feed = LiveFeedClient::connect(params, config, handlers);
        Self { state, feed }
    }

    fn handlers(
        state: &Rc<RefCell<GameState>>,
        on_update: Rc<dyn Fn(&GameState, GameUpdate)>,
        on_connection: Rc<dyn Fn(bool)>,
    ) -> FeedHandlers {
        let (s1, s2, s3, s4) = (state.clone(), state.clone(), state.clone(), state.clone());
        let (u1, u2, u3, u4) = (on_update.clone(), on_update.clone(), on_update.clone(), on_update);

        FeedHandlers::new()
            .on_price(move |asset, price| {
                let update = s1.borrow_mut().on_price(asset, price);
                if let Some(update) = update {
                    u1(&s1.borrow(), update);
                }
            })
            .on_leaderboard(move |players, checkpoint| {
                let updates = s2.borrow_mut().on_leaderboard(players, checkpoint, js_sys::Date::now());
                for update in updates {
                    u2(&s2.borrow(), update);
                }
            })
            .on_zone_change(move |player_id, zone| {
                let update = s3.borrow_mut().on_zone_notice(player_id, zone);
                if let Some(update) = update {
                    u3(&s3.borrow(), update);
                }
            })
            .on_game_status(move |status| {
                let update = s4.borrow_mut().on_status(status);
                u4(&s4.borrow(), update);
            })
            .on_connection(move |connected| on_connection(connected))
    }

    pub fn state(&self) -> Rc<RefCell<GameState>> {
        self.state.clone()
    }

    pub fn connected(&self) -> bool {
        self.feed.connected()
    }

    pub fn teardown(&mut self) {
        self.feed.teardown();
    }
}
