//! Live feed connection core: endpoint parameters, the reconnect state
//! machine and the swappable handler set. No I/O here; the WebSocket
//! adapter drives it with real events and a real clock.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::game::{GameStatus, LiveMessage, RankedPlayer, Zone};
use crate::config::{FeedConfig, encode_path_segment};

/// Who is connecting to which game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedParams {
    pub game_id: String,
    pub player_id: Option<String>,
    pub token: Option<String>,
}

impl FeedParams {
    /// `None` for an empty game id: no connection is ever attempted.
    pub fn new(game_id: &str, player_id: Option<&str>, token: Option<&str>) -> Option<Self> {
        if game_id.is_empty() {
            return None;
        }
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        Some(Self {
            game_id: game_id.to_string(),
            player_id: non_empty(player_id),
            token: non_empty(token),
        })
    }

    pub fn endpoint_url(&self, config: &FeedConfig) -> String {
        let mut url = format!(
            "{}://{}{}?gameId={}",
            config.scheme(),
            config.host,
            config.path,
            encode_path_segment(&self.game_id)
        );
        if let Some(player_id) = &self.player_id {
            url.push_str("&playerId=");
            url.push_str(&encode_path_segment(player_id));
        }
        if let Some(token) = &self.token {
            url.push_str("&token=");
            url.push_str(&encode_path_segment(token));
        }
        url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed { will_retry: bool },
}

/// Reconnect bookkeeping for one feed.
///
/// Every closure schedules exactly one retry `delay_ms` later; teardown
/// cancels it for good. Timestamps are wall-clock milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConnection {
    state: ConnectionState,
    delay_ms: f64,
    retry_at: Option<f64>,
    torn_down: bool,
    attempts: u32,
}

impl FeedConnection {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            state: ConnectionState::Closed { will_retry: false },
            delay_ms,
            retry_at: None,
            torn_down: false,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// First connection attempt. Later attempts go through
    /// [`FeedConnection::take_due_reconnect`].
    pub fn begin(&mut self) -> bool {
        if self.torn_down || self.attempts > 0 {
            return false;
        }
        self.attempts = 1;
        self.state = ConnectionState::Connecting;
        true
    }

    pub fn on_open(&mut self) {
        if !self.torn_down && self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Open;
        }
    }

    /// Socket closed or errored. Returns the retry time if one was scheduled
    /// by this call; a duplicate close for the same attempt schedules nothing.
    pub fn on_closed(&mut self, now_ms: f64) -> Option<f64> {
        if self.torn_down {
            self.state = ConnectionState::Closed { will_retry: false };
            return None;
        }
        if matches!(self.state, ConnectionState::Closed { .. }) {
            return None;
        }
        let at = now_ms + self.delay_ms;
        self.state = ConnectionState::Closed { will_retry: true };
        self.retry_at = Some(at);
        Some(at)
    }

    pub fn retry_at(&self) -> Option<f64> {
        self.retry_at
    }

    /// `true` exactly once per closure, and not before the delay elapsed.
    pub fn take_due_reconnect(&mut self, now_ms: f64) -> bool {
        match self.retry_at {
            Some(at) if !self.torn_down && now_ms >= at => {
                self.retry_at = None;
                self.attempts += 1;
                self.state = ConnectionState::Connecting;
                true
            }
            _ => false,
        }
    }

    /// Idempotent. Returns `true` on the first call only.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        self.retry_at = None;
        self.state = ConnectionState::Closed { will_retry: false };
        true
    }
}

type PriceHandler = Box<dyn Fn(&str, f64)>;
type LeaderboardHandler = Box<dyn Fn(&[RankedPlayer], Option<&str>)>;
type ZoneChangeHandler = Box<dyn Fn(&str, Zone)>;
type StatusHandler = Box<dyn Fn(GameStatus)>;
type ConnectionHandler = Box<dyn Fn(bool)>;

/// Callbacks for decoded feed messages. Unset handlers drop the message.
#[derive(Default)]
pub struct FeedHandlers {
    on_price: Option<PriceHandler>,
    on_leaderboard: Option<LeaderboardHandler>,
    on_zone_change: Option<ZoneChangeHandler>,
    on_game_status: Option<StatusHandler>,
    on_connection: Option<ConnectionHandler>,
}

impl FeedHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_price(mut self, f: impl Fn(&str, f64) + 'static) -> Self {
        self.on_price = Some(Box::new(f));
        self
    }

    pub fn on_leaderboard(mut self, f: impl Fn(&[RankedPlayer], Option<&str>) + 'static) -> Self {
        self.on_leaderboard = Some(Box::new(f));
        self
    }

    pub fn on_zone_change(mut self, f: impl Fn(&str, Zone) + 'static) -> Self {
        self.on_zone_change = Some(Box::new(f));
        self
    }

    pub fn on_game_status(mut self, f: impl Fn(GameStatus) + 'static) -> Self {
        self.on_game_status = Some(Box::new(f));
        self
    }

    pub fn on_connection(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_connection = Some(Box::new(f));
        self
    }

    fn dispatch(&self, message: &LiveMessage) {
        match message {
            LiveMessage::Price { asset, price } => {
                if let Some(f) = &self.on_price {
                    f(asset, *price);
                }
            }
            LiveMessage::Leaderboard { players, checkpoint } => {
                if let Some(f) = &self.on_leaderboard {
                    f(players, checkpoint.as_deref());
                }
            }
            LiveMessage::ZoneChange { player_id, zone } => {
                if let Some(f) = &self.on_zone_change {
                    f(player_id, *zone);
                }
            }
            LiveMessage::GameStatus { status } => {
                if let Some(f) = &self.on_game_status {
                    f(*status);
                }
            }
        }
    }
}

/// Shared, replaceable handler set read at dispatch time.
///
/// The current set is cloned out of the cell before calling into it, so a
/// handler may replace the handlers without a re-entrant borrow.
#[derive(Clone, Default)]
pub struct HandlerCell(Rc<RefCell<Rc<FeedHandlers>>>);

impl HandlerCell {
    pub fn new(handlers: FeedHandlers) -> Self {
        Self(Rc::new(RefCell::new(Rc::new(handlers))))
    }

    pub fn replace(&self, handlers: FeedHandlers) {
        *self.0.borrow_mut() = Rc::new(handlers);
    }

    fn current(&self) -> Rc<FeedHandlers> {
        Rc::clone(&self.0.borrow())
    }

    pub fn dispatch(&self, message: &LiveMessage) {
        self.current().dispatch(message);
    }

    /// Decode a text frame and dispatch it. Malformed frames are dropped.
    pub fn dispatch_text(&self, text: &str) -> bool {
        match LiveMessage::decode(text) {
            Ok(message) => {
                crate::log_trace!(
                    crate::domain::logging::LogComponent::Domain("Feed"),
                    "dispatch {}",
                    message.kind()
                );
                self.dispatch(&message);
                true
            }
            Err(_) => false,
        }
    }

    pub fn notify_connection(&self, connected: bool) {
        if let Some(f) = &self.current().on_connection {
            f(connected);
        }
    }
}
