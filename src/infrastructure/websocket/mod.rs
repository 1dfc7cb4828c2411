//! WebSocket transport for the live game feed.

pub mod game_feed;

pub use game_feed::*;
