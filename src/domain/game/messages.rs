use serde::{Deserialize, Serialize};

use super::value_objects::{GameStatus, Zone};
use crate::domain::errors::{AppError, DecodeResult};

/// One row of a leaderboard snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    #[serde(rename = "playerId", alias = "player_id")]
    pub player_id: String,
    pub alias: String,
    pub distance: f64,
    pub zone: Zone,
    /// 1-based.
    pub rank: u32,
}

/// Typed frame of the live game feed, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    Price {
        asset: String,
        price: f64,
    },
    Leaderboard {
        players: Vec<RankedPlayer>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checkpoint: Option<String>,
    },
    ZoneChange {
        #[serde(rename = "playerId", alias = "player_id")]
        player_id: String,
        zone: Zone,
    },
    GameStatus {
        status: GameStatus,
    },
}

impl LiveMessage {
    /// Parse and sanity-check a text frame.
    pub fn decode(text: &str) -> DecodeResult<Self> {
        let message: LiveMessage = serde_json::from_str(text)?;
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> DecodeResult<()> {
        match self {
            LiveMessage::Price { price, .. } if !price.is_finite() || *price <= 0.0 => {
                Err(AppError::DecodeError(format!("price out of range: {}", price)))
            }
            LiveMessage::Leaderboard { players, .. } => {
                match players.iter().find(|p| p.rank == 0 || !p.distance.is_finite()) {
                    Some(bad) => Err(AppError::DecodeError(format!(
                        "invalid leaderboard row for {}",
                        bad.player_id
                    ))),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LiveMessage::Price { .. } => "price",
            LiveMessage::Leaderboard { .. } => "leaderboard",
            LiveMessage::ZoneChange { .. } => "zone_change",
            LiveMessage::GameStatus { .. } => "game_status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_price() {
        let msg = LiveMessage::decode(r#"{"type":"price","asset":"BTC","price":50020.5}"#);
        assert_eq!(msg, Ok(LiveMessage::Price { asset: "BTC".into(), price: 50020.5 }));
    }

    #[test]
    fn leaderboard_accepts_both_id_spellings() {
        let text = r#"{"type":"leaderboard","checkpoint":"T+15","players":[
            {"playerId":"a","alias":"A","distance":1.5,"zone":"gold","rank":1},
            {"player_id":"b","alias":"B","distance":2.5,"zone":"dead","rank":2}]}"#;
        match LiveMessage::decode(text) {
            Ok(LiveMessage::Leaderboard { players, checkpoint }) => {
                assert_eq!(players[1].player_id, "b");
                assert_eq!(checkpoint.as_deref(), Some("T+15"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(LiveMessage::decode(r#"{"type":"chat","text":"hi"}"#).is_err());
        assert!(LiveMessage::decode("not json").is_err());
        assert!(LiveMessage::decode(r#"{"type":"game_status","status":"paused"}"#).is_err());
    }

    #[test]
    fn zero_rank_is_rejected() {
        let text = r#"{"type":"leaderboard","players":[
            {"playerId":"a","alias":"A","distance":1.0,"zone":"gold","rank":0}]}"#;
        assert!(matches!(LiveMessage::decode(text), Err(AppError::DecodeError(_))));
    }
}
