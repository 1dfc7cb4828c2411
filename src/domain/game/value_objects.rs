use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Payout classification of a ranked player, computed by the server.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString,
    AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Zone {
    Gold,
    Silver,
    Dead,
}

impl Zone {
    /// Frequency of the cue tone played when the local player enters this zone.
    pub fn cue_frequency_hz(&self) -> f32 {
        match self {
            Zone::Gold => 880.0,
            Zone::Silver => 660.0,
            Zone::Dead => 440.0,
        }
    }

    pub fn css_color(&self) -> &'static str {
        match self {
            Zone::Gold => "#f5c542",
            Zone::Silver => "#c0c7d1",
            Zone::Dead => "#e0525a",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    Lobby,
    Live,
    Ended,
}

/// Round length; decides how many checkpoints a player predicts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, EnumString, AsRefStr,
)]
pub enum GameMode {
    #[serde(rename = "15min")]
    #[strum(serialize = "15min")]
    FifteenMinutes,
    #[serde(rename = "60min")]
    #[strum(serialize = "60min")]
    SixtyMinutes,
}

impl GameMode {
    pub fn interval_labels(&self) -> &'static [&'static str] {
        match self {
            GameMode::FifteenMinutes => &["T+15"],
            GameMode::SixtyMinutes => &["T+15", "T+30", "T+45", "T+60"],
        }
    }
}

/// Minutes after kickoff encoded in a checkpoint label such as `T+15`.
pub fn checkpoint_minutes(label: &str) -> Option<u32> {
    let digits: String = label
        .trim()
        .trim_start_matches("T+")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn zone_round_trips_lowercase() {
        assert_eq!(Zone::from_str("silver"), Ok(Zone::Silver));
        assert_eq!(Zone::Gold.to_string(), "gold");
    }

    #[test]
    fn mode_parses_wire_names() {
        assert_eq!(GameMode::from_str("60min"), Ok(GameMode::SixtyMinutes));
        assert_eq!(GameMode::SixtyMinutes.interval_labels().len(), 4);
    }

    #[test]
    fn checkpoint_label_minutes() {
        assert_eq!(checkpoint_minutes("T+15"), Some(15));
        assert_eq!(checkpoint_minutes("T+60"), Some(60));
        assert_eq!(checkpoint_minutes("later"), None);
    }
}
