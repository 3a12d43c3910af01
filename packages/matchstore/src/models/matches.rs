use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A match between a fixed pair of participants. The id is assigned by the
/// store on creation; the participant pair is immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: String,
    #[serde(rename = "player")]
    pub players: [String; 2],
    /// `None` until the match is resolved, thereafter one of the two
    /// participants. No transition back once set.
    pub winner: Option<String>,
    pub turn: u32,
    #[serde(rename = "createdTime")]
    pub created_time: DateTime<Utc>,
}

impl Match {
    pub fn new(player1: &str, player2: &str) -> Self {
        Match {
            id: String::new(),
            players: [player1.to_string(), player2.to_string()],
            winner: None,
            turn: 0,
            created_time: Utc::now(),
        }
    }

    pub fn opponent_of(&self, user_id: &str) -> &str {
        if self.players[0] == user_id {
            &self.players[1]
        } else {
            &self.players[0]
        }
    }

    pub fn formatted_time(&self) -> String {
        self.created_time.format("%H:%M, %-d-%b-%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_match_starts_unresolved() {
        let m = Match::new("p1", "p2");

        assert!(m.id.is_empty());
        assert_eq!(m.players, ["p1".to_string(), "p2".to_string()]);
        assert!(m.winner.is_none());
        assert_eq!(m.turn, 0);

        let now = Utc::now();
        assert!((now - m.created_time).num_seconds() < 10);
    }

    #[test]
    fn test_opponent_of_either_participant() {
        let m = Match::new("p1", "p2");
        assert_eq!(m.opponent_of("p1"), "p2");
        assert_eq!(m.opponent_of("p2"), "p1");
    }

    #[test]
    fn test_time_format() {
        let mut m = Match::new("p1", "p2");
        m.created_time = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(m.formatted_time(), "09:05, 7-Mar-2026");

        m.created_time = Utc.with_ymd_and_hms(2025, 12, 24, 23, 59, 0).unwrap();
        assert_eq!(m.formatted_time(), "23:59, 24-Dec-2025");
    }

    #[test]
    fn test_players_serialize_under_stored_attribute_name() {
        let m = Match::new("p1", "p2");
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["player"][0], "p1");
        assert_eq!(value["player"][1], "p2");
        assert!(value["winner"].is_null());
        assert!(value.get("players").is_none());
    }
}
