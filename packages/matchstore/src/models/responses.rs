//! Response shapes consumed by the API layer, kept separate from the
//! persisted entity types so the storage schema stays decoupled from the
//! wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSummary {
    pub id: String,
    pub opponent: String,
    /// Winner id; empty until the match is resolved.
    pub winner: String,
    pub turn: u32,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub fbprofile: String,
    #[serde(rename = "totalmatch")]
    pub total_match: usize,
    pub win: u32,
    /// 1-based global rank; -1 when the user is missing from the index.
    pub rank: i32,
    #[serde(rename = "averageturn")]
    pub average_turn: i32,
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "totalmatch")]
    pub total_match: usize,
    pub win: u32,
    /// -1 when the average could not be computed for this row.
    #[serde(rename = "averageturn")]
    pub average_turn: i32,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchInfoResponse {
    pub id: String,
    #[serde(rename = "player")]
    pub players: [PlayerRef; 2],
    pub winner: Option<PlayerRef>,
    pub turn: u32,
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_wire_keys() {
        let profile = ProfileResponse {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            fbprofile: "https://facebook.com/u1".to_string(),
            total_match: 3,
            win: 2,
            rank: 1,
            average_turn: 14,
            matches: vec![MatchSummary {
                id: "m1".to_string(),
                opponent: "u2".to_string(),
                winner: "u1".to_string(),
                turn: 20,
                time: "09:05, 7-Mar-2026".to_string(),
            }],
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["totalmatch"], 3);
        assert_eq!(value["averageturn"], 14);
        assert_eq!(value["fbprofile"], "https://facebook.com/u1");
        assert_eq!(value["matches"][0]["opponent"], "u2");
        assert_eq!(value["matches"][0]["time"], "09:05, 7-Mar-2026");
    }

    #[test]
    fn test_ranking_wire_keys() {
        let entry = RankingEntry {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            total_match: 4,
            win: 5,
            average_turn: -1,
            rank: 1,
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["totalmatch"], 4);
        assert_eq!(value["averageturn"], -1);
        assert_eq!(value["rank"], 1);
    }

    #[test]
    fn test_match_info_unresolved_winner_is_null() {
        let info = MatchInfoResponse {
            id: "m1".to_string(),
            players: [
                PlayerRef {
                    id: "u1".to_string(),
                    name: "Alice".to_string(),
                },
                PlayerRef {
                    id: "u2".to_string(),
                    name: "Bob".to_string(),
                },
            ],
            winner: None,
            turn: 0,
            time: "09:05, 7-Mar-2026".to_string(),
        };

        let value = serde_json::to_value(&info).unwrap();
        assert!(value["winner"].is_null());
        assert_eq!(value["player"][0]["id"], "u1");
        assert_eq!(value["player"][1]["name"], "Bob");
    }
}
