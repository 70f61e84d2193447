use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable player identifier
pub type PlayerId = i64;

/// One past match between two players, as returned by the history source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "matchDate")]
    pub match_date: NaiveDate,
    #[serde(rename = "playerA")]
    pub player_a: PlayerId,
    #[serde(rename = "playerB")]
    pub player_b: PlayerId,
}

/// A match already recorded on the session date, with its round number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMatch {
    #[serde(rename = "matchNumber")]
    pub match_number: i32,
    #[serde(rename = "playerA")]
    pub player_a: PlayerId,
    #[serde(rename = "playerB")]
    pub player_b: PlayerId,
}

/// A prior encounter of a suggested pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    #[serde(rename = "matchDate")]
    pub match_date: NaiveDate,
    #[serde(rename = "daysAgo")]
    pub days_ago: i64,
}

/// One pair proposed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingSuggestion {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score: f64,
    /// Newest first
    pub recent_matches: Vec<Encounter>,
}

/// Engine output for one round
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoMatchResult {
    pub pairings: Vec<PairingSuggestion>,
    pub waiting_list: Vec<PlayerId>,
}

impl AutoMatchResult {
    /// Every player that was paired
    pub fn paired_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.pairings
            .iter()
            .flat_map(|p| [p.player1_id, p.player2_id])
    }
}

/// Player id and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
}

/// Pairing stored for a session round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPairing {
    pub id: i64,
    #[serde(rename = "sessionDate")]
    pub session_date: NaiveDate,
    #[serde(rename = "matchNumber")]
    pub match_number: i32,
    #[serde(rename = "player1Id")]
    pub player1_id: PlayerId,
    #[serde(rename = "player1Name")]
    pub player1_name: String,
    #[serde(rename = "player2Id")]
    pub player2_id: PlayerId,
    #[serde(rename = "player2Name")]
    pub player2_name: String,
    #[serde(rename = "createdBy")]
    pub created_by: Option<PlayerId>,
    #[serde(rename = "createdByName")]
    pub created_by_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Name shown when a player id has no directory entry
pub const UNKNOWN_PLAYER_NAME: &str = "Unknown";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_pairing_wire_keys() {
        let stamp = DateTime::parse_from_rfc3339("2024-06-20T09:30:00Z").unwrap().with_timezone(&Utc);
        let pairing = MatchPairing {
            id: 11,
            session_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            match_number: 2,
            player1_id: 1,
            player1_name: "Aoi".to_string(),
            player2_id: 2,
            player2_name: "Haru".to_string(),
            created_by: None,
            created_by_name: UNKNOWN_PLAYER_NAME.to_string(),
            created_at: stamp,
            updated_at: stamp,
        };

        let json = serde_json::to_value(&pairing).unwrap();

        assert_eq!(json["id"], 11);
        assert_eq!(json["sessionDate"], "2024-06-20");
        assert_eq!(json["matchNumber"], 2);
        assert_eq!(json["player1Id"], 1);
        assert_eq!(json["player2Name"], "Haru");
        assert!(json["createdBy"].is_null());
        assert_eq!(json["createdByName"], "Unknown");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
