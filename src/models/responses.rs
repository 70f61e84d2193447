use crate::models::domain::{Encounter, PlayerId, PlayerInfo};
use serde::{Deserialize, Serialize};

/// Suggested pair decorated with display names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingSuggestionView {
    #[serde(rename = "player1Id")]
    pub player1_id: PlayerId,
    #[serde(rename = "player1Name")]
    pub player1_name: String,
    #[serde(rename = "player2Id")]
    pub player2_id: PlayerId,
    #[serde(rename = "player2Name")]
    pub player2_name: String,
    pub score: f64,
    #[serde(rename = "recentMatches")]
    pub recent_matches: Vec<Encounter>,
}

/// Response for the auto-match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoMatchResponse {
    pub pairings: Vec<PairingSuggestionView>,
    #[serde(rename = "waitingPlayers")]
    pub waiting_players: Vec<PlayerInfo>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_auto_match_response_wire_keys() {
        let response = AutoMatchResponse {
            pairings: vec![PairingSuggestionView {
                player1_id: 1,
                player1_name: "Aoi".to_string(),
                player2_id: 2,
                player2_name: "Haru".to_string(),
                score: -50.0,
                recent_matches: vec![Encounter {
                    match_date: NaiveDate::from_ymd_opt(2024, 6, 18).unwrap(),
                    days_ago: 2,
                }],
            }],
            waiting_players: vec![PlayerInfo {
                id: 3,
                name: "Unknown".to_string(),
            }],
        };

        let json = serde_json::to_value(&response).unwrap();

        let pairing = &json["pairings"][0];
        assert_eq!(pairing["player1Id"], 1);
        assert_eq!(pairing["player1Name"], "Aoi");
        assert_eq!(pairing["player2Id"], 2);
        assert_eq!(pairing["player2Name"], "Haru");
        assert_eq!(pairing["score"], -50.0);
        assert_eq!(pairing["recentMatches"][0]["matchDate"], "2024-06-18");
        assert_eq!(pairing["recentMatches"][0]["daysAgo"], 2);
        assert_eq!(json["waitingPlayers"][0]["id"], 3);
        assert_eq!(json["waitingPlayers"][0]["name"], "Unknown");
        assert!(pairing.get("player1_id").is_none());
    }
}
