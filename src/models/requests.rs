use crate::models::domain::PlayerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to propose pairings for one round
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AutoMatchRequest {
    #[serde(alias = "session_date", rename = "sessionDate")]
    pub session_date: NaiveDate,
    #[validate(range(min = 1))]
    #[serde(alias = "match_number", rename = "matchNumber")]
    pub match_number: i32,
    #[serde(alias = "participant_ids", rename = "participantIds", default)]
    pub participant_ids: Vec<PlayerId>,
    /// Fixes the tie-break order for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Request to store a single pairing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_players"))]
pub struct PairingCreateRequest {
    #[serde(rename = "sessionDate")]
    pub session_date: NaiveDate,
    #[validate(range(min = 1))]
    #[serde(rename = "matchNumber")]
    pub match_number: i32,
    #[serde(rename = "player1Id")]
    pub player1_id: PlayerId,
    #[serde(rename = "player2Id")]
    pub player2_id: PlayerId,
    #[serde(rename = "createdBy", default)]
    pub created_by: Option<PlayerId>,
}

/// One entry of a batch replacement; date and round come from the query
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_entry_players"))]
pub struct PairingEntry {
    #[serde(rename = "player1Id")]
    pub player1_id: PlayerId,
    #[serde(rename = "player2Id")]
    pub player2_id: PlayerId,
    #[serde(rename = "createdBy", default)]
    pub created_by: Option<PlayerId>,
}

/// `?date=YYYY-MM-DD`
#[derive(Debug, Clone, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

/// `?date=YYYY-MM-DD&matchNumber=N`
#[derive(Debug, Clone, Deserialize)]
pub struct RoundQuery {
    pub date: NaiveDate,
    #[serde(rename = "matchNumber")]
    pub match_number: i32,
}

fn distinct_players(player1_id: PlayerId, player2_id: PlayerId) -> Result<(), ValidationError> {
    if player1_id == player2_id {
        let mut error = ValidationError::new("self_pairing");
        error.message = Some("a player cannot be paired with themselves".into());
        return Err(error);
    }
    Ok(())
}

fn validate_create_players(req: &PairingCreateRequest) -> Result<(), ValidationError> {
    distinct_players(req.player1_id, req.player2_id)
}

fn validate_entry_players(req: &PairingEntry) -> Result<(), ValidationError> {
    distinct_players(req.player1_id, req.player2_id)
}
