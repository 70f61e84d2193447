// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AutoMatchResult, Encounter, MatchPairing, MatchRecord, PairingSuggestion, PlayerId, PlayerInfo, RoundMatch, UNKNOWN_PLAYER_NAME};
pub use requests::{AutoMatchRequest, DateQuery, PairingCreateRequest, PairingEntry, RoundQuery};
pub use responses::{AutoMatchResponse, ErrorResponse, HealthResponse, PairingSuggestionView};
