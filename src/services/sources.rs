//! Read-only capabilities the pairing service depends on
//!
//! `PostgresClient` implements the history and conflict providers;
//! `PlayerDirectoryService` implements the directory. Tests substitute
//! in-memory fakes.

use crate::models::{MatchRecord, PlayerId, RoundMatch};
use crate::services::postgres::PostgresError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;

/// Past matches between participants
pub trait HistoryProvider {
    /// Matches dated in `[from, to)` whose players are drawn from `participant_ids`
    fn recent_matches(
        &self,
        participant_ids: &[PlayerId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<MatchRecord>, PostgresError>> + Send;
}

/// Matches already recorded on a session date
pub trait ConflictProvider {
    fn matches_on(
        &self,
        session_date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<RoundMatch>, PostgresError>> + Send;
}

/// Display names for players; unknown ids are simply absent from the map
pub trait PlayerDirectory {
    fn player_names(
        &self,
        player_ids: &[PlayerId],
    ) -> impl Future<Output = Result<HashMap<PlayerId, String>, PostgresError>> + Send;
}
