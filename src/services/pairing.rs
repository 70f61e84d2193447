use crate::config::PairingSettings;
use crate::core::{ConflictScope, ConflictSet, HistoryIndex, LookbackWindow, Matcher, PairScorer};
use crate::models::{
    AutoMatchRequest, AutoMatchResponse, AutoMatchResult, PairingSuggestionView, PlayerId, PlayerInfo,
    UNKNOWN_PLAYER_NAME,
};
use crate::services::postgres::PostgresError;
use crate::services::sources::{ConflictProvider, HistoryProvider, PlayerDirectory};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors surfaced by the auto-match flow
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Too many participants: {count} (maximum {max})")]
    TooManyParticipants { count: usize, max: usize },

    #[error("Invalid match number: {0}")]
    InvalidRound(i32),

    #[error("Session date {date} leaves no room for a {days}-day lookback")]
    InvalidDate { date: NaiveDate, days: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] PostgresError),
}

/// Runs one auto-match: fetch history and conflicts, pair, attach names
///
/// The engine itself is synchronous and works on snapshots; the only I/O is
/// the two independent reads before it starts and the name lookup after.
#[derive(Debug, Clone)]
pub struct PairingService {
    matcher: Matcher,
    lookback_days: u32,
    max_participants: usize,
    conflict_scope: ConflictScope,
    default_seed: Option<u64>,
}

impl PairingService {
    pub fn new(settings: &PairingSettings) -> Self {
        Self {
            matcher: Matcher::new(settings.recent_encounter_limit),
            lookback_days: settings.lookback_days,
            max_participants: settings.max_participants,
            conflict_scope: settings.conflict_scope,
            default_seed: settings.seed,
        }
    }

    /// Propose pairings without resolving names
    pub async fn propose<H, C>(
        &self,
        history: &H,
        conflicts: &C,
        request: &AutoMatchRequest,
    ) -> Result<AutoMatchResult, PairingError>
    where
        H: HistoryProvider,
        C: ConflictProvider,
    {
        if request.match_number < 1 {
            return Err(PairingError::InvalidRound(request.match_number));
        }

        let participants = distinct(&request.participant_ids);
        if participants.len() > self.max_participants {
            return Err(PairingError::TooManyParticipants {
                count: participants.len(),
                max: self.max_participants,
            });
        }

        let session_date = request.session_date;
        let window = LookbackWindow::ending_at(session_date, self.lookback_days).ok_or(PairingError::InvalidDate {
            date: session_date,
            days: self.lookback_days,
        })?;

        tracing::info!(
            "Auto-matching started: date={}, match_number={}, participants={}",
            session_date,
            request.match_number,
            participants.len()
        );

        let (records, day_matches) = tokio::try_join!(
            history.recent_matches(&participants, window.from, window.to),
            conflicts.matches_on(session_date),
        )?;

        let index = HistoryIndex::build(&participants, window, &records);
        let conflict_set = ConflictSet::build(&day_matches, request.match_number, self.conflict_scope);
        tracing::debug!(
            "History covers {} pairs, {} pairs excluded ({:?})",
            index.len(),
            conflict_set.len(),
            self.conflict_scope
        );

        let scorer = PairScorer::new(&index, session_date);
        let mut rng = match request.seed.or(self.default_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let result = self.matcher.auto_match(&participants, &conflict_set, &scorer, &mut rng);

        tracing::info!(
            "Auto-matching finished: pairs={}, waiting={}",
            result.pairings.len(),
            result.waiting_list.len()
        );

        Ok(result)
    }

    /// Propose pairings and decorate them with display names
    ///
    /// A failed name lookup does not fail the request; players are then shown
    /// as unknown.
    pub async fn auto_match<H, C, D>(
        &self,
        history: &H,
        conflicts: &C,
        directory: &D,
        request: &AutoMatchRequest,
    ) -> Result<AutoMatchResponse, PairingError>
    where
        H: HistoryProvider,
        C: ConflictProvider,
        D: PlayerDirectory,
    {
        let result = self.propose(history, conflicts, request).await?;

        let ids: Vec<PlayerId> = result
            .paired_ids()
            .chain(result.waiting_list.iter().copied())
            .collect();
        let names = match directory.player_names(&ids).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Failed to resolve player names, returning ids only: {}", e);
                HashMap::new()
            }
        };

        Ok(decorate(result, &names))
    }
}

fn distinct(ids: &[PlayerId]) -> Vec<PlayerId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn name_of(names: &HashMap<PlayerId, String>, id: PlayerId) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_PLAYER_NAME.to_string())
}

fn decorate(result: AutoMatchResult, names: &HashMap<PlayerId, String>) -> AutoMatchResponse {
    let pairings = result
        .pairings
        .into_iter()
        .map(|p| PairingSuggestionView {
            player1_id: p.player1_id,
            player1_name: name_of(names, p.player1_id),
            player2_id: p.player2_id,
            player2_name: name_of(names, p.player2_id),
            score: p.score,
            recent_matches: p.recent_matches,
        })
        .collect();

    let waiting_players = result
        .waiting_list
        .into_iter()
        .map(|id| PlayerInfo {
            id,
            name: name_of(names, id),
        })
        .collect();

    AutoMatchResponse {
        pairings,
        waiting_players,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PairingSuggestion;

    #[test]
    fn test_decorate_fills_unknown_names() {
        let result = AutoMatchResult {
            pairings: vec![PairingSuggestion {
                player1_id: 1,
                player2_id: 2,
                score: 0.0,
                recent_matches: vec![],
            }],
            waiting_list: vec![3],
        };
        let names = HashMap::from([(1, "Aoi".to_string())]);

        let response = decorate(result, &names);

        assert_eq!(response.pairings[0].player1_name, "Aoi");
        assert_eq!(response.pairings[0].player2_name, UNKNOWN_PLAYER_NAME);
        assert_eq!(response.waiting_players[0].name, UNKNOWN_PLAYER_NAME);
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        assert_eq!(distinct(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
