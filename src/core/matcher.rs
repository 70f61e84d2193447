use crate::core::{conflicts::ConflictSet, pair_key::PairKey, scoring::PairScorer};
use crate::models::{AutoMatchResult, PairingSuggestion, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Default number of prior encounters attached to each suggestion
pub const DEFAULT_RECENT_ENCOUNTER_LIMIT: usize = 5;

/// Best pair found in one greedy step
#[derive(Debug, Clone, Copy)]
struct Candidate {
    player1: PlayerId,
    player2: PlayerId,
    key: PairKey,
    score: f64,
}

/// Greedy pairing engine
///
/// Each step scans every legal pair among the unassigned players, commits
/// the one with the strictly highest score, and removes both players. This
/// is a step-wise optimizer, not a global one.
///
/// # Complexity
/// Every step rescans all remaining pairs, so `k` participants cost
/// roughly O(k³) score lookups. Fine for a club session of tens of players;
/// callers cap the participant count before reaching here.
///
/// # Termination
/// The loop ends when fewer than two players remain, or when every remaining
/// pair is in the conflict set. In the latter case all remaining players go
/// to the waiting list, even if there are several of them.
#[derive(Debug, Clone)]
pub struct Matcher {
    recent_encounter_limit: usize,
}

impl Matcher {
    pub fn new(recent_encounter_limit: usize) -> Self {
        Self {
            recent_encounter_limit,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RECENT_ENCOUNTER_LIMIT)
    }

    /// Propose pairings for one round
    ///
    /// # Arguments
    /// * `participant_ids` - Players attending; duplicates are collapsed
    /// * `conflicts` - Pairs that must not be proposed this round
    /// * `scorer` - Scorer bound to the session's history snapshot
    /// * `rng` - Shuffles the pool once; decides ties between equal scores
    pub fn auto_match<R: Rng + ?Sized>(
        &self,
        participant_ids: &[PlayerId],
        conflicts: &ConflictSet,
        scorer: &PairScorer<'_>,
        rng: &mut R,
    ) -> AutoMatchResult {
        let mut remaining = distinct(participant_ids);
        remaining.shuffle(rng);

        let mut pairings = Vec::with_capacity(remaining.len() / 2);

        while remaining.len() >= 2 {
            let Some(best) = best_candidate(&remaining, conflicts, scorer) else {
                tracing::debug!(
                    "No legal pair left among {} unassigned players, stopping",
                    remaining.len()
                );
                break;
            };

            pairings.push(PairingSuggestion {
                player1_id: best.player1,
                player2_id: best.player2,
                score: best.score,
                recent_matches: scorer.recent_encounters(&best.key, self.recent_encounter_limit),
            });

            remaining.retain(|id| !best.key.contains(*id));
        }

        AutoMatchResult {
            pairings,
            waiting_list: remaining,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Input ids without repeats, first occurrence kept
fn distinct(ids: &[PlayerId]) -> Vec<PlayerId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Highest-scoring legal pair in enumeration order; first one wins on ties
fn best_candidate(
    pool: &[PlayerId],
    conflicts: &ConflictSet,
    scorer: &PairScorer<'_>,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for (i, &player1) in pool.iter().enumerate() {
        for &player2 in &pool[i + 1..] {
            let Some(key) = PairKey::new(player1, player2) else {
                continue;
            };
            if conflicts.contains(&key) {
                continue;
            }

            let score = scorer.score(&key);
            if best.map_or(true, |current| score > current.score) {
                best = Some(Candidate {
                    player1,
                    player2,
                    key,
                    score,
                });
            }
        }
    }

    best
}
