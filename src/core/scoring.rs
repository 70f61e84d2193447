use crate::core::{history::HistoryIndex, pair_key::PairKey};
use crate::models::Encounter;
use chrono::NaiveDate;

/// Numerator of the recency penalty
///
/// 1 day ago: -100, 2 days: -50, 7 days: about -14, 30 days: about -3.
const RECENCY_WEIGHT: f64 = 100.0;

/// Score given to pairs with no encounter in the lookback window
pub const NEVER_MET_SCORE: f64 = 0.0;

/// Scores candidate pairs against one session's history snapshot
///
/// Higher is better. Never-met pairs score 0; pairs with history score
/// `-(100 / days_since_last_encounter)`, approaching 0 as the encounter ages.
#[derive(Debug, Clone, Copy)]
pub struct PairScorer<'a> {
    history: &'a HistoryIndex,
    session_date: NaiveDate,
}

impl<'a> PairScorer<'a> {
    pub fn new(history: &'a HistoryIndex, session_date: NaiveDate) -> Self {
        Self {
            history,
            session_date,
        }
    }

    /// Desirability of pairing the two members of `key`
    pub fn score(&self, key: &PairKey) -> f64 {
        let Some(last_met) = self.history.last_met(key) else {
            return NEVER_MET_SCORE;
        };

        let days_since = (self.session_date - last_met).num_days();
        if days_since <= 0 {
            tracing::warn!(
                "Non-positive days since last encounter for pair {} (last met {}, session {}), scoring as never met",
                key,
                last_met,
                self.session_date
            );
            return NEVER_MET_SCORE;
        }

        -(RECENCY_WEIGHT / days_since as f64)
    }

    /// Up to `limit` most recent encounters of a pair, newest first
    pub fn recent_encounters(&self, key: &PairKey, limit: usize) -> Vec<Encounter> {
        let mut dates = self.history.dates(key).to_vec();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.truncate(limit);

        dates
            .into_iter()
            .map(|match_date| Encounter {
                match_date,
                days_ago: (self.session_date - match_date).num_days(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::LookbackWindow;
    use crate::models::MatchRecord;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn index(records: &[(u32, i64, i64)], session: NaiveDate) -> HistoryIndex {
        let records: Vec<MatchRecord> = records
            .iter()
            .map(|&(d, a, b)| MatchRecord {
                match_date: date(d),
                player_a: a,
                player_b: b,
            })
            .collect();
        HistoryIndex::build(&[1, 2, 3, 4], LookbackWindow::ending_at(session, 30).unwrap(), &records)
    }

    #[test]
    fn test_never_met_scores_zero() {
        let history = index(&[], date(20));
        let scorer = PairScorer::new(&history, date(20));
        assert_eq!(scorer.score(&PairKey::new(1, 2).unwrap()), 0.0);
    }

    #[test]
    fn test_recency_penalty() {
        let history = index(&[(19, 1, 2), (18, 3, 4), (13, 1, 3)], date(20));
        let scorer = PairScorer::new(&history, date(20));

        let yesterday = scorer.score(&PairKey::new(1, 2).unwrap());
        let two_days = scorer.score(&PairKey::new(3, 4).unwrap());
        let week = scorer.score(&PairKey::new(1, 3).unwrap());

        assert_eq!(yesterday, -100.0);
        assert_eq!(two_days, -50.0);
        assert!((week - (-100.0 / 7.0)).abs() < 1e-9);
        assert!(yesterday < two_days && two_days < week && week < 0.0);
    }

    #[test]
    fn test_latest_encounter_drives_score() {
        let history = index(&[(1, 1, 2), (18, 2, 1), (10, 1, 2)], date(20));
        let scorer = PairScorer::new(&history, date(20));
        assert_eq!(scorer.score(&PairKey::new(1, 2).unwrap()), -50.0);
    }

    #[test]
    fn test_non_positive_gap_guarded() {
        // History built for a later session, scored against an earlier date
        let history = index(&[(15, 1, 2)], date(20));
        let scorer = PairScorer::new(&history, date(15));
        assert_eq!(scorer.score(&PairKey::new(1, 2).unwrap()), NEVER_MET_SCORE);
    }

    #[test]
    fn test_recent_encounters_newest_first_and_capped() {
        let history = index(
            &[(2, 1, 2), (5, 1, 2), (9, 1, 2), (12, 1, 2), (14, 1, 2), (19, 1, 2)],
            date(20),
        );
        let scorer = PairScorer::new(&history, date(20));

        let recent = scorer.recent_encounters(&PairKey::new(2, 1).unwrap(), 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].match_date, date(19));
        assert_eq!(recent[0].days_ago, 1);
        assert_eq!(recent[4].match_date, date(5));
        assert_eq!(recent[4].days_ago, 15);
    }
}
