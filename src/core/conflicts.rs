use crate::core::pair_key::PairKey;
use crate::models::RoundMatch;
use serde::Deserialize;
use std::collections::HashSet;

/// Which of the day's recorded matches block a pair from being proposed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Matches from rounds numbered lower than the requested round
    #[default]
    EarlierRounds,
    /// Only matches already recorded for the requested round
    SameRound,
    /// Every match recorded on the session date
    AnyRound,
}

impl ConflictScope {
    #[inline]
    pub fn applies_to(self, recorded_round: i32, requested_round: i32) -> bool {
        match self {
            ConflictScope::EarlierRounds => recorded_round < requested_round,
            ConflictScope::SameRound => recorded_round == requested_round,
            ConflictScope::AnyRound => true,
        }
    }
}

/// Pairs forbidden for the round being computed
#[derive(Debug, Clone, Default)]
pub struct ConflictSet {
    pairs: HashSet<PairKey>,
}

impl ConflictSet {
    /// Collect the pairs of `day_matches` that fall under `scope` for `round`
    pub fn build(day_matches: &[RoundMatch], round: i32, scope: ConflictScope) -> Self {
        let pairs = day_matches
            .iter()
            .filter(|m| scope.applies_to(m.match_number, round))
            .filter_map(|m| PairKey::new(m.player_a, m.player_b))
            .collect();

        Self { pairs }
    }

    #[inline]
    pub fn contains(&self, key: &PairKey) -> bool {
        self.pairs.contains(key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<PairKey> for ConflictSet {
    fn from_iter<I: IntoIterator<Item = PairKey>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> Vec<RoundMatch> {
        vec![
            RoundMatch { match_number: 1, player_a: 1, player_b: 2 },
            RoundMatch { match_number: 2, player_a: 4, player_b: 3 },
            RoundMatch { match_number: 3, player_a: 5, player_b: 6 },
        ]
    }

    fn key(a: i64, b: i64) -> PairKey {
        PairKey::new(a, b).unwrap()
    }

    #[test]
    fn test_earlier_rounds_scope() {
        let set = ConflictSet::build(&day(), 3, ConflictScope::EarlierRounds);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&key(2, 1)));
        assert!(set.contains(&key(3, 4)));
        assert!(!set.contains(&key(5, 6)));
    }

    #[test]
    fn test_same_round_scope() {
        let set = ConflictSet::build(&day(), 3, ConflictScope::SameRound);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&key(6, 5)));
    }

    #[test]
    fn test_any_round_scope() {
        let set = ConflictSet::build(&day(), 1, ConflictScope::AnyRound);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_first_round_has_no_conflicts() {
        let set = ConflictSet::build(&day(), 1, ConflictScope::EarlierRounds);
        assert!(set.is_empty());
    }

    #[test]
    fn test_scope_deserializes_from_config_names() {
        let scope: ConflictScope = serde_json::from_str("\"any_round\"").unwrap();
        assert_eq!(scope, ConflictScope::AnyRound);
        assert_eq!(ConflictScope::default(), ConflictScope::EarlierRounds);
    }
}
