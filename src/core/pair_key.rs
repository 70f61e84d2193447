use crate::models::PlayerId;
use std::fmt;

/// Order-independent identity of two distinct players
///
/// The smaller id is always stored first, so `PairKey::new(a, b)` and
/// `PairKey::new(b, a)` compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: PlayerId,
    high: PlayerId,
}

impl PairKey {
    /// Build the canonical key for two players. Returns `None` for a self-pair.
    #[inline]
    pub fn new(a: PlayerId, b: PlayerId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> PlayerId {
        self.low
    }

    pub fn high(&self) -> PlayerId {
        self.high
    }

    /// Whether `player` is one of the two members
    pub fn contains(&self, player: PlayerId) -> bool {
        self.low == player || self.high == player
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_symmetric() {
        for (a, b) in [(1, 2), (7, 3), (-4, 10), (100, 99)] {
            assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        }
    }

    #[test]
    fn test_self_pair_rejected() {
        assert!(PairKey::new(5, 5).is_none());
    }

    #[test]
    fn test_canonical_order() {
        let key = PairKey::new(9, 2).unwrap();
        assert_eq!(key.low(), 2);
        assert_eq!(key.high(), 9);
        assert_eq!(key.to_string(), "2-9");
        assert!(key.contains(9));
        assert!(!key.contains(3));
    }

    #[test]
    fn test_repeated_construction_stable() {
        let first = PairKey::new(3, 11).unwrap();
        for _ in 0..10 {
            assert_eq!(PairKey::new(11, 3).unwrap(), first);
            assert_eq!(PairKey::new(3, 11).unwrap(), first);
        }
    }
}
