//! Karuta Pairing - practice-session pairing service for the karuta match tracker
//!
//! The core is a greedy pairing engine: it looks back over recent match
//! history, excludes pairs that already met earlier the same day, prefers
//! pairs that have not met for the longest time, and reports whoever could
//! not be paired as a waiting list. Around it sit the PostgreSQL providers,
//! a name cache, and an actix-web HTTP surface.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ConflictScope, ConflictSet, HistoryIndex, LookbackWindow, Matcher, PairKey, PairScorer};
pub use models::{AutoMatchRequest, AutoMatchResponse, AutoMatchResult, PairingSuggestion, PlayerId};
pub use services::{PairingError, PairingService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(PairKey::new(2, 1), PairKey::new(1, 2));
        assert_eq!(ConflictScope::default(), ConflictScope::EarlierRounds);
    }
}
