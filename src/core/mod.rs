// Core pairing engine exports
pub mod conflicts;
pub mod history;
pub mod matcher;
pub mod pair_key;
pub mod scoring;

pub use conflicts::{ConflictScope, ConflictSet};
pub use history::{HistoryIndex, LookbackWindow, DEFAULT_LOOKBACK_DAYS};
pub use matcher::{Matcher, DEFAULT_RECENT_ENCOUNTER_LIMIT};
pub use pair_key::PairKey;
pub use scoring::{PairScorer, NEVER_MET_SCORE};
