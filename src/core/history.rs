use crate::core::pair_key::PairKey;
use crate::models::{MatchRecord, PlayerId};
use chrono::{Days, NaiveDate};
use std::collections::{HashMap, HashSet};

/// Default number of days looked back from the session date
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Half-open date range `[from, to)` over which past encounters count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl LookbackWindow {
    /// Window of `days` days ending just before `session_date`
    ///
    /// `None` when the window start falls before the earliest representable date.
    pub fn ending_at(session_date: NaiveDate, days: u32) -> Option<Self> {
        let from = session_date.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self {
            from,
            to: session_date,
        })
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.to
    }
}

/// Past encounter dates per pair, restricted to one participant set and window
///
/// Built once per auto-match call and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    encounters: HashMap<PairKey, Vec<NaiveDate>>,
}

impl HistoryIndex {
    /// Aggregate raw match records into a per-pair index
    ///
    /// Records are kept only when both players belong to `participants` and
    /// the date lies inside `window`. Repeat encounters are preserved.
    pub fn build(participants: &[PlayerId], window: LookbackWindow, records: &[MatchRecord]) -> Self {
        let members: HashSet<PlayerId> = participants.iter().copied().collect();
        let mut encounters: HashMap<PairKey, Vec<NaiveDate>> = HashMap::new();

        for record in records {
            if !members.contains(&record.player_a) || !members.contains(&record.player_b) {
                continue;
            }
            if !window.contains(record.match_date) {
                continue;
            }
            let Some(key) = PairKey::new(record.player_a, record.player_b) else {
                continue;
            };
            encounters.entry(key).or_default().push(record.match_date);
        }

        Self { encounters }
    }

    /// All recorded dates for a pair, in insertion order
    pub fn dates(&self, key: &PairKey) -> &[NaiveDate] {
        self.encounters.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent encounter, if the pair met inside the window
    pub fn last_met(&self, key: &PairKey) -> Option<NaiveDate> {
        self.dates(key).iter().max().copied()
    }

    /// Number of distinct pairs with at least one encounter
    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }
}
