//! Deduplicated conflict and loss-of-separation bookkeeping.
//!
//! Conflicts are stored per unordered aircraft pair. Each kind (conflict,
//! intrusion) keeps the pairs seen this tick, every pair ever seen and the
//! pairs seen inside the experiment window. The guidance set holds the
//! pairs the resume decision still has to release.

use crate::detection::Severity;
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Separator between the two identifiers in a pair's string form.
pub const PAIR_SEPARATOR: char = ' ';

/// Unordered aircraft pair; `(A, B)` and `(B, A)` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Both identifiers, lexicographically sorted.
    pub fn ids(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    pub fn involves(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, PAIR_SEPARATOR, self.second)
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Pairs that started and ended since the previous diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairDiff {
    pub created: Vec<PairKey>,
    pub deleted: Vec<PairKey>,
}

impl PairDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Conflict and intrusion transitions since the previous diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transitions {
    pub conflicts: PairDiff,
    pub intrusions: PairDiff,
}

/// What a [`ConflictRegistry::register`] call newly recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registration {
    pub first_conflict: bool,
    pub first_intrusion: bool,
}

#[derive(Debug, Clone, Default)]
struct PairSets {
    now: BTreeSet<PairKey>,
    ever: BTreeSet<PairKey>,
    experiment: BTreeSet<PairKey>,
    // Snapshots taken at the previous diff.
    logged_now: BTreeSet<PairKey>,
    logged_ever: BTreeSet<PairKey>,
    count: u64,
}

impl PairSets {
    /// Returns true when the pair was never seen before.
    fn insert(&mut self, key: &PairKey, in_experiment: bool) -> bool {
        let first = self.ever.insert(key.clone());
        if first {
            self.count += 1;
        }
        if in_experiment {
            self.experiment.insert(key.clone());
        }
        self.now.insert(key.clone());
        first
    }

    fn diff(&mut self) -> PairDiff {
        let mut created: Vec<PairKey> = self.now.difference(&self.logged_now).cloned().collect();
        let mut deleted: Vec<PairKey> = self.logged_now.difference(&self.now).cloned().collect();

        // A pair first seen and already gone before this diff still gets
        // a zero-length created/deleted record.
        for key in self.ever.difference(&self.logged_ever) {
            if !created.contains(key) {
                created.push(key.clone());
                deleted.push(key.clone());
            }
        }

        self.logged_now = self.now.clone();
        self.logged_ever = self.ever.clone();
        PairDiff { created, deleted }
    }
}

/// Durable conflict/LOS state carried across ticks.
#[derive(Debug, Clone, Default)]
pub struct ConflictRegistry {
    conflicts: PairSets,
    intrusions: PairSets,
    guidance: BTreeSet<PairKey>,
    severity: HashMap<PairKey, Severity>,
}

impl ConflictRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the current-tick sets before a new detection pass.
    pub fn begin_tick(&mut self) {
        self.conflicts.now.clear();
        self.intrusions.now.clear();
    }

    /// Record a detected conflict, and an intrusion when `intrusion` is set.
    ///
    /// The pair enters the guidance set. Repeating a call with the same
    /// arguments changes nothing.
    pub fn register(
        &mut self,
        key: &PairKey,
        intrusion: Option<Severity>,
        in_experiment: bool,
    ) -> Registration {
        let mut registration = Registration {
            first_conflict: self.conflicts.insert(key, in_experiment),
            ..Registration::default()
        };
        self.guidance.insert(key.clone());

        if let Some(severity) = intrusion {
            registration.first_intrusion = self.register_intrusion(key, severity, in_experiment);
        }

        registration
    }

    /// Record a loss of separation only. Conflict sets, the conflict counter
    /// and the guidance set are left alone.
    ///
    /// Stored severity only grows; a tie keeps the stored triple. Returns
    /// true when the pair was never in LOS before.
    pub fn register_intrusion(&mut self, key: &PairKey, severity: Severity, in_experiment: bool) -> bool {
        let first = self.intrusions.insert(key, in_experiment);
        let stored = self.severity.entry(key.clone()).or_default();
        if severity.combined > stored.combined {
            *stored = severity;
        }
        first
    }

    /// Created/deleted pairs relative to the previous call.
    pub fn diff_against_previous(&mut self) -> Transitions {
        Transitions {
            conflicts: self.conflicts.diff(),
            intrusions: self.intrusions.diff(),
        }
    }

    /// Drop every current pair involving `id` so its end is reported by the
    /// next diff. Lifetime sets keep the pairs.
    pub fn forget_aircraft(&mut self, id: &str) {
        self.conflicts.now.retain(|key| !key.involves(id));
        self.intrusions.now.retain(|key| !key.involves(id));
    }

    /// Snapshot of the pairs under active guidance, in key order.
    pub fn guidance_pairs(&self) -> Vec<PairKey> {
        self.guidance.iter().cloned().collect()
    }

    /// Remove a resolved pair from the guidance set.
    pub fn release(&mut self, key: &PairKey) -> bool {
        self.guidance.remove(key)
    }

    pub fn is_guided(&self, key: &PairKey) -> bool {
        self.guidance.contains(key)
    }

    /// Worst intrusion recorded for `key`.
    pub fn severity(&self, key: &PairKey) -> Option<Severity> {
        self.severity.get(key).copied()
    }

    /// Number of distinct conflict pairs ever seen.
    pub fn conflict_count(&self) -> u64 {
        self.conflicts.count
    }

    /// Number of distinct intrusion pairs ever seen.
    pub fn intrusion_count(&self) -> u64 {
        self.intrusions.count
    }

    pub fn current_conflicts(&self) -> &BTreeSet<PairKey> {
        &self.conflicts.now
    }

    pub fn current_intrusions(&self) -> &BTreeSet<PairKey> {
        &self.intrusions.now
    }

    pub fn all_conflicts(&self) -> &BTreeSet<PairKey> {
        &self.conflicts.ever
    }

    pub fn all_intrusions(&self) -> &BTreeSet<PairKey> {
        &self.intrusions.ever
    }

    pub fn experiment_conflicts(&self) -> &BTreeSet<PairKey> {
        &self.conflicts.experiment
    }

    pub fn experiment_intrusions(&self) -> &BTreeSet<PairKey> {
        &self.intrusions.experiment
    }
}
