//! # Bag Module
//!
//! The bounded priority container used at every level of the memory:
//! concepts in the store, task-links and term-links in a concept.
//!
//! A bag:
//! - never holds more than `capacity` entries
//! - evicts its lowest-priority entry when an insert overflows
//! - merges an entry re-inserted under an existing key
//! - samples entries in proportion to priority, not strictly by rank
//!
//! [`PriorityBag`] is the contract; [`LevelBag`] implements it with
//! discretized priority buckets. [`EvictionCache`] is the plain bounded
//! store that displaced concepts fall into.

mod cache;
mod level;

pub use cache::EvictionCache;
pub use level::LevelBag;

use crate::budget::Budget;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

// =============================================================================
// ITEM
// =============================================================================

/// An entry that can live in a bag: a key plus a budget.
pub trait Item {
    /// Key type; unique within one container.
    type Key: Clone + Eq + Hash + Debug;

    /// The entry's key.
    fn key(&self) -> &Self::Key;

    /// The entry's budget.
    fn budget(&self) -> &Budget;

    /// Mutable access to the budget.
    ///
    /// Bags only hand this out while the entry is outside their index.
    fn budget_mut(&mut self) -> &mut Budget;

    /// Absorb a duplicate of this entry.
    ///
    /// The default merges budgets; payload-carrying items may override it.
    fn merge(&mut self, incoming: Self)
    where
        Self: Sized,
    {
        let incoming = *incoming.budget();
        self.budget_mut().absorb(&incoming);
    }
}

// =============================================================================
// PRIORITYBAG TRAIT
// =============================================================================

/// The bag contract.
///
/// Empty-bag operations return `None` or zero and never panic.
pub trait PriorityBag<V: Item> {
    /// Look up an entry by key without changing anything.
    fn get(&self, key: &V::Key) -> Option<&V>;

    /// Insert an entry, or merge it into the entry with the same key.
    ///
    /// Returns the entry evicted to stay within capacity, which may be the
    /// inserted entry itself. A merge never evicts.
    fn put(&mut self, item: V) -> Option<V>;

    /// Remove an entry by key.
    fn take(&mut self, key: &V::Key) -> Option<V>;

    /// Remove an entry chosen by priority-proportional sampling.
    fn take_next(&mut self) -> Option<V>;

    /// Look at the next entry of a rotating traversal without removing it.
    fn peek_next(&mut self) -> Option<&V>;

    /// Number of entries.
    fn size(&self) -> usize;

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Sum of all priorities.
    fn mass(&self) -> f32;

    /// Remove every entry.
    fn clear(&mut self);

    /// Entries from the highest priority level down.
    fn iter(&self) -> Box<dyn Iterator<Item = &V> + '_>;

    fn contains(&self, key: &V::Key) -> bool {
        self.get(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Mean priority, 0 when empty.
    fn average_priority(&self) -> f32 {
        let n = self.size();
        if n == 0 { 0.0 } else { self.mass() / n as f32 }
    }

    /// Take the next entry, let `decay` adjust its budget, and put it back.
    ///
    /// Returns the reinserted entry. The bag did not grow, so reinsertion
    /// always fits.
    fn process_next<F>(&mut self, decay: F) -> Option<&V>
    where
        F: FnOnce(&mut Budget),
        Self: Sized,
    {
        let mut item = self.take_next()?;
        decay(item.budget_mut());
        let key = item.key().clone();
        let overflow = self.put(item);
        debug_assert!(overflow.is_none(), "process_next failed to reinsert {key:?}");
        self.get(&key)
    }

    /// Lowest priority present, 0 when empty.
    fn min_priority(&self) -> f32 {
        self.iter()
            .map(|v| v.budget().priority())
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Highest priority present, 0 when empty.
    fn max_priority(&self) -> f32 {
        self.iter()
            .map(|v| v.budget().priority())
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Fraction of entries falling in each of `bins` priority bins.
    fn priority_distribution(&self, bins: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; bins];
        if bins == 0 || self.is_empty() {
            return out;
        }
        for v in self.iter() {
            out[bin(v.budget().priority(), bins)] += 1.0;
        }
        let total = self.size() as f32;
        for x in &mut out {
            *x /= total;
        }
        out
    }
}

// =============================================================================
// BUCKETING
// =============================================================================

/// Bucket index for `priority` among `levels` buckets.
///
/// `floor((priority + 0.5 / levels) * levels)` clamped to `[0, levels - 1]`.
/// Every bag operation goes through this one function so an entry is
/// always found in the bucket its current priority implies.
#[must_use]
pub fn bin(priority: f32, levels: usize) -> usize {
    if levels <= 1 {
        return 0;
    }
    let n = levels as f32;
    let raw = ((priority + 0.5 / n) * n).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(levels - 1)
    }
}

// =============================================================================
// SAMPLING STRATEGY
// =============================================================================

/// How a bucketed bag picks the bucket to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sampling {
    /// Pick a bucket with probability proportional to its priority mass,
    /// then an entry uniformly within it.
    #[default]
    MassWeighted,
    /// Walk a fixed shuffled sequence in which bucket `i` appears `i + 1`
    /// times, drawing the first entry of each visited bucket.
    Distributor,
}
