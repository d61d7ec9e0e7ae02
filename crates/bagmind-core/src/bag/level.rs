//! # Level Bag
//!
//! [`PriorityBag`] implementation over discretized priority buckets.
//!
//! ## Layout
//!
//! - `index`: key -> slot (the item, its bucket, its position in the bucket)
//! - `levels`: one `Vec` of keys per bucket, in arrival order; removal
//!   shifts the tail down and patches the positions it moved, so a key
//!   taken from the front and put back lands behind its peers
//! - `level_mass`: running priority sum per bucket, for weighted sampling
//!
//! Iteration always walks `levels`, never the hash index, so traversal
//! order depends only on the sequence of operations and the seed.

use super::{Item, PriorityBag, Sampling, bin};
use crate::MindError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Stored entry plus its location in the bucket vectors.
#[derive(Debug, Clone)]
struct Slot<V> {
    item: V,
    level: usize,
    pos: usize,
}

/// Rotating position used by `peek_next`.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    level: usize,
    pos: usize,
}

/// A bounded, bucketed, seeded priority bag.
#[derive(Debug, Clone)]
pub struct LevelBag<V: Item> {
    capacity: usize,
    index: HashMap<V::Key, Slot<V>>,
    levels: Vec<Vec<V::Key>>,
    level_mass: Vec<f64>,
    mass: f64,
    sampling: Sampling,
    rng: StdRng,
    /// Bucket visiting order for `Sampling::Distributor`.
    distributor: Vec<usize>,
    distributor_pos: usize,
    cursor: Cursor,
}

impl<V: Item> LevelBag<V> {
    /// Create an empty bag with `levels` buckets holding at most `capacity`
    /// entries, sampling from an RNG seeded with `seed`.
    pub fn new(levels: usize, capacity: usize, seed: u64) -> Result<Self, MindError> {
        if levels == 0 {
            return Err(MindError::Config("bag needs at least one level".into()));
        }
        if capacity == 0 {
            return Err(MindError::Config("bag capacity must be positive".into()));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut distributor: Vec<usize> = (0..levels)
            .flat_map(|level| std::iter::repeat_n(level, level + 1))
            .collect();
        distributor.shuffle(&mut rng);

        Ok(Self {
            capacity,
            index: HashMap::with_capacity(capacity.saturating_add(1)),
            levels: vec![Vec::new(); levels],
            level_mass: vec![0.0; levels],
            mass: 0.0,
            sampling: Sampling::default(),
            rng,
            distributor,
            distributor_pos: 0,
            cursor: Cursor {
                level: levels - 1,
                pos: 0,
            },
        })
    }

    /// Use a different bucket selection strategy.
    #[must_use]
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Number of buckets.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Number of entries in each bucket, lowest bucket first.
    #[must_use]
    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(Vec::len).collect()
    }

    /// Full structural check: capacity, bucket placement, positions, mass.
    ///
    /// O(n); meant for tests and debug assertions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.index.len() > self.capacity {
            return false;
        }
        let listed: usize = self.levels.iter().map(Vec::len).sum();
        if listed != self.index.len() {
            return false;
        }
        let levels = self.levels.len();
        let mut total = 0.0f64;
        for (key, slot) in &self.index {
            let p = slot.item.budget().priority();
            total += f64::from(p);
            if slot.level != bin(p, levels) {
                return false;
            }
            if self.levels[slot.level].get(slot.pos) != Some(key) {
                return false;
            }
        }
        (total - self.mass).abs() < 1e-3
    }

    // =========================================================================
    // SLOT MANAGEMENT
    // =========================================================================

    fn insert_slot(&mut self, item: V) {
        let p = item.budget().priority();
        let level = bin(p, self.levels.len());
        let pos = self.levels[level].len();
        let key = item.key().clone();

        self.levels[level].push(key.clone());
        self.level_mass[level] += f64::from(p);
        self.mass += f64::from(p);
        self.index.insert(key, Slot { item, level, pos });
    }

    fn remove_slot(&mut self, key: &V::Key) -> Option<V> {
        let Slot { item, level, pos } = self.index.remove(key)?;
        let bucket = &mut self.levels[level];
        bucket.remove(pos);
        for (i, moved) in bucket.iter().enumerate().skip(pos) {
            if let Some(slot) = self.index.get_mut(moved) {
                slot.pos = i;
            }
        }

        let p = f64::from(item.budget().priority());
        if bucket.is_empty() {
            self.level_mass[level] = 0.0;
        } else {
            self.level_mass[level] = (self.level_mass[level] - p).max(0.0);
        }
        if self.index.is_empty() {
            self.mass = 0.0;
        } else {
            self.mass = (self.mass - p).max(0.0);
        }
        Some(item)
    }

    fn lowest_nonempty(&self) -> Option<usize> {
        self.levels.iter().position(|bucket| !bucket.is_empty())
    }

    /// Remove the lowest-priority entry of the lowest non-empty bucket.
    ///
    /// Ties go to the entry that has waited longest in the bucket: buckets
    /// keep arrival order, and a reinserted entry arrives again at the back.
    fn evict(&mut self) -> Option<V> {
        let level = self.lowest_nonempty()?;
        let mut victim: Option<(&V::Key, f32)> = None;
        for key in &self.levels[level] {
            let Some(slot) = self.index.get(key) else {
                continue;
            };
            let p = slot.item.budget().priority();
            if victim.is_none_or(|(_, best)| p < best) {
                victim = Some((key, p));
            }
        }
        let key = victim.map(|(k, _)| k.clone())?;
        self.remove_slot(&key)
    }

    // =========================================================================
    // SAMPLING
    // =========================================================================

    fn choose_weighted(&mut self) -> Option<usize> {
        let nonempty: Vec<usize> = (0..self.levels.len())
            .filter(|&l| !self.levels[l].is_empty())
            .collect();
        let last = *nonempty.last()?;

        let total: f64 = nonempty.iter().map(|&l| self.level_mass[l]).sum();
        if total <= f64::from(crate::primitives::BUDGET_EPSILON) {
            let i = self.rng.random_range(0..nonempty.len());
            return Some(nonempty[i]);
        }

        let mut r = self.rng.random::<f64>() * total;
        for &level in &nonempty {
            let m = self.level_mass[level];
            if r < m {
                return Some(level);
            }
            r -= m;
        }
        Some(last)
    }

    fn choose_distributed(&mut self) -> Option<usize> {
        let len = self.distributor.len();
        for _ in 0..len {
            let level = self.distributor[self.distributor_pos];
            self.distributor_pos = (self.distributor_pos + 1) % len;
            if !self.levels[level].is_empty() {
                return Some(level);
            }
        }
        self.levels.iter().rposition(|bucket| !bucket.is_empty())
    }
}

impl<V: Item> PriorityBag<V> for LevelBag<V> {
    fn get(&self, key: &V::Key) -> Option<&V> {
        self.index.get(key).map(|slot| &slot.item)
    }

    fn put(&mut self, item: V) -> Option<V> {
        if let Some(mut existing) = self.remove_slot(item.key()) {
            existing.merge(item);
            self.insert_slot(existing);
            return None;
        }

        self.insert_slot(item);
        let overflow = if self.index.len() > self.capacity {
            self.evict()
        } else {
            None
        };
        debug_assert!(self.index.len() <= self.capacity, "bag over capacity");
        overflow
    }

    fn take(&mut self, key: &V::Key) -> Option<V> {
        self.remove_slot(key)
    }

    fn take_next(&mut self) -> Option<V> {
        if self.index.is_empty() {
            return None;
        }
        let key = match self.sampling {
            Sampling::MassWeighted => {
                let level = self.choose_weighted()?;
                let n = self.levels[level].len();
                let pos = self.rng.random_range(0..n);
                self.levels[level][pos].clone()
            }
            Sampling::Distributor => {
                let level = self.choose_distributed()?;
                self.levels[level].first()?.clone()
            }
        };
        self.remove_slot(&key)
    }

    fn peek_next(&mut self) -> Option<&V> {
        if self.index.is_empty() {
            return None;
        }
        let levels = self.levels.len();
        let mut found = None;
        for _ in 0..=levels {
            let Cursor { level, pos } = self.cursor;
            if let Some(key) = self.levels[level].get(pos) {
                found = Some(key.clone());
                self.cursor.pos += 1;
                break;
            }
            // bucket exhausted: step down, wrapping to the top
            self.cursor = Cursor {
                level: if level == 0 { levels - 1 } else { level - 1 },
                pos: 0,
            };
        }
        let key = found?;
        self.get(&key)
    }

    fn size(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn mass(&self) -> f32 {
        self.mass as f32
    }

    fn clear(&mut self) {
        self.index.clear();
        for bucket in &mut self.levels {
            bucket.clear();
        }
        for m in &mut self.level_mass {
            *m = 0.0;
        }
        self.mass = 0.0;
        self.cursor = Cursor {
            level: self.levels.len() - 1,
            pos: 0,
        };
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &V> + '_> {
        Box::new(self.levels.iter().rev().flat_map(move |bucket| {
            bucket
                .iter()
                .filter_map(move |key| self.index.get(key).map(|slot| &slot.item))
        }))
    }
}

// =============================================================================
// TESTS
// =============================================================================
