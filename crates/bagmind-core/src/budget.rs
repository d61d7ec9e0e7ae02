//! # Budget Module
//!
//! The three-component resource budget carried by every entry in the
//! memory, and the pure functions that change it.
//!
//! - `priority`: selection weight, how urgent the entry is right now
//! - `durability`: resistance to forgetting
//! - `quality`: long-term value, the floor forgetting decays toward
//!
//! All components are clamped to `[0, 1]` on every write.

use serde::{Deserialize, Serialize};

/// Clamp to `[0, 1]`, mapping NaN to 0.
#[inline]
fn unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

// =============================================================================
// BUDGET
// =============================================================================

/// Resource budget of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    priority: f32,
    durability: f32,
    quality: f32,
    /// Clock value at which forgetting was last applied.
    last_forget: u64,
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Budget {
    /// Create a budget stamped at time 0.
    #[must_use]
    pub fn new(priority: f32, durability: f32, quality: f32) -> Self {
        Self {
            priority: unit(priority),
            durability: unit(durability),
            quality: unit(quality),
            last_forget: 0,
        }
    }

    /// Create a budget whose forgetting clock starts at `now`.
    #[must_use]
    pub fn stamped(priority: f32, durability: f32, quality: f32, now: u64) -> Self {
        Self {
            last_forget: now,
            ..Self::new(priority, durability, quality)
        }
    }

    /// Create a budget from a `(priority, durability, quality)` triple.
    #[must_use]
    pub fn from_triple((p, d, q): (f32, f32, f32)) -> Self {
        Self::new(p, d, q)
    }

    #[must_use]
    pub fn priority(&self) -> f32 {
        self.priority
    }

    #[must_use]
    pub fn durability(&self) -> f32 {
        self.durability
    }

    #[must_use]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    #[must_use]
    pub fn last_forget(&self) -> u64 {
        self.last_forget
    }

    pub fn set_priority(&mut self, p: f32) {
        self.priority = unit(p);
    }

    pub fn set_durability(&mut self, d: f32) {
        self.durability = unit(d);
    }

    pub fn set_quality(&mut self, q: f32) {
        self.quality = unit(q);
    }

    /// Restart the forgetting clock at `now`.
    pub fn stamp(&mut self, now: u64) {
        self.last_forget = now;
    }

    /// Merge `incoming` into this budget in place. See [`merge`].
    pub fn absorb(&mut self, incoming: &Budget) {
        *self = merge(self, incoming);
    }

    /// Geometric mean of the three components.
    #[must_use]
    pub fn summary(&self) -> f32 {
        summary(self)
    }
}

// =============================================================================
// BUDGET FUNCTIONS
// =============================================================================

/// Merge a re-inserted duplicate into an existing budget.
///
/// - priority: the maximum of both, reinforcement never lowers it
/// - durability: blend weighted by the two priorities
/// - quality: the historical maximum
/// - forgetting clock: the later of the two stamps
///
/// Merging a budget with itself returns it unchanged.
#[must_use]
pub fn merge(existing: &Budget, incoming: &Budget) -> Budget {
    let pe = existing.priority;
    let pi = incoming.priority;
    let weight = pe + pi;
    // Interpolated from `existing`: equal durabilities come back bit for bit.
    let durability = if weight > 0.0 {
        existing.durability + (incoming.durability - existing.durability) * (pi / weight)
    } else {
        existing.durability.max(incoming.durability)
    };

    Budget {
        priority: unit(pe.max(pi)),
        durability: unit(durability),
        quality: unit(existing.quality.max(incoming.quality)),
        last_forget: existing.last_forget.max(incoming.last_forget),
    }
}

/// Decay a budget's priority over `elapsed_cycles`.
///
/// The priority approaches `relative_floor * quality` exponentially with a
/// half life of `half_life * durability` cycles. A priority already at or
/// below the floor, or a non-positive elapsed time, is left unchanged. A
/// zero effective half life drops the priority straight to the floor.
///
/// The result never rises with `elapsed_cycles` and is never NaN.
#[must_use]
pub fn decay(budget: &Budget, elapsed_cycles: f32, relative_floor: f32, half_life: f32) -> Budget {
    let mut out = *budget;
    let floor = unit(relative_floor) * budget.quality;
    let p = budget.priority;

    if !(elapsed_cycles > 0.0) || p <= floor {
        return out;
    }

    let effective = half_life * budget.durability;
    let decayed = if effective.is_finite() && effective > 0.0 {
        floor + (p - floor) * 0.5f32.powf(elapsed_cycles / effective)
    } else {
        floor
    };

    out.priority = unit(decayed.min(p));
    out
}

/// Apply periodic forgetting: decay by the cycles elapsed since the last
/// application and restart the clock at `now`.
pub fn forget(budget: &mut Budget, now: u64, forget_cycles: f32, relative_floor: f32) {
    let elapsed = now.saturating_sub(budget.last_forget) as f32;
    *budget = decay(budget, elapsed, relative_floor, forget_cycles);
    budget.last_forget = now;
}

/// Split a budget among `parts` components.
///
/// Priority is divided by `sqrt(parts)`, so wider compounds hand each
/// component less attention while the total still grows with width.
#[must_use]
pub fn distribute(budget: &Budget, parts: usize) -> Budget {
    if parts <= 1 {
        return *budget;
    }
    let mut out = *budget;
    out.priority = unit(budget.priority / (parts as f32).sqrt());
    out
}

/// Geometric mean `(p * d * q)^(1/3)`.
#[must_use]
pub fn summary(budget: &Budget) -> f32 {
    unit((budget.priority * budget.durability * budget.quality).cbrt())
}

/// Whether the budget summary reaches `threshold`.
#[must_use]
pub fn above_threshold(budget: &Budget, threshold: f32) -> bool {
    summary(budget) >= threshold
}

/// Linearly map `priority` onto `[min, max]` and round to a count.
#[must_use]
pub fn interpolate(priority: f32, min: usize, max: usize) -> usize {
    if max <= min {
        return min;
    }
    let span = (max - min) as f32;
    let extra = (unit(priority) * span).round() as usize;
    (min + extra).min(max)
}

// =============================================================================
// TESTS
// =============================================================================
