//! # Property-Based Tests
//!
//! Invariants of the bag and the budget functions under arbitrary input.
//!
//! These tests pin down capacity, merge, eviction, decay and seeded
//! reproducibility.

use bagmind_core::budget::{decay, merge};
use bagmind_core::{Budget, LevelBag, PriorityBag, Sampling, TaskId, TaskLink};
use proptest::collection::vec;
use proptest::prelude::*;

fn link(key: u64, priority: f32) -> TaskLink {
    TaskLink::new(TaskId(key), Budget::new(priority, 0.5, 0.5))
}

fn bag(levels: usize, capacity: usize, seed: u64) -> LevelBag<TaskLink> {
    LevelBag::new(levels, capacity, seed).expect("bag")
}

fn unit() -> impl Strategy<Value = f32> {
    0.0f32..=1.0
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The bag never holds more than its capacity.
    #[test]
    fn size_never_exceeds_capacity(
        capacity in 1usize..20,
        levels in 1usize..16,
        puts in vec((0u64..40, unit()), 0..120)
    ) {
        let mut b = bag(levels, capacity, 7);
        for (key, p) in puts {
            b.put(link(key, p));
            prop_assert!(b.size() <= capacity);
        }
        prop_assert!(b.is_consistent());
    }

    /// Putting the same key twice keeps one entry with the higher priority.
    #[test]
    fn duplicate_key_merges_to_max(p1 in unit(), p2 in unit()) {
        let mut b = bag(8, 4, 1);
        prop_assert!(b.put(link(1, p1)).is_none());
        prop_assert!(b.put(link(1, p2)).is_none());
        prop_assert_eq!(b.size(), 1);
        let got = b.get(&TaskId(1)).expect("present").budget.priority();
        prop_assert!((got - p1.max(p2)).abs() < 1e-6);
    }

    /// `take` followed by `put` restores the entry unchanged.
    #[test]
    fn take_then_put_round_trips(
        entries in vec(unit(), 1..20),
        pick in any::<prop::sample::Index>()
    ) {
        let mut b = bag(10, 32, 3);
        for (i, p) in entries.iter().enumerate() {
            b.put(link(i as u64, *p));
        }
        let key = TaskId(pick.index(entries.len()) as u64);
        let before = *b.get(&key).expect("present");
        let taken = b.take(&key).expect("taken");
        prop_assert_eq!(taken, before);
        prop_assert!(!b.contains(&key));
        prop_assert!(b.put(taken).is_none());
        prop_assert_eq!(*b.get(&key).expect("back"), before);
        prop_assert_eq!(b.size(), entries.len());
        prop_assert!(b.is_consistent());
    }

    /// An overflowing put evicts exactly one entry, and nothing left in
    /// the bag has a lower priority than it.
    #[test]
    fn overflow_evicts_one_lowest(
        levels in 1usize..12,
        existing in vec(unit(), 1..12),
        incoming in unit()
    ) {
        let capacity = existing.len();
        let mut b = bag(levels, capacity, 11);
        for (i, p) in existing.iter().enumerate() {
            b.put(link(i as u64, *p));
        }
        let evicted = b.put(link(1000, incoming)).expect("overflow evicts");
        prop_assert_eq!(b.size(), capacity);
        prop_assert!(!b.contains(&evicted.task));
        let lowest = evicted.budget.priority();
        for entry in b.iter() {
            prop_assert!(entry.budget.priority() >= lowest);
        }
    }

    /// Decay never raises priority, never goes below the floor, and is
    /// monotonic in elapsed time.
    #[test]
    fn decay_is_monotonic_and_bounded(
        p in unit(),
        d in unit(),
        q in unit(),
        floor in unit(),
        half_life in 0.0f32..50.0,
        t1 in 0.0f32..200.0,
        dt in 0.0f32..200.0
    ) {
        let b = Budget::new(p, d, q);
        let early = decay(&b, t1, floor, half_life);
        let late = decay(&b, t1 + dt, floor, half_life);

        prop_assert!(!early.priority().is_nan());
        prop_assert!(early.priority() <= p);
        prop_assert!(late.priority() <= early.priority());
        if p > floor * q {
            prop_assert!(late.priority() >= floor * q - 1e-6);
        } else {
            prop_assert_eq!(late.priority(), p);
        }
        prop_assert_eq!(late.durability(), b.durability());
        prop_assert_eq!(late.quality(), b.quality());
    }

    /// Merge keeps every field in range and merging a budget with itself
    /// returns it exactly.
    #[test]
    fn merge_bounded_and_idempotent(
        a in (unit(), unit(), unit()),
        c in (unit(), unit(), unit())
    ) {
        let x = Budget::from_triple(a);
        let y = Budget::from_triple(c);
        let m = merge(&x, &y);
        for v in [m.priority(), m.durability(), m.quality()] {
            prop_assert!((0.0..=1.0).contains(&v));
        }
        prop_assert_eq!(m.priority(), x.priority().max(y.priority()));
        let same = merge(&x, &x);
        prop_assert_eq!(same, x);
    }

    /// Mass tracks the sum of priorities through puts and takes.
    #[test]
    fn mass_matches_contents(
        ops in vec((any::<bool>(), 0u64..16, unit()), 0..80)
    ) {
        let mut b = bag(6, 10, 5);
        for (insert, key, p) in ops {
            if insert {
                b.put(link(key, p));
            } else {
                b.take(&TaskId(key));
            }
        }
        let sum: f32 = b.iter().map(|e| e.budget.priority()).sum();
        prop_assert!((b.mass() - sum).abs() < 1e-3);
        if b.is_empty() {
            prop_assert_eq!(b.mass(), 0.0);
        }
    }

    /// The same seed and the same inputs sample the same sequence.
    #[test]
    fn same_seed_same_sequence(
        seed in any::<u64>(),
        entries in vec(unit(), 1..24),
        distributor in any::<bool>()
    ) {
        let sampling = if distributor { Sampling::Distributor } else { Sampling::MassWeighted };
        let sequence = || {
            let mut b = bag(8, 32, seed).with_sampling(sampling);
            for (i, p) in entries.iter().enumerate() {
                b.put(link(i as u64, *p));
            }
            let mut out = Vec::new();
            for _ in 0..40 {
                let next = b.take_next().expect("non-empty");
                out.push(next.task);
                b.put(next);
            }
            out
        };
        prop_assert_eq!(sequence(), sequence());
    }

    /// Entries sharing one bucket are all drawn, whichever sampling runs.
    #[test]
    fn every_peer_in_a_bucket_is_drawn(
        seed in any::<u64>(),
        peers in 2u64..8,
        p in unit(),
        distributor in any::<bool>()
    ) {
        let sampling = if distributor { Sampling::Distributor } else { Sampling::MassWeighted };
        let mut b = bag(4, 16, seed).with_sampling(sampling);
        for key in 0..peers {
            b.put(link(key, p));
        }
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..peers * 60 {
            let next = b.take_next().expect("non-empty");
            seen.insert(next.task);
            b.put(next);
        }
        prop_assert_eq!(seen.len() as u64, peers);
    }

    /// `peek_next` visits every entry within one full rotation.
    #[test]
    fn peek_next_visits_everything(entries in vec(unit(), 1..20)) {
        let mut b = bag(5, 32, 2);
        for (i, p) in entries.iter().enumerate() {
            b.put(link(i as u64, *p));
        }
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..entries.len() {
            seen.insert(b.peek_next().expect("entry").task);
        }
        prop_assert_eq!(seen.len(), entries.len());
    }
}
