//! Pair selection for head-to-head comparisons
//!
//! The previously shown pair is passed in explicitly rather than kept as
//! ambient per-session state, which keeps selection a pure function of its
//! inputs and the supplied random source.

use crate::types::ItemId;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of a pairing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairSelection {
    /// Two distinct movies to compare
    Pair(ItemId, ItemId),
    /// Fewer than two movies exist
    InsufficientItems { available: usize },
}

/// Configuration for pairing behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Minimum number of movies before the previous pair is avoided
    pub min_items_for_exclusion: usize,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            min_items_for_exclusion: 3,
        }
    }
}

/// Random pairing that avoids showing the same movies back to back
#[derive(Debug, Clone, Default)]
pub struct PairingPolicy {
    config: PairingConfig,
}

impl PairingPolicy {
    pub fn new(config: PairingConfig) -> Self {
        Self { config }
    }

    /// Pick two distinct movies from `candidates`
    ///
    /// When enough movies exist, both members of `exclude` are left out of
    /// the draw. If that leaves fewer than two movies the draw falls back to
    /// the full candidate set, which may repeat the previous pair.
    pub fn pick_pair<R: Rng + ?Sized>(
        &self,
        candidates: &[ItemId],
        exclude: Option<(ItemId, ItemId)>,
        rng: &mut R,
    ) -> PairSelection {
        if candidates.len() < 2 {
            return PairSelection::InsufficientItems {
                available: candidates.len(),
            };
        }

        if let Some((a, b)) = exclude {
            if candidates.len() >= self.config.min_items_for_exclusion {
                let remaining: Vec<ItemId> = candidates
                    .iter()
                    .copied()
                    .filter(|id| *id != a && *id != b)
                    .collect();

                if remaining.len() >= 2 {
                    return Self::draw(&remaining, rng);
                }
            }
        }

        Self::draw(candidates, rng)
    }

    fn draw<R: Rng + ?Sized>(pool: &[ItemId], rng: &mut R) -> PairSelection {
        let picked = index::sample(rng, pool.len(), 2);
        PairSelection::Pair(pool[picked.index(0)], pool[picked.index(1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair_ids(selection: PairSelection) -> (ItemId, ItemId) {
        match selection {
            PairSelection::Pair(a, b) => (a, b),
            other => panic!("expected a pair, got {:?}", other),
        }
    }

    #[test]
    fn test_insufficient_items() {
        let policy = PairingPolicy::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            policy.pick_pair(&[], None, &mut rng),
            PairSelection::InsufficientItems { available: 0 }
        );
        assert_eq!(
            policy.pick_pair(&[5], Some((5, 6)), &mut rng),
            PairSelection::InsufficientItems { available: 1 }
        );
    }

    #[test]
    fn test_two_items_always_paired_despite_exclusion() {
        let policy = PairingPolicy::default();
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..50 {
            let (a, b) = pair_ids(policy.pick_pair(&[1, 2], Some((1, 2)), &mut rng));
            let mut ids = [a, b];
            ids.sort();
            assert_eq!(ids, [1, 2]);
        }
    }

    #[test]
    fn test_previous_pair_avoided() {
        let policy = PairingPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = [1, 2, 3, 4, 5];

        for _ in 0..200 {
            let (a, b) = pair_ids(policy.pick_pair(&candidates, Some((2, 4)), &mut rng));
            assert_ne!(a, b);
            assert!(![2, 4].contains(&a));
            assert!(![2, 4].contains(&b));
        }
    }

    #[test]
    fn test_fallback_when_exclusion_leaves_one() {
        let policy = PairingPolicy::default();
        let mut rng = StdRng::seed_from_u64(4);
        let candidates = [1, 2, 3];

        // Excluding 1 and 2 leaves only 3, so any pair may be drawn
        for _ in 0..50 {
            let (a, b) = pair_ids(policy.pick_pair(&candidates, Some((1, 2)), &mut rng));
            assert_ne!(a, b);
            assert!(candidates.contains(&a) && candidates.contains(&b));
        }
    }

    #[test]
    fn test_unknown_exclusion_ids_are_ignored() {
        let policy = PairingPolicy::default();
        let mut rng = StdRng::seed_from_u64(5);

        let (a, b) = pair_ids(policy.pick_pair(&[10, 11, 12], Some((98, 99)), &mut rng));
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_item_eventually_drawn() {
        let policy = PairingPolicy::default();
        let mut rng = StdRng::seed_from_u64(6);
        let candidates = [1, 2, 3, 4];
        let mut seen = std::collections::HashSet::new();

        for _ in 0..200 {
            let (a, b) = pair_ids(policy.pick_pair(&candidates, None, &mut rng));
            seen.insert(a);
            seen.insert(b);
        }
        assert_eq!(seen.len(), candidates.len());
    }
}
