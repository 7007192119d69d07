//! Server selection helpers.
//!
//! Pre-increment round robin, uniform picks and the two-draw comparison
//! behind power of two choices.

use rand::Rng;

use crate::domain::upstream::ServerId;
use crate::load_balancer::outstanding::OutstandingRequests;

/// Advance a round robin cursor and return the selected index.
///
/// The cursor is incremented before it is reduced modulo `candidates`, so a
/// fresh cursor at 0 yields `1, 2, .., candidates - 1, 0, 1, ..`.
pub fn next_round_robin(cursor: &mut usize, candidates: usize) -> ServerId {
    *cursor = (*cursor + 1) % candidates;
    ServerId(*cursor)
}

/// Pick an index uniformly from `[0, candidates)`.
pub fn pick_uniform<R: Rng + ?Sized>(rng: &mut R, candidates: usize) -> ServerId {
    ServerId(rng.gen_range(0..candidates))
}

/// Draw a first index, then redraw a second one until it differs.
///
/// `candidates` must be at least 2 or this never returns.
pub fn draw_distinct_pair<R: Rng + ?Sized>(rng: &mut R, candidates: usize) -> (ServerId, ServerId) {
    let first = pick_uniform(rng, candidates);
    let mut second = first;
    while second == first {
        second = pick_uniform(rng, candidates);
    }
    (first, second)
}

/// Keep `first` only if it is strictly less loaded; ties go to `second`.
pub fn prefer_less_loaded(
    first: ServerId,
    second: ServerId,
    load: &OutstandingRequests,
) -> ServerId {
    if load.get(first) < load.get(second) {
        first
    } else {
        second
    }
}

/// Power of two choices over the proxy's local load view.
pub fn least_of_two<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: usize,
    load: &OutstandingRequests,
) -> ServerId {
    let (first, second) = draw_distinct_pair(rng, candidates);
    prefer_less_loaded(first, second, load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    use crate::SimRng;

    #[test]
    fn test_round_robin_pre_increments() {
        let mut cursor = 0;
        let picks: Vec<usize> = (0..7).map(|_| next_round_robin(&mut cursor, 3).0).collect();
        assert_eq!(picks, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_round_robin_single_candidate() {
        let mut cursor = 0;
        for _ in 0..5 {
            assert_eq!(next_round_robin(&mut cursor, 1), ServerId(0));
        }
    }

    #[test]
    fn test_tie_goes_to_second_draw() {
        let load = OutstandingRequests::new(4);
        assert_eq!(prefer_less_loaded(ServerId(0), ServerId(3), &load), ServerId(3));
        assert_eq!(prefer_less_loaded(ServerId(3), ServerId(0), &load), ServerId(0));
    }

    #[test]
    fn test_strictly_less_loaded_first_wins() {
        let mut load = OutstandingRequests::new(2);
        load.increment(ServerId(1));
        assert_eq!(prefer_less_loaded(ServerId(0), ServerId(1), &load), ServerId(0));
        assert_eq!(prefer_less_loaded(ServerId(1), ServerId(0), &load), ServerId(0));
    }

    proptest! {
        #[test]
        fn prop_round_robin_cycles_without_repeats(k in 1usize..32, cycles in 1usize..5) {
            let mut cursor = 0;
            for _ in 0..cycles {
                let cycle: Vec<usize> = (0..k)
                    .map(|_| next_round_robin(&mut cursor, k).0)
                    .collect();
                let expected: Vec<usize> = (1..=k).map(|i| i % k).collect();
                prop_assert_eq!(cycle, expected);
            }
        }

        #[test]
        fn prop_pair_is_distinct_and_in_range(seed in any::<u64>(), n in 2usize..16) {
            let mut rng = SimRng::seed_from_u64(seed);
            let (a, b) = draw_distinct_pair(&mut rng, n);
            prop_assert_ne!(a, b);
            prop_assert!(a.0 < n && b.0 < n);
        }

        #[test]
        fn prop_least_of_two_never_picks_strictly_busier(
            seed in any::<u64>(),
            counts in proptest::collection::vec(0u32..5, 2..10),
        ) {
            let mut load = OutstandingRequests::new(counts.len());
            for (idx, &count) in counts.iter().enumerate() {
                for _ in 0..count {
                    load.increment(ServerId(idx));
                }
            }

            let mut rng = SimRng::seed_from_u64(seed);
            let mut replay = rng.clone();
            let picked = least_of_two(&mut rng, counts.len(), &load);
            let (a, b) = draw_distinct_pair(&mut replay, counts.len());

            prop_assert!(picked == a || picked == b);
            let other = if picked == a { b } else { a };
            prop_assert!(load.get(picked) <= load.get(other));
            if load.get(a) == load.get(b) {
                prop_assert_eq!(picked, b);
            }
        }
    }
}
