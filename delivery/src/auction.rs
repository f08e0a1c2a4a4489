//! The weighted-random auction and the uniform fallback draw.
//!
//! Between any two candidates A and B the auction prefers A with probability
//! `weight(A) / (weight(A) + weight(B))`. Rather than sorting with a
//! randomized comparator (which is not transitive and has no defined law for
//! more than two candidates), the winner is drawn in one pass over the
//! cumulative weights - the marginal distribution `weight / total` reproduces
//! the pairwise law and is well-defined for any candidate count.

use adserver_primitives::Content;
use rand::Rng;

use crate::matcher::MatchResult;

/// Draws the auction winner among the scored candidates.
///
/// When every candidate weighs 0 (e.g. an unrestricted request) the draw is
/// uniform, so a weight-0 candidate still wins against its peers. Against any
/// positively weighted candidate a weight-0 candidate never wins - its
/// marginal probability is exactly `0 / total`, and no floor is fabricated.
///
/// Draws come from the process-wide thread-local generator: selections are
/// deliberately not reproducible run-to-run.
pub fn select_winner(candidates: &[MatchResult]) -> Option<&MatchResult> {
    if candidates.is_empty() {
        return None;
    }

    let mut rng = rand::thread_rng();

    let total: u128 = candidates.iter().map(MatchResult::weight).sum();
    if total == 0 {
        return candidates.get(rng.gen_range(0..candidates.len()));
    }

    let mut draw = rng.gen_range(0..total);
    for candidate in candidates {
        let weight = candidate.weight();
        if draw < weight {
            return Some(candidate);
        }
        draw -= weight;
    }

    // the cumulative walk always terminates inside the loop, since the draw
    // is strictly below the sum of all weights
    candidates.last()
}

/// Uniform draw among the active content of a format - the fallback when no
/// targeted candidate exists, and the whole selection for untargeted
/// requests.
pub fn select_uniform(active: &[Content]) -> Option<&Content> {
    if active.is_empty() {
        return None;
    }

    let mut rng = rand::thread_rng();

    active.get(rng.gen_range(0..active.len()))
}
