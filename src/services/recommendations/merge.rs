use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::models::{MediaKind, RecommendationCandidate};

/// Concatenates the three sources in priority order and drops repeats
///
/// The first occurrence of an identity key wins, so content-based beats
/// collaborative, which beats generative. Unresolved stubs only collide with
/// stubs of the same kind and normalized title.
pub fn merge_candidates(
    content: Vec<RecommendationCandidate>,
    collaborative: Vec<RecommendationCandidate>,
    generative: Vec<RecommendationCandidate>,
) -> Vec<RecommendationCandidate> {
    let mut seen = HashSet::new();
    content
        .into_iter()
        .chain(collaborative)
        .chain(generative)
        .filter(|candidate| seen.insert(candidate.key()))
        .collect()
}

/// Either keeps the given order or randomizes it completely
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedShuffle {
    keep_order_probability: f64,
}

impl WeightedShuffle {
    pub const DEFAULT_KEEP_ORDER_PROBABILITY: f64 = 0.7;

    /// `keep_order_probability` is clamped to `[0, 1]`
    pub fn new(keep_order_probability: f64) -> Self {
        let p = if keep_order_probability.is_nan() {
            Self::DEFAULT_KEEP_ORDER_PROBABILITY
        } else {
            keep_order_probability.clamp(0.0, 1.0)
        };
        Self {
            keep_order_probability: p,
        }
    }

    pub fn keep_order_probability(&self) -> f64 {
        self.keep_order_probability
    }

    /// Returns true when the order was left untouched
    pub fn apply<T, R: Rng + ?Sized>(&self, items: &mut [T], rng: &mut R) -> bool {
        if rng.gen_bool(self.keep_order_probability) {
            return true;
        }
        items.shuffle(rng);
        false
    }
}

impl Default for WeightedShuffle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEEP_ORDER_PROBABILITY)
    }
}

/// Keeps only candidates of `kind`, preserving order
pub fn filter_by_kind(
    candidates: Vec<RecommendationCandidate>,
    kind: Option<MediaKind>,
) -> Vec<RecommendationCandidate> {
    match kind {
        Some(kind) => candidates
            .into_iter()
            .filter(|candidate| candidate.media_kind() == kind)
            .collect(),
        None => candidates,
    }
}
