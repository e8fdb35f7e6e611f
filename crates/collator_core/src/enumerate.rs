use rand::Rng;
use serde::Deserialize;

use crate::ComputeItem;

/// Inclusive range of Fibonacci ordinals to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrdinalRange {
    pub low: u64,
    pub high: u64,
}

impl Default for OrdinalRange {
    fn default() -> Self {
        Self {
            low: 1_000,
            high: 100_000,
        }
    }
}

/// Draw `count` random ordinals from `range`.
///
/// The generator is passed in explicitly so runs are reproducible under a
/// fixed seed. Duplicate ordinals are possible and fine: recomputing an
/// ordinal overwrites its artifact with the same value.
pub fn random_ordinals<R: Rng>(rng: &mut R, range: OrdinalRange, count: usize) -> Vec<ComputeItem> {
    (0..count)
        .map(|_| ComputeItem::new(rng.gen_range(range.low..=range.high)))
        .collect()
}
