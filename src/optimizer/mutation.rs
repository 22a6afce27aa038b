use crate::catalog::Combination;
use fastrand::Rng;

/// Card-id sampling rule for neighbor moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdSampler {
    pub card_count: usize,
    /// Effective preferred range: `min(preferred_subrange_size, card_count)`.
    pub preferred: usize,
    pub bias: f64,
}

impl IdSampler {
    pub fn new(card_count: usize, preferred_subrange_size: usize, bias: f64) -> Self {
        Self {
            card_count,
            preferred: preferred_subrange_size.min(card_count),
            bias,
        }
    }

    #[inline(always)]
    pub fn sample(&self, rng: &mut Rng) -> usize {
        if self.preferred > 0 && rng.f64() < self.bias {
            rng.usize(0..self.preferred)
        } else {
            rng.usize(0..self.card_count)
        }
    }
}

/// Every slot drawn uniformly from the full id range.
pub fn random_combination(rng: &mut Rng, card_count: usize, slots: usize) -> Combination {
    let ids = (0..slots).map(|_| rng.usize(0..card_count)).collect();
    Combination::from_ids_unchecked(ids)
}

/// Copies `current` and rewrites between 1 and `max_changes` randomly chosen
/// slots. The same slot may be picked twice.
pub fn neighbor(
    rng: &mut Rng,
    current: &Combination,
    sampler: &IdSampler,
    max_changes: usize,
) -> Combination {
    let mut next = current.clone();
    let changes = 1 + rng.usize(0..max_changes.max(1));
    for _ in 0..changes {
        let slot = rng.usize(0..next.len());
        next.set(slot, sampler.sample(rng));
    }
    next
}
