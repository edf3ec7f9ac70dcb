//! Deterministic train/validation partitioning.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PipelineError, Result};
use crate::types::SplitPlan;

/// Training ratio and shuffle seed for one preparation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    ratio: f64,
    seed: u64,
}

impl Split {
    /// Build a split, rejecting ratios outside the open interval (0, 1).
    pub fn new(ratio: f64, seed: u64) -> Result<Self> {
        if ratio > 0.0 && ratio < 1.0 {
            Ok(Self { ratio, seed })
        } else {
            Err(PipelineError::InvalidSplitRatio(ratio))
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `floor(total * ratio)`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn split_index(&self, total: usize) -> usize {
        ((total as f64) * self.ratio).floor() as usize
    }
}

impl Default for Split {
    fn default() -> Self {
        Self {
            ratio: 0.8,
            seed: 42,
        }
    }
}

/// Shuffle `items` with a seeded RNG and cut it at the split index.
///
/// Both halves are non-empty for non-empty input:
/// - an empty train half becomes the whole input;
/// - an empty val half becomes the first fifth of the shuffled input, or the
///   whole input when that fifth is empty too.
///
/// The fallbacks can make train and val overlap. With a single item both sets
/// are that item.
///
/// The same seed gives the same plan only for the same `rand` release:
/// `StdRng` may change its algorithm between versions, so keep `Cargo.lock`
/// committed when splits must be reproduced across builds.
pub fn plan<T: Clone>(items: &[T], split: Split) -> SplitPlan<T> {
    let mut shuffled = items.to_vec();
    let mut rng = StdRng::seed_from_u64(split.seed());
    shuffled.shuffle(&mut rng);

    let split_idx = split.split_index(shuffled.len()).min(shuffled.len());
    let mut train = shuffled[..split_idx].to_vec();
    let mut val = shuffled[split_idx..].to_vec();

    if train.is_empty() {
        train = shuffled.clone();
    }
    if val.is_empty() {
        val = shuffled[..shuffled.len() / 5].to_vec();
        if val.is_empty() {
            val = shuffled;
        }
    }

    SplitPlan { train, val }
}
