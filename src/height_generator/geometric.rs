//! Geometric height generator.

use rand::prelude::*;
use thiserror::Error;

use crate::height_generator::HeightGenerator;

/// Default upper bound on node height.
pub const DEFAULT_MAX_HEIGHT: usize = 32;

/// Default probability denominator; each extra level is granted with
/// probability `1/4`.
pub const DEFAULT_PROBABILITY_DENOMINATOR: u32 = 4;

/// Largest accepted maximum height.
pub const MAX_HEIGHT_LIMIT: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] height generator.
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum height must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum height must not exceed [`MAX_HEIGHT_LIMIT`].
    #[error("max must be at most {}.", MAX_HEIGHT_LIMIT)]
    MaxTooLarge,
    /// The probability denominator `$p$` must be at least 2.
    #[error("probability denominator must be at least 2.")]
    InvalidDenominator,
}

/// A height generator using a geometric distribution.
///
/// Every node has height at least 1. Each additional level is granted with
/// probability `$1/p$`, so a height `$k < \text{max}$` is drawn with
/// probability
///
/// ```math
/// P(k) = \left(\frac{1}{p}\right)^{k-1} \left(1 - \frac{1}{p}\right)
/// ```
///
/// and the remaining tail mass saturates at the maximum height.
#[derive(Debug, Clone)]
pub struct Geometric {
    /// The largest height that will be produced.
    max: usize,
    /// The probability denominator `$p$`.
    denominator: u32,
    /// The random number generator, scoped to this instance.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric height generator producing heights in
    /// `[1, max]`, where each additional level is granted with probability
    /// `1/denominator`.
    ///
    /// The random source is seeded from the operating system.
    ///
    /// # Errors
    ///
    /// `max` must lie in `[1, MAX_HEIGHT_LIMIT]` and `denominator` must be at
    /// least 2.
    #[inline]
    pub fn new(max: usize, denominator: u32) -> Result<Self, GeometricError> {
        Self::with_rng(max, denominator, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Create a new geometric height generator with a deterministic random
    /// source.
    ///
    /// # Errors
    ///
    /// See [`Geometric::new`].
    #[inline]
    pub fn seeded(max: usize, denominator: u32, seed: u64) -> Result<Self, GeometricError> {
        Self::with_rng(max, denominator, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(max: usize, denominator: u32, rng: SmallRng) -> Result<Self, GeometricError> {
        if max == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if max > MAX_HEIGHT_LIMIT {
            return Err(GeometricError::MaxTooLarge);
        }
        if denominator < 2 {
            return Err(GeometricError::InvalidDenominator);
        }
        Ok(Geometric {
            max,
            denominator,
            rng,
        })
    }

    /// The probability denominator `$p$`.
    #[must_use]
    #[inline]
    pub fn denominator(&self) -> u32 {
        self.denominator
    }
}

impl Default for Geometric {
    #[inline]
    fn default() -> Self {
        Geometric {
            max: DEFAULT_MAX_HEIGHT,
            denominator: DEFAULT_PROBABILITY_DENOMINATOR,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}

impl HeightGenerator for Geometric {
    #[inline]
    fn max_height(&self) -> usize {
        self.max
    }

    /// Generate a height by repeated Bernoulli trials, each succeeding with
    /// probability `$1/p$`, stopping at the first failure or at the maximum.
    #[inline]
    fn next_height(&mut self) -> usize {
        let mut height = 1;
        while height < self.max && self.rng.random_ratio(1, self.denominator) {
            height += 1;
        }
        height
    }
}
