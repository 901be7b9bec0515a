//! Construction options for a [`SkipList`](crate::SkipList).

use crate::height_generator::geometric::{
    DEFAULT_MAX_HEIGHT, DEFAULT_PROBABILITY_DENOMINATOR, Geometric, GeometricError,
};

/// Options used by [`SkipList::with_config`](crate::SkipList::with_config).
///
/// # Examples
///
/// ```
/// use memskip::{Config, SkipList};
///
/// let config = Config::default().with_max_height(12).with_seed(42);
/// let list: SkipList<u64, String> = SkipList::with_config(config).unwrap();
/// assert_eq!(list.max_height(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on node height.
    pub max_height: usize,
    /// Each level beyond the first is granted with probability
    /// `1/probability_denominator`.
    pub probability_denominator: u32,
    /// Seed for the height generator. When `None`, the generator is seeded
    /// from the operating system.
    pub seed: Option<u64>,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Config {
            max_height: DEFAULT_MAX_HEIGHT,
            probability_denominator: DEFAULT_PROBABILITY_DENOMINATOR,
            seed: None,
        }
    }
}

impl Config {
    /// Set the maximum node height.
    #[must_use]
    #[inline]
    pub fn with_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    /// Set the probability denominator.
    #[must_use]
    #[inline]
    pub fn with_probability_denominator(mut self, denominator: u32) -> Self {
        self.probability_denominator = denominator;
        self
    }

    /// Seed the height generator for reproducible level structures.
    #[must_use]
    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the height generator described by these options.
    ///
    /// # Errors
    ///
    /// Fails if `max_height` is zero or above
    /// [`MAX_HEIGHT_LIMIT`](crate::height_generator::geometric::MAX_HEIGHT_LIMIT),
    /// or if `probability_denominator` is below 2.
    pub fn generator(&self) -> Result<Geometric, GeometricError> {
        match self.seed {
            Some(seed) => Geometric::seeded(self.max_height, self.probability_denominator, seed),
            None => Geometric::new(self.max_height, self.probability_denominator),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Config;
    use crate::height_generator::{GeometricError, HeightGenerator};

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.max_height, 32);
        assert_eq!(config.probability_denominator, 4);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn builder() {
        let config = Config::default()
            .with_max_height(8)
            .with_probability_denominator(2)
            .with_seed(9);
        assert_eq!(
            config,
            Config {
                max_height: 8,
                probability_denominator: 2,
                seed: Some(9),
            }
        );
        assert_eq!(config.generator().map(|g| g.max_height()), Ok(8));
    }

    #[test]
    fn invalid() {
        assert_eq!(
            Config::default().with_max_height(0).generator().err(),
            Some(GeometricError::ZeroMax)
        );
        assert_eq!(
            Config::default()
                .with_max_height(usize::MAX)
                .generator()
                .err(),
            Some(GeometricError::MaxTooLarge)
        );
        assert_eq!(
            Config::default()
                .with_probability_denominator(1)
                .generator()
                .err(),
            Some(GeometricError::InvalidDenominator)
        );
    }
}
