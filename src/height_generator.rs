//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level $n > 0$ will contain a random subset of the nodes on level `n - 1`.
//!
//! The number of levels a node participates in is its _height_. A node of
//! height `h` is linked into levels `0..h`, so every height lies in
//! `[1, max_height]`.
//!
//! Most commonly, a geometric distribution is used whereby each additional
//! level beyond the first is granted with probability `1/p`. See
//! [`Geometric`].

pub mod geometric;

pub use geometric::{Geometric, GeometricError};

/// Upon the insertion of a new key in the list, the node is replicated to
/// higher levels as determined by a [`HeightGenerator`].
///
/// The generator is owned by the writer handle, so it is only ever driven by
/// one thread at a time.
pub trait HeightGenerator {
    /// The largest height this generator will ever produce.
    #[must_use]
    fn max_height(&self) -> usize;

    /// Generate a random height for a new node in the range
    /// `[1, max_height]`.
    ///
    /// This function should _never_ return 0 or a height greater than
    /// [`max_height`][HeightGenerator::max_height].
    #[must_use]
    fn next_height(&mut self) -> usize;
}

impl<G: HeightGenerator + ?Sized> HeightGenerator for Box<G> {
    #[inline]
    fn max_height(&self) -> usize {
        (**self).max_height()
    }

    #[inline]
    fn next_height(&mut self) -> usize {
        (**self).next_height()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::HeightGenerator;

    /// Replays a fixed sequence of heights, cycling once exhausted.
    #[derive(Debug, Clone)]
    pub(crate) struct Replay {
        max: usize,
        heights: Vec<usize>,
        cursor: usize,
    }

    impl Replay {
        pub(crate) fn new(max: usize, heights: Vec<usize>) -> Self {
            assert!(heights.iter().all(|h| (1..=max).contains(h)));
            Self {
                max,
                heights,
                cursor: 0,
            }
        }
    }

    impl HeightGenerator for Replay {
        fn max_height(&self) -> usize {
            self.max
        }

        fn next_height(&mut self) -> usize {
            let height = self.heights[self.cursor % self.heights.len()];
            self.cursor += 1;
            height
        }
    }

    #[test]
    fn replay_cycles() {
        let mut generator = Replay::new(4, vec![1, 4, 2]);
        let drawn: Vec<_> = (0..6).map(|_| generator.next_height()).collect();
        assert_eq!(drawn, vec![1, 4, 2, 1, 4, 2]);
    }

    #[test]
    fn boxed_generator_delegates() {
        let mut boxed: Box<dyn HeightGenerator> = Box::new(Replay::new(3, vec![3]));
        assert_eq!(boxed.max_height(), 3);
        assert_eq!(boxed.next_height(), 3);
    }
}
