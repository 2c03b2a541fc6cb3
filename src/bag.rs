//! Shape sources for piece generation
//!
//! The engine never reaches for an ambient RNG. It pulls kinds from a
//! `ShapeSource`, so a game is fully determined by its seed (or by a
//! scripted sequence in tests and replays).

use crate::tetromino::ShapeKind;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplies the kind of each newly spawned piece
pub trait ShapeSource {
    fn next_shape(&mut self) -> ShapeKind;
}

/// Uniformly random kinds drawn from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomShapes<R> {
    rng: R,
}

impl<R: Rng> RandomShapes<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomShapes<ChaCha8Rng> {
    /// Reproducible stream for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ShapeSource for RandomShapes<R> {
    fn next_shape(&mut self) -> ShapeKind {
        ShapeKind::random(&mut self.rng)
    }
}

/// Replays a fixed list of kinds, starting over when it runs out
#[derive(Debug, Clone)]
pub struct ShapeSequence {
    kinds: Vec<ShapeKind>,
    next: usize,
}

impl ShapeSequence {
    /// An empty list falls back to cycling through every kind
    pub fn new(kinds: impl Into<Vec<ShapeKind>>) -> Self {
        let mut kinds = kinds.into();
        if kinds.is_empty() {
            kinds = ShapeKind::all().to_vec();
        }
        Self { kinds, next: 0 }
    }
}

impl ShapeSource for ShapeSequence {
    fn next_shape(&mut self) -> ShapeKind {
        let kind = self.kinds[self.next % self.kinds.len()];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}
