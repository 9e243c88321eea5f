// src/utils/random.rs

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniform numbers in `[0, 1)`.
///
/// Every shuffle in the crate draws from one of these so tests can pin the order
/// with a closure returning a fixed sequence.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Entropy-seeded generator used outside of tests.
#[derive(Debug, Clone)]
pub struct SystemRandom(StdRng);

impl SystemRandom {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Fisher–Yates shuffle in place, walking from the back.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let r = rng.next_unit().clamp(0.0, 1.0);
        // r is below 1.0 for a well-behaved source; min() keeps j in range otherwise
        let j = ((r * (i + 1) as f64).floor() as usize).min(i);
        items.swap(i, j);
    }
}

/// Returns a shuffled copy of `items`.
pub fn shuffled<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: RandomSource + ?Sized,
{
    let mut copied = items.to_vec();
    shuffle(&mut copied, rng);
    copied
}
