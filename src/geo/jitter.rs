//! Coordinate jitter sources
//!
//! Jitter keeps markers for the same neighborhood from stacking on a map.
//! The source is always passed in explicitly so callers control determinism:
//! production uses `RngJitter` over a seeded or entropy-backed RNG, tests use
//! `NoJitter` or `SequenceJitter`.

use rand::Rng;

/// Produces one offset per call, uniformly distributed in `[-max, max]` degrees.
pub trait JitterSource {
    fn offset(&mut self, max_degrees: f64) -> f64;
}

/// Uniform jitter backed by any `rand::Rng`.
#[derive(Debug, Clone)]
pub struct RngJitter<R> {
    rng: R,
}

impl<R: Rng> RngJitter<R> {
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngJitter<rand::rngs::StdRng> {
    /// Entropy-seeded source for servers and the CLI.
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::from_entropy())
    }

    /// Reproducible source.
    pub fn seeded(seed: u64) -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> JitterSource for RngJitter<R> {
    fn offset(&mut self, max_degrees: f64) -> f64 {
        if max_degrees <= 0.0 || !max_degrees.is_finite() {
            return 0.0;
        }
        self.rng.gen_range(-max_degrees..=max_degrees)
    }
}

/// Always returns zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&mut self, _max_degrees: f64) -> f64 {
        0.0
    }
}

/// Replays a fixed list of offsets (cycling), clamped to `[-max, max]`.
///
/// Offsets are consumed latitude first, then longitude.
#[derive(Debug, Clone)]
pub struct SequenceJitter {
    offsets: Vec<f64>,
    cursor: usize,
}

impl SequenceJitter {
    pub fn new(offsets: Vec<f64>) -> Self {
        Self { offsets, cursor: 0 }
    }
}

impl JitterSource for SequenceJitter {
    fn offset(&mut self, max_degrees: f64) -> f64 {
        if self.offsets.is_empty() {
            return 0.0;
        }
        let value = self.offsets[self.cursor % self.offsets.len()];
        self.cursor += 1;
        let bound = max_degrees.max(0.0);
        value.clamp(-bound, bound)
    }
}
