// Per-worker random streams for decay sampling.
//
// Each prototype copy of a decay model is driven by its own FastRng. Streams
// are derived from a run seed and a stream index so that workers never share
// or overlap state.

use rand::{RngCore, SeedableRng};

/// LCG multiplier of the PCG base generator
const PCG_MULT: u64 = 6364136223846793005;
/// LCG increment of the PCG base generator
const PCG_ADD: u64 = 1442695040888963407;
/// Golden-ratio increment used by splitmix64
const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// splitmix64 finalizer, used to decorrelate neighbouring seeds.
#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Small PCG (RXS-M-XS) generator with 8 bytes of state.
///
/// Reference: Melissa E. O'Neill, "PCG: A Family of Simple Fast Space-Efficient
/// Statistically Good Algorithms for Random Number Generation"
#[derive(Clone, Copy, Debug)]
pub struct FastRng {
    state: u64,
}

impl FastRng {
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generator for worker `stream` of a run seeded with `seed`.
    ///
    /// The stream index is mixed through splitmix64 before seeding, so
    /// streams `0, 1, 2, ...` of one run start far apart in the LCG cycle.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mixed = splitmix64(seed.wrapping_add(SPLITMIX_GAMMA.wrapping_mul(stream.wrapping_add(1))));
        Self::new(splitmix64(mixed ^ seed))
    }

    /// Uniform f64 in [0, 1)
    #[inline(always)]
    pub fn uniform(&mut self) -> f64 {
        // top 53 bits -> exact dyadic rational below 1
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

impl SeedableRng for FastRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(splitmix64(state))
    }
}

impl RngCore for FastRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.state = PCG_MULT.wrapping_mul(self.state).wrapping_add(PCG_ADD);
        let word = ((self.state >> ((self.state >> 59) + 5)) ^ self.state)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_stream_is_deterministic() {
        let mut a = FastRng::for_stream(7, 3);
        let mut b = FastRng::for_stream(7, 3);
        for _ in 0..100 {
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = FastRng::new(42);
        for _ in 0..10000 {
            let val = rng.uniform();
            assert!((0.0..1.0).contains(&val), "Value {} out of range [0, 1)", val);
        }
    }

    #[test]
    fn test_streams_differ() {
        let mut s0 = FastRng::for_stream(2024, 0);
        let mut s1 = FastRng::for_stream(2024, 1);
        let first: Vec<u64> = (0..16).map(|_| s0.next_u64()).collect();
        let second: Vec<u64> = (0..16).map(|_| s1.next_u64()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = FastRng::new(1);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_works_as_rand_rng() {
        let mut rng = FastRng::seed_from_u64(12345);
        let x: f64 = rng.gen();
        assert!((0.0..1.0).contains(&x));
        let _: bool = rng.gen();
    }
}
