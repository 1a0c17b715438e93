// Seeded Park-Miller (Lehmer) stream used by every procedural layout.
// Each stream is a plain value: no global state, no thread-locals.

/// Modulus 2^31 - 1 (a Mersenne prime).
const MODULUS: i64 = 2_147_483_647;
/// Minimal-standard multiplier.
const MULTIPLIER: i64 = 16_807;
/// Largest f32 below 1.0; the f64 stream can round up to 1.0 when narrowed.
const BELOW_ONE_F32: f32 = 1.0 - f32::EPSILON / 2.0;

/// Reproducible float stream in [0, 1).
///
/// Two streams built from the same seed yield identical sequences forever.
/// Any integer is a valid seed; it is folded into [1, MODULUS - 1] so the
/// zero state (which would lock the recurrence) can never be reached.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: i64,
}

impl SeededRng {
    pub fn new(seed: i64) -> Self {
        let mut state = seed % MODULUS;
        if state <= 0 {
            state += MODULUS - 1;
        }
        Self { state }
    }

    /// Advance the recurrence and return the next value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_f64() as f32).min(BELOW_ONE_F32)
    }

    /// Uniform value in [lo, hi).
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform value in [-half, half).
    pub fn centered(&mut self, half: f32) -> f32 {
        (self.next_f32() - 0.5) * 2.0 * half
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn matches_minimal_standard_sequence() {
        // Park & Miller: seed 1 -> 16807 -> 282475249 -> 1622650073
        let mut rng = SeededRng::new(1);
        let expected = [16_807i64, 282_475_249, 1_622_650_073];
        for state in expected {
            let v = rng.next_f64();
            assert_eq!(v, (state - 1) as f64 / (MODULUS - 1) as f64);
        }
    }

    #[test]
    fn zero_and_negative_seeds_are_usable() {
        for seed in [0, -1, -MODULUS, MODULUS] {
            let mut rng = SeededRng::new(seed);
            let a = rng.next_f64();
            let b = rng.next_f64();
            assert!((0.0..1.0).contains(&a));
            assert_ne!(a, b, "seed {seed} produced a stuck stream");
        }
    }

    #[test]
    fn centered_stays_in_band() {
        let mut rng = SeededRng::new(42);
        for _ in 0..1000 {
            let v = rng.centered(0.6);
            assert!((-0.6..0.6).contains(&v));
        }
    }

    proptest! {
        #[test]
        fn same_seed_same_sequence(seed in any::<i64>(), draws in 0usize..256) {
            let mut a = SeededRng::new(seed);
            let mut b = SeededRng::new(seed);
            for _ in 0..draws {
                let x = a.next_f64();
                prop_assert_eq!(x.to_bits(), b.next_f64().to_bits());
                prop_assert!((0.0..1.0).contains(&x));
            }
        }
    }
}
