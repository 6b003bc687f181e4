use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform randomness for every spawner.
///
/// Simulations take `&mut impl Dice` instead of owning an RNG so tests can
/// script the exact draw sequence.
pub(crate) trait Dice {
    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f32;

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }

    /// Uniform in `[-width/2, width/2)`.
    fn spread(&mut self, width: f32) -> f32 {
        (self.unit() - 0.5) * width
    }

    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}

impl Dice for StdRng {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// `seed == 0` asks for an entropy seed.
pub(crate) fn seeded(seed: u64) -> StdRng {
    if seed != 0 {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_entropy()
    }
}

/// Replays a fixed list of draws, wrapping at the end.
#[cfg(test)]
pub(crate) struct Script {
    values: Vec<f32>,
    at: usize,
}

#[cfg(test)]
impl Script {
    pub(crate) fn new(values: &[f32]) -> Self {
        assert!(!values.is_empty(), "script needs at least one value");
        Self {
            values: values.to_vec(),
            at: 0,
        }
    }

    pub(crate) fn constant(v: f32) -> Self {
        Self::new(&[v])
    }

    pub(crate) fn draws(&self) -> usize {
        self.at
    }
}

#[cfg(test)]
impl Dice for Script {
    fn unit(&mut self) -> f32 {
        let v = self.values[self.at % self.values.len()];
        self.at += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_map_unit_draws() {
        let mut d = Script::new(&[0.0, 0.5, 0.25, 0.9]);
        assert_eq!(d.range(2.0, 4.0), 2.0);
        assert_eq!(d.spread(10.0), 0.0);
        assert!(d.chance(0.3));
        assert!(!d.chance(0.3));
        assert_eq!(d.draws(), 4);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..16 {
            assert_eq!(a.unit(), b.unit());
        }
    }

    #[test]
    fn std_rng_stays_in_unit_interval() {
        let mut r = seeded(7);
        for _ in 0..1000 {
            let v = r.unit();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
