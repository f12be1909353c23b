use crate::config::GeneticConfig;
use core::cmp::min;
use rand::{RngCore, SeedableRng};
use std::{
    fs::File,
    io::{self, Read},
};

/// Random events the genetic operators roll for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionEvent {
    /// Swap one weight index between the two children of a crossover
    CrossSwap,
    /// Subject a whole genome to per-weight mutation
    MutateGenome,
    /// Perturb a single weight of a mutating genome
    MutateWeight,
}

pub const fn percent(x: u64) -> u64 {
    x * (u64::MAX / 100)
}

/// Probability `p` in `[0, 1]` as a threshold compared against a uniform `u64` roll.
pub fn chance(p: f64) -> u64 {
    if p.is_nan() || p <= 0. {
        0
    } else if p >= 1. {
        u64::MAX
    } else {
        (p * u64::MAX as f64) as u64
    }
}

pub trait Probabilities {
    type Update;
    fn probability(&self, evt: EvolutionEvent) -> u64;
    fn update(&mut self, stats: Self::Update);
}

pub trait Happens: RngCore + Probabilities {
    fn happens(&mut self, evt: EvolutionEvent) -> bool;
}

impl<T: RngCore + Probabilities> Happens for T {
    fn happens(&mut self, evt: EvolutionEvent) -> bool {
        self.probability(evt) > self.next_u64()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbStatic {
    cross_swap: u64,
    mutate_genome: u64,
    mutate_weight: u64,
}

impl ProbStatic {
    pub fn with_overrides(mut self, updates: &[(EvolutionEvent, u64)]) -> Self {
        for update in updates {
            self.update(*update);
        }
        self
    }

    pub fn from_config(config: &GeneticConfig) -> Self {
        Self {
            cross_swap: chance(config.cross_prob),
            mutate_genome: chance(config.mutation_amount),
            mutate_weight: chance(config.mutation_prob),
        }
    }
}

impl Default for ProbStatic {
    fn default() -> Self {
        Self::from_config(&GeneticConfig::default())
    }
}

impl Probabilities for ProbStatic {
    type Update = (EvolutionEvent, u64);
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        match evt {
            EvolutionEvent::CrossSwap => self.cross_swap,
            EvolutionEvent::MutateGenome => self.mutate_genome,
            EvolutionEvent::MutateWeight => self.mutate_weight,
        }
    }

    fn update(&mut self, (evt, v): Self::Update) {
        match evt {
            EvolutionEvent::CrossSwap => self.cross_swap = v,
            EvolutionEvent::MutateGenome => self.mutate_genome = v,
            EvolutionEvent::MutateWeight => self.mutate_weight = v,
        }
    }
}

/// wyrand, small and fast. Seed it explicitly for reproducible runs.
#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }

    /// A new generator seeded from this one, for handing to an independent pipeline
    pub fn fork(rng: &mut impl RngCore) -> Self {
        Self::seeded(rng.next_u64())
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_le_bytes()[..lim]);
            idx += lim;
        }
    }
}

impl SeedableRng for WyRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seeded(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::seeded(state)
    }
}

/// A probability table bound to the generator that rolls against it
#[derive(Debug, Clone)]
pub struct ProbBinding<P: Probabilities, R: RngCore> {
    p: P,
    r: R,
}

impl<P: Probabilities, R: RngCore> ProbBinding<P, R> {
    pub fn new(p: P, r: R) -> Self {
        Self { p, r }
    }
}

impl<P: Probabilities, R: RngCore> Probabilities for ProbBinding<P, R> {
    type Update = P::Update;
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        self.p.probability(evt)
    }

    fn update(&mut self, stats: Self::Update) {
        self.p.update(stats);
    }
}

impl<P: Probabilities, R: RngCore> RngCore for ProbBinding<P, R> {
    fn next_u32(&mut self) -> u32 {
        self.r.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.r.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.r.fill_bytes(dest)
    }
}

pub type GaRng = ProbBinding<ProbStatic, WyRng>;

pub fn seed_urandom() -> io::Result<u64> {
    let mut file = File::open("/dev/urandom")?;
    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

/// A generator seeded from `/dev/urandom`, or from the clock where that isn't available
pub fn default_rng() -> WyRng {
    let seed = seed_urandom().unwrap_or_else(|_| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed)
    });
    WyRng::seeded(seed)
}

#[cfg(test)]
mod test {
    use super::*;
    use core::iter::once;
    use rand::rngs::ThreadRng;

    const CHANCE_CROSS_SWAP: f64 = 0.6;
    const CHANCE_MUTATE_WEIGHT: f64 = 0.2;

    fn assert_within_deviation(
        evt: EvolutionEvent,
        chance: f64,
        range: f64,
        happens: &mut impl Happens,
    ) {
        let samples = 10_000.;
        let expected = chance * samples;
        let max_deviation = expected * range;
        for _ in 0..100 {
            let incidence = once(())
                .cycle()
                .take(samples as usize)
                .filter(|()| happens.happens(evt))
                .count() as f64;
            assert!(
                (expected - incidence).abs() < max_deviation,
                "{evt:?}: {incidence} != {expected} ± {max_deviation}"
            );
        }
    }

    // control test - we are confident that rand generates good random numbers
    #[test]
    fn test_deviation_rand() {
        let mut p_bind = ProbBinding::new(ProbStatic::default(), ThreadRng::default());
        for (evt, chance) in [
            (EvolutionEvent::CrossSwap, CHANCE_CROSS_SWAP),
            (EvolutionEvent::MutateWeight, CHANCE_MUTATE_WEIGHT),
        ] {
            assert_within_deviation(evt, chance, 0.1, &mut p_bind);
        }
    }

    #[test]
    fn test_deviation_wyrand() {
        let mut p_bind = ProbBinding::new(ProbStatic::default(), WyRng::seeded(0xdead_beef));
        for (evt, chance) in [
            (EvolutionEvent::CrossSwap, CHANCE_CROSS_SWAP),
            (EvolutionEvent::MutateWeight, CHANCE_MUTATE_WEIGHT),
        ] {
            assert_within_deviation(evt, chance, 0.1, &mut p_bind);
        }
    }

    #[test]
    fn test_chance_bounds() {
        assert_eq!(0, chance(0.));
        assert_eq!(0, chance(-1.));
        assert_eq!(0, chance(f64::NAN));
        assert_eq!(u64::MAX, chance(1.));
        assert_eq!(u64::MAX, chance(3.));
        assert!(chance(0.5) > percent(49) && chance(0.5) < percent(51));
    }

    #[test]
    fn test_never_and_always() {
        let probs = ProbStatic::default().with_overrides(&[
            (EvolutionEvent::CrossSwap, 0),
            (EvolutionEvent::MutateGenome, u64::MAX),
        ]);
        let mut rng = ProbBinding::new(probs, WyRng::seeded(7));
        for _ in 0..10_000 {
            assert!(!rng.happens(EvolutionEvent::CrossSwap));
        }
        // only a roll of exactly u64::MAX escapes an always event
        let hits = (0..10_000)
            .filter(|_| rng.happens(EvolutionEvent::MutateGenome))
            .count();
        assert_eq!(10_000, hits);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut l = WyRng::seed_from_u64(42);
        let mut r = WyRng::seed_from_u64(42);
        for _ in 0..64 {
            assert_eq!(l.next_u64(), r.next_u64());
        }

        let mut buf = [0u8; 13];
        WyRng::seeded(1).fill_bytes(&mut buf);
        assert!(buf.iter().any(|b| *b != 0));
    }
}
