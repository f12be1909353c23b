//! Functions and structs related to managing genomes at the population scale: the two competing
//! roles, fitness normalization, ranking and selection of parents.

use crate::{
    constants::RUNCATCH_ELITE_COUNT,
    error::{Error, Result},
    Genome,
};
use core::{cmp::Ordering, fmt};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One of the two co-evolving groups, trained against each other every generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Runner,
    Catcher,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Runner, Role::Catcher];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Runner => "Runner",
            Role::Catcher => "Catcher",
        })
    }
}

/// The genomes of a single role, along with the size every generation is refilled to
#[derive(Debug, Clone)]
pub struct Population {
    role: Role,
    target: usize,
    genomes: Vec<Genome>,
    /// which genomes had their score reported this round
    reported: Vec<bool>,
}

impl Population {
    pub fn new(role: Role, target: usize, genomes: Vec<Genome>) -> Self {
        Self {
            role,
            target,
            reported: vec![false; genomes.len()],
            genomes,
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    #[inline]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    #[inline]
    pub(crate) fn genomes_mut(&mut self) -> &mut Vec<Genome> {
        &mut self.genomes
    }

    /// Replace this population's genomes wholesale
    pub(crate) fn replace(&mut self, genomes: Vec<Genome>) {
        self.reported = vec![false; genomes.len()];
        self.genomes = genomes;
    }

    /// Every genome starts a new life: scores are cleared and nothing counts as reported
    pub fn begin_round(&mut self) {
        for genome in self.genomes.iter_mut() {
            genome.reset();
        }
        self.reported.fill(false);
    }

    /// Record the raw score genome `index` earned this round
    pub fn report(&mut self, index: usize, score: f64) -> Result<()> {
        if !score.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "{} {index} reported a non-finite score {score}",
                self.role
            )));
        }
        let len = self.len();
        let genome = self
            .genomes
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        genome.set_evaluation(score);
        self.reported[index] = true;
        Ok(())
    }

    /// Number of genomes still waiting on a score this round
    pub fn pending(&self) -> usize {
        self.reported.iter().filter(|r| !**r).count()
    }
}

/// Where initial genomes may be loaded from instead of being randomized
pub trait GenomeSource {
    /// The persisted genome for slot `index` of `role`, if there is one
    fn load(&mut self, role: Role, index: usize) -> Result<Option<Genome>>;
}

/// A source with nothing in it, every genome of the initial population is random
#[derive(Debug, Default, Clone, Copy)]
pub struct Fresh;

impl GenomeSource for Fresh {
    fn load(&mut self, _: Role, _: usize) -> Result<Option<Genome>> {
        Ok(None)
    }
}

/// Build the initial population of `role`. The first `load_count` slots are taken from `source`
/// when it has a genome for them, every other slot gets weights drawn from
/// `[-init_range/2, +init_range/2]`.
pub fn population_init(
    role: Role,
    target: usize,
    weight_count: usize,
    init_range: f64,
    load_count: usize,
    source: &mut impl GenomeSource,
    rng: &mut impl RngCore,
) -> Result<Population> {
    let mut genomes = Vec::with_capacity(target);
    for idx in 0..target {
        let loaded = if idx < load_count {
            source.load(role, idx)?
        } else {
            None
        };

        let genome = match loaded {
            Some(genome) if genome.len() != weight_count => {
                return Err(Error::ShapeMismatch {
                    what: "weights in loaded genome",
                    expected: weight_count,
                    actual: genome.len(),
                })
            }
            Some(genome) => {
                info!(%role, idx, "loaded genome");
                genome
            }
            None => Genome::random(weight_count, init_range, rng)?,
        };
        genomes.push(genome);
    }
    Ok(Population::new(role, target, genomes))
}

/// Normalize every evaluation by the population mean, returning that mean.
///
/// A generation whose mean is exactly zero or not finite can't be normalized. All of its
/// fitness values are set to 0 instead of dividing, and `None` is returned. A negative mean
/// divides like any other.
pub fn compute_fitness(genomes: &mut [Genome]) -> Option<f64> {
    if genomes.is_empty() {
        return None;
    }

    let mean = genomes.iter().map(Genome::evaluation).sum::<f64>() / genomes.len() as f64;
    if mean == 0. || !mean.is_finite() {
        warn!(mean, "degenerate generation, every fitness is set to 0");
        for genome in genomes.iter_mut() {
            genome.set_fitness(0.);
        }
        return None;
    }

    for genome in genomes.iter_mut() {
        genome.set_fitness(genome.evaluation() / mean);
    }
    Some(mean)
}

/// Order genomes best first. The sort is stable, equal fitness keeps population order.
pub fn sort_by_fitness(genomes: &mut [Genome]) {
    genomes.sort_by(|l, r| {
        r.fitness()
            .partial_cmp(&l.fitness())
            .unwrap_or(Ordering::Equal)
    });
}

/// Keep the two best of a sorted population as the only parents.
/// A population of fewer than 2 is handed back as it is.
pub fn select_elitist(sorted: &[Genome]) -> Vec<Genome> {
    if sorted.len() < RUNCATCH_ELITE_COUNT {
        warn!(len = sorted.len(), "too few genomes to select from");
        return sorted.to_vec();
    }
    sorted[..RUNCATCH_ELITE_COUNT].to_vec()
}

/// Stochastic remainder selection over a sorted population.
///
/// Every genome of fitness `f >= 1` is cloned `floor(f)` times, then every genome, in population
/// order, is cloned once more with probability `f - floor(f)`. Negative fitness earns nothing.
/// Should fewer than 2 survive while `target` is non-zero, the two best are added so there is
/// always something to cross. A population of fewer than 2 is handed back as it is.
pub fn select_proportional(sorted: &[Genome], target: usize, rng: &mut impl RngCore) -> Vec<Genome> {
    if sorted.len() < RUNCATCH_ELITE_COUNT {
        warn!(len = sorted.len(), "too few genomes to select from");
        return sorted.to_vec();
    }

    let mut selected = Vec::with_capacity(target);
    for genome in sorted.iter().filter(|g| g.fitness() >= 1.) {
        // a genome can't usefully fill more than the whole next generation
        let clones = (genome.fitness().floor() as usize).min(target.max(1));
        selected.extend((0..clones).map(|_| genome.clone()));
    }

    for genome in sorted.iter() {
        let f = genome.fitness();
        let remainder = if f > 0. { f - f.floor() } else { 0. };
        if rng.random::<f64>() < remainder {
            selected.push(genome.clone());
        }
    }

    if selected.len() < RUNCATCH_ELITE_COUNT && target != 0 {
        warn!(
            selected = selected.len(),
            "too few survivors, forcing in the two best"
        );
        selected.extend(sorted[..RUNCATCH_ELITE_COUNT].iter().cloned());
    }
    selected
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, random::WyRng};
    use std::collections::HashMap;

    fn scored(evaluations: &[f64]) -> Vec<Genome> {
        evaluations
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut g = Genome::new(vec![i as f64]);
                g.set_evaluation(*e);
                g
            })
            .collect()
    }

    fn with_fitness(fitness: &[f64]) -> Vec<Genome> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let mut g = Genome::new(vec![i as f64]);
                g.set_fitness(*f);
                g
            })
            .collect()
    }

    fn tag(g: &Genome) -> usize {
        g.weights()[0] as usize
    }

    #[test]
    fn test_compute_fitness() {
        let mut pop = scored(&[10., 10., 0., 0.]);
        assert_eq!(Some(5.), compute_fitness(&mut pop));
        let fitness = pop.iter().map(Genome::fitness).collect::<Vec<_>>();
        assert_eq!(vec![2., 2., 0., 0.], fitness);

        let mut pop = scored(&[1., 2., 3.]);
        compute_fitness(&mut pop);
        assert_f64_approx!(0.5, pop[0].fitness());
        assert_f64_approx!(1.5, pop[2].fitness());
    }

    #[test]
    fn test_compute_fitness_degenerate() {
        for evaluations in [vec![0., 0., 0.], vec![1., -1.], vec![f64::INFINITY, 1.]] {
            let mut pop = scored(&evaluations);
            assert_eq!(None, compute_fitness(&mut pop));
            assert!(pop.iter().all(|g| g.fitness() == 0.));
        }
        assert_eq!(None, compute_fitness(&mut []));
    }

    #[test]
    fn test_compute_fitness_negative_mean() {
        let mut pop = scored(&[-1., -3.]);
        assert_eq!(Some(-2.), compute_fitness(&mut pop));
        assert_eq!(0.5, pop[0].fitness());
        assert_eq!(1.5, pop[1].fitness());
    }

    #[test]
    fn test_sort_signed_zero_ties() {
        let mut pop = with_fitness(&[0., -0., 0., 1., -0.]);
        sort_by_fitness(&mut pop);
        assert_eq!(vec![3, 0, 1, 2, 4], pop.iter().map(tag).collect::<Vec<_>>());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut pop = with_fitness(&[0.5, 2., 0.5, 2., 1.]);
        sort_by_fitness(&mut pop);
        assert_eq!(vec![1, 3, 4, 0, 2], pop.iter().map(tag).collect::<Vec<_>>());
    }

    #[test]
    fn test_select_elitist() {
        let mut pop = with_fitness(&[1., 5.]);
        sort_by_fitness(&mut pop);
        let selected = select_elitist(&pop);
        assert_eq!(2, selected.len());
        assert_eq!(5., selected[0].fitness());
        assert_eq!(1., selected[1].fitness());

        let pop = with_fitness(&[3., 2., 1., 0.]);
        assert_eq!(vec![0, 1], select_elitist(&pop).iter().map(tag).collect::<Vec<_>>());

        assert_eq!(1, select_elitist(&with_fitness(&[1.])).len());
        assert!(select_elitist(&[]).is_empty());
    }

    #[test]
    fn test_select_proportional_whole() {
        let mut rng = WyRng::seeded(0);
        // integral fitness leaves no remainder to roll for
        let pop = with_fitness(&[3., 1., 0., 0.]);
        let selected = select_proportional(&pop, 4, &mut rng);
        assert_eq!(vec![0, 0, 0, 1], selected.iter().map(tag).collect::<Vec<_>>());
    }

    #[test]
    fn test_select_proportional_negative() {
        let mut rng = WyRng::seeded(3);
        let mut pop = scored(&[4., 4., -2., -0.5]);
        compute_fitness(&mut pop);
        sort_by_fitness(&mut pop);
        for _ in 0..200 {
            let selected = select_proportional(&pop, 4, &mut rng);
            assert!(selected.iter().all(|g| g.fitness() > 0.));
        }
    }

    #[test]
    fn test_select_proportional_force_top_2() {
        let mut rng = WyRng::seeded(0);
        let pop = with_fitness(&[0., 0., 0.]);
        let selected = select_proportional(&pop, 3, &mut rng);
        assert_eq!(vec![0, 1], selected.iter().map(tag).collect::<Vec<_>>());

        assert!(select_proportional(&pop, 0, &mut rng).is_empty());
        assert_eq!(1, select_proportional(&with_fitness(&[0.]), 3, &mut rng).len());
    }

    #[test]
    fn test_select_proportional_remainder() {
        let mut rng = WyRng::seeded(12);
        let pop = with_fitness(&[1.75, 1.25, 0.5, 0.5]);
        let mut counts = HashMap::<usize, usize>::new();
        let rounds = 4_000;
        for _ in 0..rounds {
            for g in select_proportional(&pop, 4, &mut rng) {
                *counts.entry(tag(&g)).or_default() += 1;
            }
        }
        let rate = |t| counts.get(&t).copied().unwrap_or(0) as f64 / rounds as f64;
        assert!((rate(0) - 1.75).abs() < 0.05, "{}", rate(0));
        assert!((rate(1) - 1.25).abs() < 0.05, "{}", rate(1));
        assert!((rate(2) - 0.5).abs() < 0.05, "{}", rate(2));
        assert!((rate(3) - 0.5).abs() < 0.05, "{}", rate(3));
    }

    #[test]
    fn test_population_report() {
        let mut pop = Population::new(Role::Runner, 3, scored(&[0., 0., 0.]));
        assert_eq!(3, pop.pending());
        pop.report(1, 4.).unwrap();
        assert_eq!(2, pop.pending());
        assert_eq!(4., pop.genomes()[1].evaluation());
        assert!(matches!(
            pop.report(3, 1.),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(pop.report(0, f64::NAN), Err(Error::InvalidArgument(_))));

        pop.begin_round();
        assert_eq!(3, pop.pending());
        assert_eq!(0., pop.genomes()[1].evaluation());
    }

    struct OneSlot(Genome);

    impl GenomeSource for OneSlot {
        fn load(&mut self, role: Role, index: usize) -> Result<Option<Genome>> {
            Ok((role == Role::Catcher && index == 1).then(|| self.0.clone()))
        }
    }

    #[test]
    fn test_population_init() {
        let mut rng = WyRng::seeded(1);
        let pop = population_init(Role::Runner, 5, 7, 1., 0, &mut Fresh, &mut rng).unwrap();
        assert_eq!(5, pop.len());
        assert_eq!(5, pop.target());
        assert!(pop
            .genomes()
            .iter()
            .all(|g| g.len() == 7 && g.weights().iter().all(|w| (-0.5..=0.5).contains(w))));

        let muse = Genome::new(vec![9.; 7]);
        let source = &mut OneSlot(muse.clone());
        let pop = population_init(Role::Catcher, 4, 7, 1., 2, source, &mut rng).unwrap();
        assert_eq!(muse, pop.genomes()[1]);
        assert_ne!(muse, pop.genomes()[0]);

        // load count exhausted before slot 1
        let pop = population_init(Role::Catcher, 4, 7, 1., 1, source, &mut rng).unwrap();
        assert_ne!(muse, pop.genomes()[1]);

        let source = &mut OneSlot(Genome::new(vec![9.; 3]));
        assert!(matches!(
            population_init(Role::Catcher, 4, 7, 1., 4, source, &mut rng),
            Err(Error::ShapeMismatch { expected: 7, actual: 3, .. })
        ));
    }

    #[test]
    fn test_role_display() {
        assert_eq!("Runner", Role::Runner.to_string());
        assert_eq!("Catcher", Role::Catcher.to_string());
    }
}
