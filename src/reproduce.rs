//! Functions related to refilling a population from its selected parents: combination, mutation
//! and reshuffling.

use crate::{
    constants::RUNCATCH_ELITE_COUNT,
    crossover::{crossover, uniq_2},
    random::{EvolutionEvent, Happens},
    Genome,
};
use core::cmp::min;
use rand::{seq::SliceRandom, RngCore};
use rand_distr::{Distribution, Uniform};
use tracing::warn;

/// Push crossed children of `l` and `r` until `pop` holds `size` genomes
#[inline]
fn push_children(
    pop: &mut Vec<Genome>,
    size: usize,
    l: &Genome,
    r: &Genome,
    rng: &mut (impl RngCore + Happens),
) {
    let (first, second) = crossover(l, r, rng);
    pop.push(first);
    if pop.len() < size {
        pop.push(second);
    }
}

/// Fill a population of `size` exclusively with children of the two best selected genomes.
/// With fewer than 2 selected there is nothing to cross, and they are handed back unchanged.
pub fn combine_elitist(
    selected: Vec<Genome>,
    size: usize,
    rng: &mut (impl RngCore + Happens),
) -> Vec<Genome> {
    if selected.len() < 2 {
        warn!(
            selected = selected.len(),
            "too few genomes to combine, keeping them unchanged"
        );
        return selected;
    }

    let mut pop = Vec::with_capacity(size);
    while pop.len() < size {
        push_children(&mut pop, size, &selected[0], &selected[1], rng);
    }
    pop
}

/// Carry the two best selected genomes over as they are, then fill a population of `size` with
/// children of random distinct pairs of selected genomes.
/// With fewer than 2 selected there is nothing to cross, and they are handed back unchanged.
pub fn combine_random(
    selected: Vec<Genome>,
    size: usize,
    rng: &mut (impl RngCore + Happens),
) -> Vec<Genome> {
    if selected.len() < 2 {
        warn!(
            selected = selected.len(),
            "too few genomes to combine, keeping them unchanged"
        );
        return selected;
    }

    let mut pop = Vec::with_capacity(size);
    pop.extend(
        selected
            .iter()
            .take(min(RUNCATCH_ELITE_COUNT, size))
            .cloned(),
    );
    while pop.len() < size {
        // len >= 2 was checked above
        let Some((l, r)) = uniq_2(selected.len(), rng) else {
            break;
        };
        push_children(&mut pop, size, &selected[l], &selected[r], rng);
    }
    pop
}

/// Perturb every weight of `genome`, by chance of [EvolutionEvent::MutateWeight], with a delta
/// drawn from `[-degree, +degree]`.
pub fn mutate(genome: &mut Genome, degree: f64, rng: &mut (impl RngCore + Happens)) {
    let Ok(delta) = Uniform::new_inclusive(-degree, degree) else {
        warn!(degree, "unusable mutation degree, leaving genome as is");
        return;
    };
    for w in genome.weights_mut() {
        if rng.happens(EvolutionEvent::MutateWeight) {
            *w += delta.sample(rng);
        }
    }
}

/// Mutate members of a freshly combined population, by chance of
/// [EvolutionEvent::MutateGenome], except for the first two who are never touched.
pub fn mutate_except_elite(pop: &mut [Genome], degree: f64, rng: &mut (impl RngCore + Happens)) {
    for genome in pop.iter_mut().skip(RUNCATCH_ELITE_COUNT) {
        if rng.happens(EvolutionEvent::MutateGenome) {
            mutate(genome, degree, rng);
        }
    }
}

/// Uniformly permute a population, so that its order carries nothing of fitness rank
pub fn reshuffle(pop: &mut [Genome], rng: &mut impl RngCore) {
    pop.shuffle(rng);
}
