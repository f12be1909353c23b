//! The interchangeable selection/combination pairs a run can be configured with.

use crate::{
    population::{select_elitist, select_proportional},
    random::Happens,
    reproduce::{combine_elitist, combine_random},
    Genome,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub trait Strategy {
    /// Pick the parents of the next generation from a population sorted best first
    fn select(&self, sorted: &[Genome], target: usize, rng: &mut (impl RngCore + Happens))
        -> Vec<Genome>;

    /// Refill a population of `target` genomes from the selected parents
    fn combine(
        &self,
        selected: Vec<Genome>,
        target: usize,
        rng: &mut (impl RngCore + Happens),
    ) -> Vec<Genome>;
}

/// Only ever breed the two best
#[derive(Debug, Default, Clone, Copy)]
pub struct Elitist;

impl Strategy for Elitist {
    fn select(&self, sorted: &[Genome], _: usize, _: &mut (impl RngCore + Happens)) -> Vec<Genome> {
        select_elitist(sorted)
    }

    fn combine(
        &self,
        selected: Vec<Genome>,
        target: usize,
        rng: &mut (impl RngCore + Happens),
    ) -> Vec<Genome> {
        combine_elitist(selected, target, rng)
    }
}

/// Anyone may become a parent, with chances growing with fitness
#[derive(Debug, Default, Clone, Copy)]
pub struct Proportional;

impl Strategy for Proportional {
    fn select(
        &self,
        sorted: &[Genome],
        target: usize,
        rng: &mut (impl RngCore + Happens),
    ) -> Vec<Genome> {
        select_proportional(sorted, target, rng)
    }

    fn combine(
        &self,
        selected: Vec<Genome>,
        target: usize,
        rng: &mut (impl RngCore + Happens),
    ) -> Vec<Genome> {
        combine_random(selected, target, rng)
    }
}

/// A [Strategy] picked by configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Elitist,
    #[default]
    Proportional,
}

impl Strategy for StrategyKind {
    fn select(
        &self,
        sorted: &[Genome],
        target: usize,
        rng: &mut (impl RngCore + Happens),
    ) -> Vec<Genome> {
        match self {
            Self::Elitist => Elitist.select(sorted, target, rng),
            Self::Proportional => Proportional.select(sorted, target, rng),
        }
    }

    fn combine(
        &self,
        selected: Vec<Genome>,
        target: usize,
        rng: &mut (impl RngCore + Happens),
    ) -> Vec<Genome> {
        match self {
            Self::Elitist => Elitist.combine(selected, target, rng),
            Self::Proportional => Proportional.combine(selected, target, rng),
        }
    }
}
