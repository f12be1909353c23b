//! The evaluator's view of one genome during a round.

use crate::{
    error::Result,
    network::{FeedForward, Network, Structure, ToNetwork},
    population::Role,
    Genome,
};

/// A genome decoded into a network, playing out a single life. A brain is alive until it
/// [dies](Brain::die) with its final score.
#[derive(Debug, Clone)]
pub struct Brain {
    role: Role,
    index: usize,
    network: FeedForward,
    alive: bool,
    score: f64,
}

impl Brain {
    /// Decode slot `index` of `role`. Fails when the genome doesn't fit `structure`.
    pub fn new(role: Role, index: usize, genome: &Genome, structure: &Structure) -> Result<Self> {
        Ok(Self {
            role,
            index,
            network: genome.network(structure)?,
            alive: true,
            score: 0.,
        })
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Map sensory input to control output
    pub fn think(&mut self, input: &[f64]) -> Result<&[f64]> {
        self.network.step(input)?;
        Ok(self.network.output())
    }

    /// Stop participating in the round. Only the first death counts.
    pub fn die(&mut self, score: f64) {
        if self.alive {
            self.alive = false;
            self.score = score;
        }
    }
}
