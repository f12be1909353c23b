//! The trainable individual: a flat weight vector plus its fitness bookkeeping.
//!
//! A genome knows nothing about the network it is decoded into, only the length of its weight
//! vector. See [crate::network::Structure::weight_count] for the contract between the two.

use crate::{
    constants::RUNCATCH_RECORD_DELIMITER,
    error::{Error, Result},
};
use core::{fmt, str::FromStr};
use rand::RngCore;
use rand_distr::{Distribution, Uniform};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    weights: Vec<f64>,
    /// raw score from the last round this genome played
    evaluation: f64,
    /// evaluation normalized by the population mean
    fitness: f64,
}

impl Genome {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            evaluation: 0.,
            fitness: 0.,
        }
    }

    /// A genome of `len` weights drawn uniformly from `[-range/2, +range/2]`
    pub fn random(len: usize, range: f64, rng: &mut impl RngCore) -> Result<Self> {
        let mut genome = Self::new(vec![0.; len]);
        genome.randomize(range, rng)?;
        Ok(genome)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn evaluation(&self) -> f64 {
        self.evaluation
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_evaluation(&mut self, score: f64) {
        self.evaluation = score;
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Start of a new life: forget the last round's scores
    pub fn reset(&mut self) {
        self.evaluation = 0.;
        self.fitness = 0.;
    }

    pub fn set_weight(&mut self, index: usize, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "weight {index} must be finite, got {value}"
            )));
        }

        let len = self.len();
        let weight = self
            .weights
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *weight = value;
        Ok(())
    }

    /// Overwrite every weight with an independent draw from `[-range/2, +range/2]`.
    /// Nothing is touched when `range` is rejected.
    pub fn randomize(&mut self, range: f64, rng: &mut impl RngCore) -> Result<()> {
        if !(range.is_finite() && range > 0.) {
            return Err(Error::InvalidArgument(format!(
                "randomize range must be positive, got {range}"
            )));
        }

        let dist = Uniform::new_inclusive(-range / 2., range / 2.)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;
        for w in self.weights.iter_mut() {
            *w = dist.sample(rng);
        }
        Ok(())
    }

    /// An owned copy of the weights, detached from this genome
    pub fn export_vector(&self) -> Vec<f64> {
        self.weights.clone()
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }
}

/// The persisted record: weights in shortest round-trip decimal form joined by `;`
impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut weights = self.weights.iter();
        if let Some(first) = weights.next() {
            write!(f, "{first}")?;
        }
        for w in weights {
            write!(f, "{RUNCATCH_RECORD_DELIMITER}{w}")?;
        }
        Ok(())
    }
}

impl FromStr for Genome {
    type Err = Error;

    fn from_str(record: &str) -> Result<Self> {
        let record = record.trim();
        if record.is_empty() {
            return Ok(Self::new(vec![]));
        }

        record
            .split(RUNCATCH_RECORD_DELIMITER)
            .enumerate()
            .map(|(position, token)| {
                token
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|w| w.is_finite())
                    .ok_or_else(|| Error::Format {
                        position,
                        token: token.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}
