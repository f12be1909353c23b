//! Centralized defaults for runcatch training runs.
//!
//! All configurable parameters are defined here with the `RUNCATCH_` prefix, and are the
//! defaults of [crate::config::GeneticConfig].

// ============================================================================
// Genome Parameters
// ============================================================================

/// Width of the uniform range new weights are drawn from, centered on 0
pub const RUNCATCH_INIT_RANGE: f64 = 1.0;

/// Delimiter between weights in a persisted genome record
pub const RUNCATCH_RECORD_DELIMITER: char = ';';

// ============================================================================
// Crossover Parameters
// ============================================================================

/// Probability of swapping a weight between the two children of a crossover
pub const RUNCATCH_CROSS_PROB: f64 = 0.6;

// ============================================================================
// Mutation Parameters
// ============================================================================

/// Probability of perturbing each weight of a mutating genome
pub const RUNCATCH_MUTATION_PROB: f64 = 0.2;

/// Perturbations are drawn uniformly from [-degree, +degree]
pub const RUNCATCH_MUTATION_DEGREE: f64 = 1.5;

/// Probability of a non-elite genome being subjected to mutation at all
pub const RUNCATCH_MUTATION_AMOUNT: f64 = 1.0;

// ============================================================================
// Population Parameters
// ============================================================================

/// Number of top genomes carried over and shielded from mutation
pub const RUNCATCH_ELITE_COUNT: usize = 2;

pub const RUNCATCH_RUNNERS: usize = 30;

pub const RUNCATCH_CATCHERS: usize = 30;

// ============================================================================
// Network Parameters
// ============================================================================

/// Pre-activation magnitude past which tanh saturates to exactly ±1
pub const RUNCATCH_SATURATION: f64 = 10.0;
