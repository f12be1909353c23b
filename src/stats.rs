use crate::{population::Role, Genome};
use serde::{Deserialize, Serialize};

/// Summary of one role's generation, taken once fitness is computed and the population sorted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub role: Role,
    pub size: usize,
    pub best_evaluation: f64,
    pub mean_evaluation: f64,
    pub best_fitness: f64,
    /// the mean evaluation couldn't normalize fitness, see [crate::population::compute_fitness]
    pub degenerate: bool,
}

impl GenerationStats {
    pub fn collect(generation: usize, role: Role, sorted: &[Genome], degenerate: bool) -> Self {
        let size = sorted.len();
        let mean_evaluation = if size == 0 {
            0.
        } else {
            sorted.iter().map(Genome::evaluation).sum::<f64>() / size as f64
        };
        Self {
            generation,
            role,
            size,
            best_evaluation: sorted
                .iter()
                .map(Genome::evaluation)
                .reduce(f64::max)
                .unwrap_or(0.),
            mean_evaluation,
            best_fitness: sorted.first().map_or(0., Genome::fitness),
            degenerate,
        }
    }
}
