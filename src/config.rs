//! Run configuration, handed explicitly to the engine rather than read from ambient state.

use crate::{
    constants::*,
    error::{Error, Result},
    network::Structure,
    strategy::StrategyKind,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// population size of the runners
    pub runners: usize,
    /// population size of the catchers
    pub catchers: usize,
    /// network topology shared by both roles
    pub structure: Vec<usize>,
    pub strategy: StrategyKind,
    /// how many leading slots of each role may be loaded from `load_dir`
    pub load_count: usize,
    pub load_dir: Option<PathBuf>,
    /// how many of the best genomes of each role are saved every generation
    pub save_count: usize,
    pub save_dir: Option<PathBuf>,
    /// generations to run, 0 for no limit
    pub generations: usize,
    pub seed: Option<u64>,
    pub init_range: f64,
    pub cross_prob: f64,
    pub mutation_prob: f64,
    pub mutation_degree: f64,
    pub mutation_amount: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            runners: RUNCATCH_RUNNERS,
            catchers: RUNCATCH_CATCHERS,
            structure: vec![5, 8, 2],
            strategy: StrategyKind::default(),
            load_count: 0,
            load_dir: None,
            save_count: 0,
            save_dir: None,
            generations: 50,
            seed: None,
            init_range: RUNCATCH_INIT_RANGE,
            cross_prob: RUNCATCH_CROSS_PROB,
            mutation_prob: RUNCATCH_MUTATION_PROB,
            mutation_degree: RUNCATCH_MUTATION_DEGREE,
            mutation_amount: RUNCATCH_MUTATION_AMOUNT,
        }
    }
}

impl GeneticConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn structure(&self) -> Result<Structure> {
        Structure::new(self.structure.clone())
    }

    pub fn validate(&self) -> Result<()> {
        self.structure()?;

        if !(self.init_range.is_finite() && self.init_range > 0.) {
            return Err(Error::Config(format!(
                "init_range must be positive, got {}",
                self.init_range
            )));
        }
        if !(self.mutation_degree.is_finite() && self.mutation_degree >= 0.) {
            return Err(Error::Config(format!(
                "mutation_degree must be non-negative, got {}",
                self.mutation_degree
            )));
        }
        for (name, p) in [
            ("cross_prob", self.cross_prob),
            ("mutation_prob", self.mutation_prob),
            ("mutation_amount", self.mutation_amount),
        ] {
            if !(0. ..=1.).contains(&p) {
                return Err(Error::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneticConfig::default();
        config.validate().unwrap();
        assert_eq!(1.0, config.init_range);
        assert_eq!(0.6, config.cross_prob);
        assert_eq!(0.2, config.mutation_prob);
        assert_eq!(1.5, config.mutation_degree);
        assert_eq!(1.0, config.mutation_amount);
        assert_eq!(StrategyKind::Proportional, config.strategy);
    }

    #[test]
    fn test_partial_json() {
        let config: GeneticConfig =
            serde_json::from_str(r#"{"runners": 4, "strategy": "elitist", "structure": [3, 2]}"#)
                .unwrap();
        assert_eq!(4, config.runners);
        assert_eq!(RUNCATCH_CATCHERS, config.catchers);
        assert_eq!(StrategyKind::Elitist, config.strategy);
        assert_eq!(8, config.structure().unwrap().weight_count());
    }

    #[test]
    fn test_validate() {
        let bad = [
            GeneticConfig {
                init_range: 0.,
                ..Default::default()
            },
            GeneticConfig {
                cross_prob: 1.5,
                ..Default::default()
            },
            GeneticConfig {
                mutation_amount: f64::NAN,
                ..Default::default()
            },
            GeneticConfig {
                mutation_degree: -1.,
                ..Default::default()
            },
            GeneticConfig {
                structure: vec![4],
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("runcatch-config-{}.json", std::process::id()));
        let config = GeneticConfig {
            seed: Some(9),
            save_dir: Some(PathBuf::from("runs")),
            ..Default::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(config, GeneticConfig::from_file(&path).unwrap());
        std::fs::remove_file(path).unwrap();
    }
}
