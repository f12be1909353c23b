pub mod brain;
pub mod config;
pub mod constants;
pub mod crossover;
pub mod error;
pub mod genome;
mod macros;
pub mod network;
pub mod population;
pub mod random;
pub mod reproduce;
pub mod scenario;
pub mod stats;
pub mod store;
pub mod strategy;

pub use brain::Brain;
pub use config::GeneticConfig;
pub use error::{Error, Result};
pub use genome::Genome;
pub use network::{activate, FeedForward, Network, Structure, ToNetwork};
pub use population::{GenomeSource, Population, Role};
pub use random::{Happens, Probabilities, WyRng};
pub use scenario::{Arena, EvolutionTarget, GeneticAlgorithm, Hook, Phase, Round};
pub use stats::GenerationStats;
pub use store::{Archive, DirSource};
pub use strategy::{Strategy, StrategyKind};
