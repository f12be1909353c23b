//! Fixed-topology networks decoded from a [Genome]'s flat weight vector in order to express its
//! behaviour. Topology never evolves; only the weights do.

pub mod feedforward;
pub mod structure;

pub use feedforward::FeedForward;
pub use structure::Structure;

use crate::{error::Result, Genome};

pub mod activate {
    use crate::constants::RUNCATCH_SATURATION;

    /// tanh, pinned to exactly ±1 once the input is past ±10
    pub fn tanh_clamped(x: f64) -> f64 {
        if x > RUNCATCH_SATURATION {
            1.
        } else if x < -RUNCATCH_SATURATION {
            -1.
        } else {
            x.tanh()
        }
    }
}

/// The trait for all networks. Right now, only f64 values are used.
pub trait Network {
    /// Propagate some sensory input through the network. Input must be sized to fit the
    /// network's input layer.
    fn step(&mut self, input: &[f64]) -> Result<()>;

    /// The network's most recent output
    fn output(&self) -> &[f64];

    fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.step(input)?;
        Ok(self.output().to_vec())
    }
}

/// For some [Genome] and a topology, a network may construct itself from it.
pub trait FromGenome: Network + Sized {
    fn from_genome(structure: &Structure, genome: &Genome) -> Result<Self>;
}

/// The inverse of [FromGenome], implemented for [Genome] by every network who knows how to
/// construct itself from one.
pub trait ToNetwork<NN: Network> {
    fn network(&self, structure: &Structure) -> Result<NN>;
}

impl<NN: FromGenome> ToNetwork<NN> for Genome {
    fn network(&self, structure: &Structure) -> Result<NN> {
        NN::from_genome(structure, self)
    }
}

#[cfg(test)]
mod test {
    use super::activate::tanh_clamped;
    use super::*;

    #[test]
    fn test_tanh_clamped() {
        assert_eq!(1., tanh_clamped(10.000_001));
        assert_eq!(1., tanh_clamped(1e300));
        assert_eq!(1., tanh_clamped(f64::INFINITY));
        assert_eq!(-1., tanh_clamped(-10.000_001));
        assert_eq!(-1., tanh_clamped(f64::NEG_INFINITY));
        assert_eq!(0., tanh_clamped(0.));
        assert_eq!(0.5f64.tanh(), tanh_clamped(0.5));
        assert_eq!(10f64.tanh(), tanh_clamped(10.));
    }

    #[test]
    fn test_to_network() {
        let structure = Structure::new(vec![1, 1]).unwrap();
        let genome = Genome::new(vec![0., 0.]);
        let mut nn: FeedForward = genome.network(&structure).unwrap();
        assert_eq!(vec![0.], nn.forward(&[3.]).unwrap());

        let short = Genome::new(vec![0.]);
        assert!(ToNetwork::<FeedForward>::network(&short, &structure).is_err());
    }
}
