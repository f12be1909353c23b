use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Layer sizes of a fully connected feedforward network, input layer first and output layer
/// last. Every layer but the output one is implicitly extended by a bias unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Structure(Vec<usize>);

impl Structure {
    pub fn new(layers: Vec<usize>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::InvalidStructure(format!(
                "need at least an input and an output layer, got {} layer(s)",
                layers.len()
            )));
        }
        if let Some(idx) = layers.iter().position(|n| *n == 0) {
            return Err(Error::InvalidStructure(format!("layer {idx} is empty")));
        }
        Ok(Self(layers))
    }

    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn inputs(&self) -> usize {
        self.0[0]
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    #[inline]
    pub fn is_output(&self, layer: usize) -> bool {
        layer + 1 == self.0.len()
    }

    /// Units in `layer`, its bias unit included
    pub fn layer_len(&self, layer: usize) -> usize {
        if self.is_output(layer) {
            self.0[layer]
        } else {
            self.0[layer] + 1
        }
    }

    /// Incoming connections of every unit in `layer`: one per unit of the previous layer,
    /// its bias unit included. Input units have none.
    pub fn fan_in(&self, layer: usize) -> usize {
        if layer == 0 {
            0
        } else {
            self.0[layer - 1] + 1
        }
    }

    /// Length of the weight vector a genome must carry to be decoded against this structure.
    /// Bias units of hidden layers own incoming weights too, even though they never read them.
    pub fn weight_count(&self) -> usize {
        (1..self.depth())
            .map(|layer| self.layer_len(layer) * self.fan_in(layer))
            .sum()
    }
}

impl TryFrom<Vec<usize>> for Structure {
    type Error = Error;

    fn try_from(layers: Vec<usize>) -> Result<Self> {
        Self::new(layers)
    }
}

impl From<Structure> for Vec<usize> {
    fn from(structure: Structure) -> Self {
        structure.0
    }
}

/// Weight count of a raw layer list, validating it on the way
pub fn required_weight_count(layers: &[usize]) -> Result<usize> {
    Structure::new(layers.to_vec()).map(|s| s.weight_count())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_weight_count() {
        assert_eq!(3, required_weight_count(&[2, 1]).unwrap());
        // (3 + 1) * 3 + 1 * 4
        assert_eq!(16, required_weight_count(&[2, 3, 1]).unwrap());
        // (8 + 1) * 6 + 2 * 9
        assert_eq!(72, required_weight_count(&[5, 8, 2]).unwrap());
        assert_eq!(
            required_weight_count(&[4, 4, 4, 4]).unwrap(),
            required_weight_count(&[4, 4, 4, 4]).unwrap()
        );
    }

    #[test]
    fn test_layer_lens() {
        let s = Structure::new(vec![2, 3, 1]).unwrap();
        assert_eq!(vec![3, 4, 1], (0..3).map(|l| s.layer_len(l)).collect::<Vec<_>>());
        assert_eq!(vec![0, 3, 4], (0..3).map(|l| s.fan_in(l)).collect::<Vec<_>>());
        assert_eq!((2, 1), (s.inputs(), s.outputs()));
    }

    #[test]
    fn test_invalid() {
        for layers in [vec![], vec![3], vec![2, 0, 1], vec![0, 1]] {
            assert!(matches!(
                Structure::new(layers.clone()),
                Err(Error::InvalidStructure(_))
            ), "{layers:?}");
        }
    }

    #[test]
    fn test_serde() {
        let s: Structure = serde_json::from_str("[3, 4, 2]").unwrap();
        assert_eq!(&[3, 4, 2], s.layers());
        assert_eq!("[3,4,2]", serde_json::to_string(&s).unwrap());
        assert!(serde_json::from_str::<Structure>("[3]").is_err());
    }
}
