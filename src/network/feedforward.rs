use super::{activate::tanh_clamped, FromGenome, Network, Structure};
use crate::{
    error::{Error, Result},
    Genome,
};
use core::ops::Range;

#[derive(Debug, Clone)]
struct Unit {
    /// this unit's incoming weights inside [FeedForward::weights]
    weights: Range<usize>,
    input: bool,
    bias: bool,
}

/// A borrowed view of one unit of a [FeedForward]
#[derive(Debug, Clone, Copy)]
pub struct UnitRef<'a> {
    pub value: f64,
    pub weights: &'a [f64],
    pub input: bool,
    pub bias: bool,
}

/// A layered, fully connected feedforward network. Units live in one arena laid out layer after
/// layer, addressed through a per-layer offset table; a layer's bias unit is its last unit.
#[derive(Debug, Clone)]
pub struct FeedForward {
    structure: Structure,
    /// first arena index of every layer
    offsets: Vec<usize>,
    units: Vec<Unit>,
    /// last computed value of every unit, parallel to `units`
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl FeedForward {
    /// Build a network from a flat weight vector, consumed layer by layer, unit by unit, each
    /// unit's incoming weights ordered as the previous layer with its bias last.
    pub fn decode(structure: &Structure, weights: &[f64]) -> Result<Self> {
        let expected = structure.weight_count();
        if weights.len() != expected {
            return Err(Error::ShapeMismatch {
                what: "weights",
                expected,
                actual: weights.len(),
            });
        }

        let mut offsets = Vec::with_capacity(structure.depth());
        let mut units = Vec::new();
        let mut head = 0;
        for layer in 0..structure.depth() {
            offsets.push(units.len());
            let len = structure.layer_len(layer);
            let fan_in = structure.fan_in(layer);
            for idx in 0..len {
                units.push(Unit {
                    weights: head..head + fan_in,
                    input: layer == 0,
                    bias: !structure.is_output(layer) && idx + 1 == len,
                });
                head += fan_in;
            }
        }
        debug_assert_eq!(head, expected);

        Ok(Self {
            structure: structure.clone(),
            offsets,
            values: vec![1.; units.len()],
            units,
            weights: weights.to_vec(),
        })
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// The unit at `(layer, idx)`, bias units included
    pub fn unit(&self, layer: usize, idx: usize) -> Option<UnitRef<'_>> {
        if layer >= self.structure.depth() || idx >= self.structure.layer_len(layer) {
            return None;
        }
        let at = self.offsets[layer] + idx;
        let unit = &self.units[at];
        Some(UnitRef {
            value: self.values[at],
            weights: &self.weights[unit.weights.clone()],
            input: unit.input,
            bias: unit.bias,
        })
    }

    fn layer(&self, layer: usize) -> Range<usize> {
        let start = self.offsets[layer];
        start..start + self.structure.layer_len(layer)
    }
}

impl Network for FeedForward {
    fn step(&mut self, input: &[f64]) -> Result<()> {
        let sensory = self.structure.inputs();
        if input.len() != sensory {
            return Err(Error::ShapeMismatch {
                what: "inputs",
                expected: sensory,
                actual: input.len(),
            });
        }
        self.values[..sensory].copy_from_slice(input);

        for layer in 1..self.structure.depth() {
            let prev = self.layer(layer - 1);
            let current = self.layer(layer);
            // layers are contiguous, so everything before `current` ends with `prev`
            let (before, after) = self.values.split_at_mut(current.start);
            let prev_values = &before[prev];
            for (unit, value) in self.units[current].iter().zip(after.iter_mut()) {
                if unit.input || unit.bias {
                    continue;
                }
                let sum = self.weights[unit.weights.clone()]
                    .iter()
                    .zip(prev_values)
                    .map(|(w, v)| w * v)
                    .sum::<f64>();
                *value = tanh_clamped(sum);
            }
        }
        Ok(())
    }

    fn output(&self) -> &[f64] {
        &self.values[self.layer(self.structure.depth() - 1)]
    }
}

impl FromGenome for FeedForward {
    fn from_genome(structure: &Structure, genome: &Genome) -> Result<Self> {
        Self::decode(structure, genome.weights())
    }
}
