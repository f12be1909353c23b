//! Uniform crossover between two equally sized genomes.

use crate::{
    random::{EvolutionEvent, Happens},
    Genome,
};
use rand::{Rng, RngCore};

/// Cross `l` and `r` into two children. At every weight index the children either swap their
/// parents' values, by chance of [EvolutionEvent::CrossSwap], or each inherit their own parent's.
/// The first child descends from `l`, the second from `r`.
pub fn crossover(l: &Genome, r: &Genome, rng: &mut (impl RngCore + Happens)) -> (Genome, Genome) {
    debug_assert_eq!(l.len(), r.len(), "crossing genomes of different lengths");

    let (mut l_child, mut r_child) = (l.export_vector(), r.export_vector());
    for (lw, rw) in l_child.iter_mut().zip(r_child.iter_mut()) {
        if rng.happens(EvolutionEvent::CrossSwap) {
            core::mem::swap(lw, rw);
        }
    }
    (Genome::new(l_child), Genome::new(r_child))
}

/// Two distinct indices into a pool of `len`, uniformly among all ordered pairs
#[inline]
pub fn uniq_2(len: usize, rng: &mut impl RngCore) -> Option<(usize, usize)> {
    if len < 2 {
        None
    } else {
        let l = rng.random_range(0..len);
        let r = rng.random_range(0..len - 1);
        Some((l, if r >= l { r + 1 } else { r }))
    }
}
