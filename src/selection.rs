//! Fitness-proportionate ("roulette wheel") parent selection.
//!
//! Fitness in this crate is negative MSE, so it is never positive and raw
//! values cannot be used as probabilities directly: the total can be negative
//! and the *worst* genome would carry the most mass. Every fitness vector is
//! therefore mapped to strictly positive weights by a [`FitnessScaling`]
//! before it reaches the wheel.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Mapping from raw fitness to roulette weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FitnessScaling {
    /// `weight = fitness - min(fitness) + epsilon`.
    ///
    /// Keeps selection pressure proportional to the actual error gap. The
    /// worst genome keeps a weight of `epsilon`, so it is never excluded
    /// outright.
    MinShift { epsilon: f32 },
    /// `weight = rank + 1`, worst genome ranked 0. Tied genomes share the
    /// mean of their ranks.
    ///
    /// Insensitive to the scale of the error, which helps once the
    /// population has converged and fitness gaps become tiny.
    Rank,
}

impl Default for FitnessScaling {
    fn default() -> Self {
        FitnessScaling::MinShift { epsilon: 1e-6 }
    }
}

impl FitnessScaling {
    /// Strictly positive weights, one per fitness value, in the same order.
    ///
    /// NaN or infinite fitness receives the smallest weight the scheme can
    /// produce.
    pub fn weights(&self, fitnesses: &[f32]) -> Vec<f32> {
        match *self {
            FitnessScaling::MinShift { epsilon } => {
                let min = fitnesses
                    .iter()
                    .copied()
                    .filter(|f| f.is_finite())
                    .fold(f32::INFINITY, f32::min);
                fitnesses
                    .iter()
                    .map(|&f| {
                        if f.is_finite() {
                            (f - min) + epsilon
                        } else {
                            epsilon
                        }
                    })
                    .collect()
            }
            FitnessScaling::Rank => {
                let mut order: Vec<usize> = (0..fitnesses.len()).collect();
                order.sort_by(|&a, &b| cmp_f32_nan_last(fitnesses[a], fitnesses[b]));
                let mut weights = vec![0.0; fitnesses.len()];
                let mut start = 0;
                for tied in order.chunk_by(|&a, &b| {
                    cmp_f32_nan_last(fitnesses[a], fitnesses[b]) == Ordering::Equal
                }) {
                    // Mean of the 1-based ranks start+1 ..= start+len.
                    let shared = (2 * start + tied.len() + 1) as f32 / 2.0;
                    for &idx in tied {
                        weights[idx] = shared;
                    }
                    start += tied.len();
                }
                weights
            }
        }
    }
}

/// Compare two f32 values, treating NaN as less than all other values.
/// This ensures NaN fitness individuals sort to the worst end.
pub(crate) fn cmp_f32_nan_last(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Spins the wheel once over already-scaled `weights`.
///
/// Returns the first index whose cumulative probability reaches the uniform
/// draw in `[0, 1)`. Non-finite or non-positive weights count as zero; if no
/// usable mass remains the draw falls back to uniform. Returns `None` only
/// for an empty slice.
pub fn roulette_index<R: Rng>(weights: &[f32], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let usable = |w: f32| if w.is_finite() && w > 0.0 { w as f64 } else { 0.0 };
    let total: f64 = weights.iter().map(|&w| usable(w)).sum();
    if !(total > 0.0 && total.is_finite()) {
        log::debug!("roulette weights carry no mass, sampling uniformly");
        return Some(rng.random_range(0..weights.len()));
    }

    let draw: f64 = rng.random();
    let mut cumulative = 0.0;
    let mut last_usable = 0;
    for (i, &w) in weights.iter().enumerate() {
        let w = usable(w);
        if w == 0.0 {
            continue;
        }
        last_usable = i;
        cumulative += w / total;
        if cumulative >= draw {
            return Some(i);
        }
    }
    // Rounding left the cumulative sum a hair below the draw.
    Some(last_usable)
}

/// Picks one member of `population` with probability proportional to its
/// scaled fitness.
pub fn select<'a, G, R: Rng>(
    population: &'a [G],
    fitnesses: &[f32],
    scaling: FitnessScaling,
    rng: &mut R,
) -> Option<&'a G> {
    debug_assert_eq!(population.len(), fitnesses.len());
    let weights = scaling.weights(fitnesses);
    roulette_index(&weights, rng).and_then(|i| population.get(i))
}
