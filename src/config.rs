//! Run configuration.
//!
//! An [`EvolutionConfig`] is built once, validated, and then handed to the
//! driver by value. Nothing in the crate mutates it afterwards.

use crate::error::ConfigError;
use crate::selection::FitnessScaling;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of genomes alive in every generation.
    pub population_size: usize,
    /// Triangles per genome.
    pub num_triangles: usize,
    /// Per-gene mutation probability, in `(0, 1]`.
    pub mutation_rate: f32,
    /// Gaussian standard deviation in normalized gene units.
    ///
    /// Vertex noise is multiplied by the canvas width or height, color noise
    /// is used as-is.
    pub mutation_scale: f32,
    /// Upper bound on generations for a run.
    pub num_generations: usize,
    /// Seed for the master `Pcg64`.
    pub seed: u64,
    /// How negative fitness is mapped onto roulette weights.
    pub fitness_scaling: FitnessScaling,
    /// Stop early once the best fitness reaches this value (fitness is `<= 0`).
    pub target_fitness: Option<f32>,
    /// Stop early after this many generations without a new best.
    pub stagnation_limit: Option<usize>,
    /// Wall-clock budget, checked between generations.
    pub time_limit: Option<Duration>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            num_triangles: 50,
            mutation_rate: 0.1,
            mutation_scale: 0.05,
            num_generations: 500,
            seed: 42,
            fitness_scaling: FitnessScaling::default(),
            target_fitness: None,
            stagnation_limit: None,
            time_limit: None,
        }
    }
}

impl EvolutionConfig {
    /// Checks every field, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "population_size",
            });
        }
        if self.num_triangles == 0 {
            return Err(ConfigError::NonPositive {
                field: "num_triangles",
            });
        }
        if self.num_generations == 0 {
            return Err(ConfigError::NonPositive {
                field: "num_generations",
            });
        }
        // Written so that NaN fails the check.
        if !(self.mutation_rate > 0.0 && self.mutation_rate <= 1.0) {
            return Err(ConfigError::RateOutOfRange(self.mutation_rate));
        }
        if !(self.mutation_scale > 0.0 && self.mutation_scale.is_finite()) {
            return Err(ConfigError::InvalidScale(self.mutation_scale));
        }
        if let FitnessScaling::MinShift { epsilon } = self.fitness_scaling {
            if !(epsilon > 0.0 && epsilon.is_finite()) {
                return Err(ConfigError::InvalidEpsilon(epsilon));
            }
        }
        if let Some(target) = self.target_fitness {
            if !target.is_finite() {
                return Err(ConfigError::InvalidTarget(target));
            }
        }
        if self.stagnation_limit == Some(0) {
            return Err(ConfigError::NonPositive {
                field: "stagnation_limit",
            });
        }
        Ok(())
    }

    /// Number of offspring pairs bred per generation.
    ///
    /// Odd population sizes round up; the surplus child is dropped.
    pub fn pairs_per_generation(&self) -> usize {
        self.population_size.div_ceil(2)
    }
}
