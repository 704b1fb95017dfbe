//! Evolutionary image approximation with alpha-blended triangles.
//!
//! A target picture is approximated by a fixed number of translucent
//! triangles. Candidate triangle sets ([`Genome`]s) are rendered in software,
//! scored by pixel error, and bred with roulette selection, single-point
//! crossover and Gaussian mutation.
//!
//! # Example
//!
//! ```rust
//! use symbios_mosaic::{Canvas, EvolutionConfig, approximate};
//!
//! let target = Canvas::filled(16, 12, [0.2, 0.4, 0.6]);
//! let config = EvolutionConfig {
//!     population_size: 8,
//!     num_triangles: 4,
//!     num_generations: 3,
//!     ..EvolutionConfig::default()
//! };
//!
//! let outcome = approximate(&target, config).unwrap();
//! assert!(outcome.best.fitness <= 0.0);
//! assert_eq!(outcome.best.genotype.num_triangles(), 4);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod canvas;
pub mod config;
pub mod crossover;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod io;
pub mod mutation;
pub mod population;
pub mod render;
pub mod selection;

pub mod algorithms {
    pub mod generational;
}

pub use algorithms::generational::{EvolutionDriver, GenerationStats, Phase, RunOutcome, StopReason};
pub use canvas::Canvas;
pub use config::EvolutionConfig;
pub use error::{Error, Result};
pub use fitness::ImageEvaluator;
pub use genome::{Genome, Triangle};
pub use selection::FitnessScaling;

/// The 'DNA' of an individual.
/// Defined by how it changes, not what it does.
///
/// Both operators are pure: they return new genotypes and never touch
/// `self`, so a parent can be selected any number of times in a generation.
pub trait Genotype: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync {
    fn mutate<R: Rng>(&self, rng: &mut R, rate: f32, scale: f32) -> Self;
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> (Self, Self);
}

/// A genotype together with its most recent score.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "G: Genotype")]
pub struct Phenotype<G: Genotype> {
    pub genotype: G,
    /// Higher is better. NaN until evaluated.
    pub fitness: f32,
}

impl<G: Genotype> Phenotype<G> {
    pub fn unevaluated(genotype: G) -> Self {
        Self {
            genotype,
            fitness: f32::NAN,
        }
    }
}

/// A trait for systems that can turn DNA into a score.
///
/// Must be shareable across threads: evaluation runs as a parallel map.
pub trait Evaluator<G: Genotype>: Send + Sync {
    fn evaluate(&self, genotype: &G) -> Result<f32>;
}

/// The master engine trait.
pub trait Evolver<G: Genotype> {
    fn step<E: Evaluator<G>>(&mut self, evaluator: &E) -> Result<GenerationStats>;
    fn population(&self) -> &[Phenotype<G>];
}

/// Runs a complete evolution against `target` and returns the best genome.
pub fn approximate(target: &Canvas, config: EvolutionConfig) -> Result<RunOutcome<Genome>> {
    let evaluator = ImageEvaluator::new(target.clone())?;
    let mut driver = EvolutionDriver::for_target(config, target)?;
    driver.run(&evaluator)
}
