//! Generational GA driver.
//!
//! Each generation is evaluated in full, then replaced in full by offspring
//! bred from it: roulette selection on scaled fitness, crossover, mutation of
//! both children. There is no elitism, so the best genome of one generation
//! is not guaranteed to survive into the next.
//!
//! # Determinism
//!
//! All randomness flows from a single seeded [`Pcg64`]. Initialization draws
//! from it directly. Reproduction draws one sub-seed per offspring pair from
//! it, in order, and each pair breeds with its own generator. A run is
//! therefore reproducible from `config.seed` alone, with or without the
//! `parallel` feature.

use crate::canvas::Canvas;
use crate::config::EvolutionConfig;
use crate::error::{ComputationError, Error, InputError, Result};
use crate::fitness::psnr;
use crate::genome::Genome;
use crate::population::Population;
use crate::selection::{cmp_f32_nan_last, roulette_index};
use crate::{Evaluator, Evolver, Genotype, Phenotype};
use rand::Rng;
use rand::prelude::SeedableRng;
use rand_pcg::Pcg64;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Where the driver is in its generation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Building the initial population inside [`EvolutionDriver::new`].
    Initializing,
    Evaluating,
    Reproducing,
    Finished,
}

/// Why [`EvolutionDriver::run`] stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// `num_generations` reproduction cycles completed.
    GenerationLimit,
    /// Best fitness reached `target_fitness`.
    TargetReached,
    /// Best fitness did not improve for `stagnation_limit` generations.
    Stagnation,
    /// `time_limit` elapsed.
    Deadline,
}

/// Fitness summary of one evaluated generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f32,
    pub mean: f32,
    pub worst: f32,
}

impl GenerationStats {
    fn from_fitnesses(generation: usize, fitnesses: &[f32]) -> Self {
        let best = fitnesses
            .iter()
            .copied()
            .max_by(|a, b| cmp_f32_nan_last(*a, *b))
            .unwrap_or(f32::NAN);
        let worst = fitnesses
            .iter()
            .copied()
            .min_by(|a, b| cmp_f32_nan_last(*a, *b))
            .unwrap_or(f32::NAN);
        let mean = if fitnesses.is_empty() {
            f32::NAN
        } else {
            (fitnesses.iter().map(|&f| f as f64).sum::<f64>() / fitnesses.len() as f64) as f32
        };
        Self {
            generation,
            best,
            mean,
            worst,
        }
    }

    /// PSNR of the best genome, assuming fitness is negative MSE.
    pub fn best_psnr(&self) -> f64 {
        psnr(-(self.best as f64))
    }
}

/// Result of a complete run.
#[derive(Clone, Debug)]
pub struct RunOutcome<G: Genotype> {
    /// Fittest member of the final population.
    pub best: Phenotype<G>,
    /// Reproduction cycles performed.
    pub generations: usize,
    pub stop_reason: StopReason,
    /// One entry per evaluated generation, including the final one.
    pub history: Vec<GenerationStats>,
}

/// Owns the population and drives it through
/// `Initializing -> (Evaluating -> Reproducing)* -> Finished`.
pub struct EvolutionDriver<G: Genotype> {
    config: EvolutionConfig,
    population: Population<G>,
    phase: Phase,
    generation: usize,
    rng: Pcg64,
}

impl<G: Genotype> EvolutionDriver<G> {
    /// Validates `config` and builds the initial population with `factory`.
    ///
    /// `factory` is called `population_size` times with the master RNG.
    pub fn new<F>(config: EvolutionConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut(&mut Pcg64) -> G,
    {
        config.validate()?;
        let mut rng = Pcg64::seed_from_u64(config.seed);

        let genomes: Vec<G> = (0..config.population_size)
            .map(|_| factory(&mut rng))
            .collect();
        let population = Population::new(genomes);
        log::debug!("initialized population of {} genomes", population.len());

        Ok(Self {
            config,
            population,
            phase: Phase::Evaluating,
            generation: 0,
            rng,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed reproduction cycles.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best member of the current population, if it has been evaluated.
    pub fn best(&self) -> Option<&Phenotype<G>> {
        self.population.best()
    }

    /// Runs until `num_generations` is reached or a stopping rule fires,
    /// then returns the fittest member of the final population.
    ///
    /// Any evaluator error aborts the run and is returned unchanged.
    pub fn run<E: Evaluator<G>>(&mut self, evaluator: &E) -> Result<RunOutcome<G>> {
        if self.phase == Phase::Finished {
            return Err(Error::Finished);
        }

        let started = Instant::now();
        let limit = self.config.num_generations;
        log::info!(
            "evolving {} genomes for up to {} generations (seed {})",
            self.population.len(),
            limit,
            self.config.seed
        );

        let mut history = Vec::with_capacity(limit.saturating_sub(self.generation) + 1);
        let mut best_so_far = f32::NEG_INFINITY;
        let mut stale = 0usize;

        let stop_reason = loop {
            let fitnesses = self.evaluate(evaluator)?;
            let stats = GenerationStats::from_fitnesses(self.generation, &fitnesses);
            log_generation(&stats);
            history.push(stats);

            if stats.best > best_so_far {
                best_so_far = stats.best;
                stale = 0;
            } else {
                stale += 1;
            }

            if self.generation >= limit {
                break StopReason::GenerationLimit;
            }
            if let Some(target) = self.config.target_fitness {
                if stats.best >= target {
                    break StopReason::TargetReached;
                }
            }
            if let Some(patience) = self.config.stagnation_limit {
                if stale >= patience {
                    break StopReason::Stagnation;
                }
            }
            if let Some(budget) = self.config.time_limit {
                if started.elapsed() >= budget {
                    break StopReason::Deadline;
                }
            }

            let offspring = self.reproduce(&fitnesses);
            self.population.replace(offspring);
            self.generation += 1;
        };

        let best = self.finish()?;
        log::info!(
            "finished after {} generations ({:?}) in {:.2?}: best fitness {:.6} ({:.2} dB)",
            self.generation,
            stop_reason,
            started.elapsed(),
            best.fitness,
            psnr(-(best.fitness as f64))
        );

        Ok(RunOutcome {
            best,
            generations: self.generation,
            stop_reason,
            history,
        })
    }

    fn evaluate<E: Evaluator<G>>(&mut self, evaluator: &E) -> Result<Vec<f32>> {
        self.phase = Phase::Evaluating;
        self.population.evaluate(evaluator)?;
        Ok(self.population.fitnesses().unwrap_or_default())
    }

    /// Breeds exactly `population_size` offspring from the current,
    /// already-scored population.
    fn reproduce(&mut self, fitnesses: &[f32]) -> Vec<G> {
        self.phase = Phase::Reproducing;

        let weights = self.config.fitness_scaling.weights(fitnesses);
        let seeds: Vec<u64> = (0..self.config.pairs_per_generation())
            .map(|_| self.rng.random())
            .collect();
        let members = self.population.members();
        let rate = self.config.mutation_rate;
        let scale = self.config.mutation_scale;

        // Parents are drawn with replacement; both may be the same genome.
        let breed = |seed: u64| -> [G; 2] {
            let mut rng = Pcg64::seed_from_u64(seed);
            let a = roulette_index(&weights, &mut rng).unwrap_or(0);
            let b = roulette_index(&weights, &mut rng).unwrap_or(0);
            let (c1, c2) = members[a]
                .genotype
                .crossover(&members[b].genotype, &mut rng);
            [
                c1.mutate(&mut rng, rate, scale),
                c2.mutate(&mut rng, rate, scale),
            ]
        };

        #[cfg(feature = "parallel")]
        let mut offspring: Vec<G> = seeds.into_par_iter().flat_map_iter(breed).collect();
        #[cfg(not(feature = "parallel"))]
        let mut offspring: Vec<G> = seeds.into_iter().flat_map(breed).collect();

        // Odd sizes: the last pair's second child is dropped.
        offspring.truncate(self.config.population_size);
        offspring
    }

    /// Only called right after an evaluation, and `validate()` rules out an
    /// empty population, so the error arm is not expected to fire.
    fn finish(&mut self) -> Result<Phenotype<G>> {
        self.phase = Phase::Finished;
        self.population
            .best()
            .cloned()
            .ok_or_else(|| ComputationError::EmptyPopulation.into())
    }
}

impl EvolutionDriver<Genome> {
    /// Driver seeded with uniformly random triangle genomes sized to `target`.
    pub fn for_target(config: EvolutionConfig, target: &Canvas) -> Result<Self> {
        let (width, height) = target.dimensions();
        if width == 0 || height == 0 {
            return Err(InputError::EmptyImage.into());
        }
        let num_triangles = config.num_triangles;
        Self::new(config, |rng| {
            Genome::create_random(num_triangles, width, height, rng)
        })
    }
}

impl<G: Genotype> Evolver<G> for EvolutionDriver<G> {
    /// Evaluates the current generation, breeds its replacement, and returns
    /// the statistics of the generation that was evaluated.
    fn step<E: Evaluator<G>>(&mut self, evaluator: &E) -> Result<GenerationStats> {
        if self.phase == Phase::Finished {
            return Err(Error::Finished);
        }
        let fitnesses = self.evaluate(evaluator)?;
        let stats = GenerationStats::from_fitnesses(self.generation, &fitnesses);
        log_generation(&stats);

        let offspring = self.reproduce(&fitnesses);
        self.population.replace(offspring);
        self.generation += 1;
        self.phase = Phase::Evaluating;
        Ok(stats)
    }

    fn population(&self) -> &[Phenotype<G>] {
        self.population.members()
    }
}

fn log_generation(stats: &GenerationStats) {
    log::debug!(
        "gen {:>5}: best {:.6} ({:.2} dB), mean {:.6}, worst {:.6}",
        stats.generation,
        stats.best,
        stats.best_psnr(),
        stats.mean,
        stats.worst
    );
}
