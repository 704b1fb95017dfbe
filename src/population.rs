//! Fixed-size population with a per-generation fitness cache.

use crate::error::Result;
use crate::selection::cmp_f32_nan_last;
use crate::{Evaluator, Genotype, Phenotype};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An ordered set of phenotypes whose fitness is valid only while
/// [`is_evaluated`](Population::is_evaluated) holds.
///
/// The size is fixed at construction; [`replace`](Population::replace)
/// swaps in a whole new generation of the same size and drops the cache.
pub struct Population<G: Genotype> {
    members: Vec<Phenotype<G>>,
    evaluated: bool,
}

impl<G: Genotype> Population<G> {
    pub fn new(genomes: Vec<G>) -> Self {
        Self {
            members: genomes.into_iter().map(Phenotype::unevaluated).collect(),
            evaluated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn members(&self) -> &[Phenotype<G>] {
        &self.members
    }

    /// Scores every member that has not been scored this generation.
    ///
    /// Members are independent, so with the `parallel` feature this is a
    /// plain data-parallel map; each slot is written exactly once. The first
    /// evaluator error aborts the whole pass.
    pub fn evaluate<E: Evaluator<G>>(&mut self, evaluator: &E) -> Result<()> {
        if self.evaluated {
            return Ok(());
        }

        #[cfg(feature = "parallel")]
        self.members.par_iter_mut().try_for_each(|p| -> Result<()> {
            p.fitness = evaluator.evaluate(&p.genotype)?;
            Ok(())
        })?;
        #[cfg(not(feature = "parallel"))]
        for p in &mut self.members {
            p.fitness = evaluator.evaluate(&p.genotype)?;
        }

        self.evaluated = true;
        Ok(())
    }

    /// Cached fitness values in member order, if this generation was scored.
    pub fn fitnesses(&self) -> Option<Vec<f32>> {
        self.evaluated
            .then(|| self.members.iter().map(|p| p.fitness).collect())
    }

    /// Highest-fitness member, NaN ranked last.
    pub fn best(&self) -> Option<&Phenotype<G>> {
        if !self.evaluated {
            return None;
        }
        self.members
            .iter()
            .max_by(|a, b| cmp_f32_nan_last(a.fitness, b.fitness))
    }

    /// Replaces every member with `offspring` and invalidates the cache.
    ///
    /// # Panics
    ///
    /// Panics if `offspring` is not exactly the current population size.
    pub fn replace(&mut self, offspring: Vec<G>) {
        assert_eq!(
            offspring.len(),
            self.members.len(),
            "offspring must replace the population one for one"
        );
        self.members = offspring.into_iter().map(Phenotype::unevaluated).collect();
        self.evaluated = false;
    }
}
