use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use symbios_mosaic::error::ComputationError;
use symbios_mosaic::{
    Canvas, Error, Evaluator, EvolutionConfig, EvolutionDriver, Evolver, FitnessScaling, Genome, Genotype,
    ImageEvaluator, population::Population,
};

// --- Mock Infrastructure for Edge Case Testing ---

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
struct TestDNA(f32);

impl Genotype for TestDNA {
    fn mutate<R: Rng>(&self, rng: &mut R, rate: f32, _scale: f32) -> Self {
        if rng.random::<f32>() < rate {
            TestDNA(self.0 + 1.0)
        } else {
            self.clone()
        }
    }
    fn crossover<R: Rng>(&self, other: &Self, _rng: &mut R) -> (Self, Self) {
        (self.clone(), other.clone())
    }
}

/// Evaluator that returns NaN for some individuals (simulates a broken oracle
/// that does not report its failure as an error).
struct PartialNaNEvaluator;
impl Evaluator<TestDNA> for PartialNaNEvaluator {
    fn evaluate(&self, genotype: &TestDNA) -> symbios_mosaic::Result<f32> {
        if genotype.0 as i32 % 3 == 0 {
            Ok(f32::NAN)
        } else {
            Ok(-genotype.0.abs())
        }
    }
}

// ============================================================================
// NaN fitness
// ============================================================================

#[test]
fn test_driver_survives_nan_fitness() {
    for scaling in [FitnessScaling::default(), FitnessScaling::Rank] {
        let config = EvolutionConfig {
            population_size: 10,
            num_generations: 5,
            fitness_scaling: scaling,
            ..EvolutionConfig::default()
        };
        let mut i = 0.0;
        let mut driver = EvolutionDriver::new(config, |_| {
            i += 1.0;
            TestDNA(i)
        })
        .unwrap();

        let outcome = driver.run(&PartialNaNEvaluator).unwrap();
        assert_eq!(driver.population().len(), 10);
        let last = outcome.history.last().unwrap();
        assert_eq!(outcome.best.fitness.is_nan(), last.best.is_nan());
    }
}

#[test]
fn test_population_best_ranks_nan_last() {
    let mut population = Population::new(vec![TestDNA(3.0), TestDNA(1.0), TestDNA(2.0)]);
    assert!(population.best().is_none());
    assert!(population.fitnesses().is_none());

    population.evaluate(&PartialNaNEvaluator).unwrap();
    let best = population.best().unwrap();
    assert_eq!(best.genotype, TestDNA(1.0));
    assert_eq!(population.fitnesses().unwrap().len(), 3);
}

#[test]
fn test_empty_population_has_no_best() {
    let mut population: Population<TestDNA> = Population::new(vec![]);
    population.evaluate(&PartialNaNEvaluator).unwrap();
    assert!(population.is_evaluated());
    assert!(population.best().is_none());
    assert_eq!(population.fitnesses(), Some(vec![]));

    // The driver reports this case as a computation failure, never as config.
    let err = Error::from(ComputationError::EmptyPopulation);
    assert!(matches!(
        err,
        Error::Computation(ComputationError::EmptyPopulation)
    ));
    assert!(err.to_string().contains("no evaluated member"));

    // A driver can never reach it: zero-sized populations are refused up front.
    let config = EvolutionConfig {
        population_size: 0,
        ..EvolutionConfig::default()
    };
    assert!(matches!(
        EvolutionDriver::new(config, |_| TestDNA(0.0)),
        Err(Error::Config(_))
    ));
}

#[test]
#[should_panic(expected = "offspring must replace the population one for one")]
fn test_population_replace_rejects_wrong_size() {
    let mut population = Population::new(vec![TestDNA(0.0), TestDNA(1.0)]);
    population.replace(vec![TestDNA(2.0)]);
}

// ============================================================================
// Small and awkward configurations
// ============================================================================

#[test]
fn test_single_individual_population() {
    let target = Canvas::filled(6, 6, [0.5; 3]);
    let config = EvolutionConfig {
        population_size: 1,
        num_triangles: 1,
        num_generations: 4,
        ..EvolutionConfig::default()
    };
    let outcome = symbios_mosaic::approximate(&target, config).unwrap();
    assert_eq!(outcome.best.genotype.num_triangles(), 1);
}

#[test]
fn test_one_pixel_canvas() {
    let target = Canvas::filled(1, 1, [0.9, 0.1, 0.5]);
    let config = EvolutionConfig {
        population_size: 6,
        num_triangles: 3,
        num_generations: 4,
        ..EvolutionConfig::default()
    };
    let outcome = symbios_mosaic::approximate(&target, config).unwrap();
    assert!(outcome.best.fitness.is_finite());
}

#[test]
fn test_extreme_mutation_keeps_genomes_renderable() {
    let target = Canvas::filled(10, 8, [0.2; 3]);
    let evaluator = ImageEvaluator::new(target.clone()).unwrap();
    let config = EvolutionConfig {
        population_size: 8,
        num_triangles: 5,
        num_generations: 10,
        mutation_rate: 1.0,
        mutation_scale: 1000.0,
        ..EvolutionConfig::default()
    };
    let mut driver = EvolutionDriver::for_target(config, &target).unwrap();
    let outcome = driver.run(&evaluator).unwrap();
    assert!(outcome.best.fitness.is_finite());
    for (i, &v) in outcome.best.genotype.to_genes().iter().enumerate() {
        let (lo, hi) = outcome.best.genotype.gene_bounds(i);
        assert!(v >= lo && v <= hi);
    }
}

// ============================================================================
// Parallel throughput
// ============================================================================

/// Evaluator with a fixed per-genome cost.
struct SlowEvaluator {
    inner: ImageEvaluator,
}

impl Evaluator<Genome> for SlowEvaluator {
    fn evaluate(&self, genome: &Genome) -> symbios_mosaic::Result<f32> {
        std::thread::sleep(Duration::from_millis(1));
        self.inner.evaluate(genome)
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_evaluation_provides_speedup() {
    if rayon::current_num_threads() < 4 {
        return;
    }
    let pop_size = 400;
    let target = Canvas::filled(8, 8, [0.5; 3]);
    let evaluator = SlowEvaluator {
        inner: ImageEvaluator::new(target.clone()).unwrap(),
    };
    let config = EvolutionConfig {
        population_size: pop_size,
        num_triangles: 2,
        ..EvolutionConfig::default()
    };
    let mut driver = EvolutionDriver::for_target(config, &target).unwrap();

    let start = std::time::Instant::now();
    driver.step(&evaluator).unwrap();
    let actual_ms = start.elapsed().as_millis().max(1) as f64;

    // Sequential would be at least pop_size * 1ms.
    let speedup = pop_size as f64 / actual_ms;
    assert!(
        speedup > 1.5,
        "Parallel evaluation should provide speedup. Got {:.2}x",
        speedup
    );
}

#[test]
fn test_slow_evaluator_still_deterministic() {
    let target = Canvas::filled(8, 8, [0.5; 3]);
    let evaluator = SlowEvaluator {
        inner: ImageEvaluator::new(target.clone()).unwrap(),
    };
    let config = EvolutionConfig {
        population_size: 16,
        num_triangles: 3,
        num_generations: 3,
        seed: 99,
        ..EvolutionConfig::default()
    };

    let run = || {
        let mut driver = EvolutionDriver::for_target(config.clone(), &target).unwrap();
        driver.run(&evaluator).unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.best.genotype, b.best.genotype);
}
