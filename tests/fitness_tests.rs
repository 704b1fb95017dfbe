use rand::prelude::SeedableRng;
use rand_pcg::Pcg64;
use symbios_mosaic::error::{ComputationError, InputError};
use symbios_mosaic::fitness::{mean_squared_error, psnr};
use symbios_mosaic::{Canvas, Error, Evaluator, Genome, ImageEvaluator, Triangle};

fn solid_genome(width: u32, height: u32, rgb: [f32; 3]) -> Genome {
    let (w, h) = (width as f32, height as f32);
    Genome {
        width,
        height,
        triangles: vec![Triangle {
            vertices: [[0.0, 0.0], [2.0 * w, 0.0], [0.0, 2.0 * h]],
            color: [rgb[0], rgb[1], rgb[2], 1.0],
        }],
    }
}

#[test]
fn test_perfect_match_scores_zero() {
    let color = [0.25, 0.5, 0.75];
    let evaluator = ImageEvaluator::new(Canvas::filled(20, 15, color)).unwrap();
    let fitness = evaluator.evaluate(&solid_genome(20, 15, color)).unwrap();
    assert_eq!(fitness, 0.0);
}

#[test]
fn test_fitness_is_negative_mse() {
    let evaluator = ImageEvaluator::new(Canvas::filled(4, 4, [0.5, 0.5, 0.5])).unwrap();
    let empty = Genome {
        width: 4,
        height: 4,
        triangles: vec![],
    };
    // Black canvas against mid grey: every channel is off by 0.5.
    assert_eq!(evaluator.evaluate(&empty).unwrap(), -0.25);
}

#[test]
fn test_fitness_is_never_positive() {
    let mut rng = Pcg64::seed_from_u64(3);
    let evaluator = ImageEvaluator::new(Canvas::filled(16, 16, [0.1, 0.9, 0.4])).unwrap();
    for _ in 0..20 {
        let g = Genome::create_random(10, 16, 16, &mut rng);
        let f = evaluator.evaluate(&g).unwrap();
        assert!(f <= 0.0 && f >= -1.0, "fitness out of range: {f}");
    }
}

#[test]
fn test_closer_genome_scores_higher() {
    let evaluator = ImageEvaluator::new(Canvas::filled(8, 8, [0.6, 0.6, 0.6])).unwrap();
    let near = evaluator.evaluate(&solid_genome(8, 8, [0.5, 0.5, 0.5])).unwrap();
    let far = evaluator.evaluate(&solid_genome(8, 8, [0.0, 1.0, 0.0])).unwrap();
    assert!(near > far);
}

#[test]
fn test_dimension_mismatch_is_rejected() {
    let evaluator = ImageEvaluator::new(Canvas::filled(8, 8, [0.0; 3])).unwrap();
    let result = evaluator.evaluate(&solid_genome(8, 9, [0.0; 3]));
    assert!(matches!(
        result,
        Err(Error::Input(InputError::DimensionMismatch {
            expected: (8, 8),
            found: (8, 9)
        }))
    ));
}

#[test]
fn test_empty_target_is_rejected() {
    assert!(matches!(
        ImageEvaluator::new(Canvas::new(0, 5)),
        Err(Error::Input(InputError::EmptyImage))
    ));
}

#[test]
fn test_non_rgb_buffers_are_rejected() {
    let rgba = Canvas::from_raw(2, 2, 4, vec![0.0; 16]);
    assert!(matches!(
        rgba,
        Err(InputError::ChannelMismatch {
            expected: 3,
            found: 4
        })
    ));

    let short = Canvas::from_raw(2, 2, 3, vec![0.0; 11]);
    assert!(matches!(
        short,
        Err(InputError::BufferLength {
            expected: 12,
            found: 11
        })
    ));

    assert!(Canvas::from_raw(2, 2, 3, vec![0.0; 12]).is_ok());
}

#[test]
fn test_mean_squared_error() {
    let a = Canvas::from_raw(2, 1, 3, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    let b = Canvas::filled(2, 1, [0.0; 3]);
    assert!((mean_squared_error(&a, &b).unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(mean_squared_error(&a, &a).unwrap(), 0.0);
    assert!(mean_squared_error(&a, &Canvas::new(1, 2)).is_err());
}

#[test]
fn test_psnr() {
    assert_eq!(psnr(0.0), f64::INFINITY);
    assert!((psnr(0.01) - 20.0).abs() < 1e-9);
    assert!((psnr(1.0)).abs() < 1e-12);
}

#[test]
fn test_non_finite_fitness_error_variant() {
    let err: Error = ComputationError::NonFiniteFitness(f64::NAN).into();
    assert!(matches!(err, Error::Computation(_)));
    assert!(err.to_string().contains("non-finite"));
}
