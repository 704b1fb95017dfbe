//! Pixel-error fitness.

use crate::canvas::Canvas;
use crate::error::{ComputationError, InputError, Result};
use crate::genome::Genome;
use crate::render::render;
use crate::Evaluator;

/// Scores genomes by negative mean squared error against a fixed target.
///
/// The target is read-only for the lifetime of the evaluator, so a single
/// instance can be shared by every worker thread.
pub struct ImageEvaluator {
    target: Canvas,
}

impl ImageEvaluator {
    pub fn new(target: Canvas) -> Result<Self> {
        if target.width() == 0 || target.height() == 0 {
            return Err(InputError::EmptyImage.into());
        }
        Ok(Self { target })
    }

    pub fn target(&self) -> &Canvas {
        &self.target
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.target.dimensions()
    }
}

impl Evaluator<Genome> for ImageEvaluator {
    fn evaluate(&self, genome: &Genome) -> Result<f32> {
        let expected = self.target.dimensions();
        let found = (genome.width, genome.height);
        if found != expected {
            return Err(InputError::DimensionMismatch { expected, found }.into());
        }
        let rendered = render(genome, expected.0, expected.1);
        let mse = mean_squared_error(&rendered, &self.target)?;
        if !mse.is_finite() {
            return Err(ComputationError::NonFiniteFitness(mse).into());
        }
        Ok(-(mse as f32))
    }
}

/// Mean of squared differences over every pixel and channel.
///
/// Accumulates in `f64`.
pub fn mean_squared_error(a: &Canvas, b: &Canvas) -> Result<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(InputError::DimensionMismatch {
            expected: b.dimensions(),
            found: a.dimensions(),
        }
        .into());
    }
    if a.is_empty() {
        return Err(InputError::EmptyImage.into());
    }
    let sum: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    Ok(sum / a.as_slice().len() as f64)
}

/// Peak signal-to-noise ratio in dB for unit-range channels.
///
/// A perfect match yields `f64::INFINITY`.
pub fn psnr(mse: f64) -> f64 {
    if mse <= 0.0 {
        f64::INFINITY
    } else {
        -10.0 * mse.log10()
    }
}
