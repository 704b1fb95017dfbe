//! Gaussian point mutation with per-gene-kind clamping.

use crate::genome::Genome;
use rand::Rng;
use rand_distr::StandardNormal;

/// Returns a mutated copy of `genome`; the input is left untouched.
///
/// Each gene is perturbed independently with probability `rate` by
/// `N(0, scale * range)`, where `range` is the width of the gene's valid
/// interval (canvas width or height for vertices, 1 for colors). The result
/// is clamped back into that interval.
pub fn mutate<R: Rng>(genome: &Genome, rate: f32, scale: f32, rng: &mut R) -> Genome {
    let w = genome.width as f32;
    let h = genome.height as f32;
    let mut child = genome.clone();

    for tri in &mut child.triangles {
        for [x, y] in &mut tri.vertices {
            *x = perturb(*x, w, rate, scale, rng);
            *y = perturb(*y, h, rate, scale, rng);
        }
        for c in &mut tri.color {
            *c = perturb(*c, 1.0, rate, scale, rng);
        }
    }
    child
}

#[inline]
fn perturb<R: Rng>(gene: f32, max: f32, rate: f32, scale: f32, rng: &mut R) -> f32 {
    if rng.random::<f32>() >= rate {
        return gene;
    }
    let noise: f32 = rng.sample(StandardNormal);
    (gene + noise * scale * max).clamp(0.0, max)
}
