//! Single-point crossover on triangle boundaries.
//!
//! Cut points are counted in triangles, which is the same as restricting the
//! flat encoding to multiples of [`GENES_PER_TRIANGLE`](crate::genome::GENES_PER_TRIANGLE).
//! A triangle is never split between parents.

use crate::genome::Genome;
use rand::Rng;

/// Splices two equally sized parents at a uniformly chosen triangle boundary
/// in `[0, num_triangles)`.
pub fn crossover<R: Rng>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> (Genome, Genome) {
    let n = parent1.num_triangles();
    if n == 0 {
        return (parent1.clone(), parent2.clone());
    }
    let point = rng.random_range(0..n);
    crossover_at(parent1, parent2, point)
}

/// Deterministic core of [`crossover`].
///
/// `child1 = parent1[..point] ++ parent2[point..]` and `child2` is the mirror
/// image. Applying the same cut to the children restores the parents.
pub fn crossover_at(parent1: &Genome, parent2: &Genome, point: usize) -> (Genome, Genome) {
    debug_assert_eq!(
        parent1.num_triangles(),
        parent2.num_triangles(),
        "crossover parents must have the same number of triangles"
    );
    let point = point.min(parent1.triangles.len()).min(parent2.triangles.len());

    let splice = |head: &Genome, tail: &Genome| {
        let mut triangles = Vec::with_capacity(head.triangles.len());
        triangles.extend_from_slice(&head.triangles[..point]);
        triangles.extend_from_slice(&tail.triangles[point..]);
        Genome {
            width: head.width,
            height: head.height,
            triangles,
        }
    };

    (splice(parent1, parent2), splice(parent2, parent1))
}
