//! Triangle genomes.
//!
//! A [`Genome`] is an ordered list of [`Triangle`]s drawn back to front. Each
//! triangle carries ten genes: six vertex coordinates in pixels followed by an
//! RGBA color in `[0, 1]`. The flat encoding produced by [`Genome::to_genes`]
//! keeps that order, so triangle boundaries sit on multiples of
//! [`GENES_PER_TRIANGLE`].

use crate::error::ComputationError;
use crate::{Genotype, crossover, mutation};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Genes per triangle in the flat encoding (3 vertices x 2 + RGBA).
pub const GENES_PER_TRIANGLE: usize = 10;

/// One drawable primitive: three vertices and a straight (non-premultiplied) color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// `[x, y]` pairs in pixel space.
    pub vertices: [[f32; 2]; 3],
    /// RGBA, each channel in `[0, 1]`.
    pub color: [f32; 4],
}

impl Triangle {
    pub fn random<R: Rng>(rng: &mut R, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let mut vertices = [[0.0; 2]; 3];
        for v in &mut vertices {
            *v = [rng.random_range(0.0..=w), rng.random_range(0.0..=h)];
        }
        Self {
            vertices,
            color: [rng.random(), rng.random(), rng.random(), rng.random()],
        }
    }
}

/// A candidate approximation of the target image.
///
/// `width` and `height` bound the vertex genes; they are fixed at creation
/// and shared by every genome in a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub width: u32,
    pub height: u32,
    pub triangles: Vec<Triangle>,
}

impl Genome {
    /// Uniformly random genome: vertices anywhere inside the canvas, colors
    /// anywhere in `[0, 1]`.
    pub fn create_random<R: Rng>(
        num_triangles: usize,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Self {
        let triangles = (0..num_triangles)
            .map(|_| Triangle::random(rng, width, height))
            .collect();
        Self {
            width,
            height,
            triangles,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Length of the flat encoding.
    pub fn gene_len(&self) -> usize {
        self.triangles.len() * GENES_PER_TRIANGLE
    }

    /// Valid `(min, max)` range of the gene at `index` in the flat encoding.
    pub fn gene_bounds(&self, index: usize) -> (f32, f32) {
        match index % GENES_PER_TRIANGLE {
            0 | 2 | 4 => (0.0, self.width as f32),
            1 | 3 | 5 => (0.0, self.height as f32),
            _ => (0.0, 1.0),
        }
    }

    /// Flattens the genome into `x0 y0 x1 y1 x2 y2 r g b a` per triangle.
    pub fn to_genes(&self) -> Vec<f32> {
        let mut genes = Vec::with_capacity(self.gene_len());
        for t in &self.triangles {
            for [x, y] in t.vertices {
                genes.push(x);
                genes.push(y);
            }
            genes.extend_from_slice(&t.color);
        }
        genes
    }

    /// Rebuilds a genome from its flat encoding.
    pub fn from_genes(width: u32, height: u32, genes: &[f32]) -> Result<Self, ComputationError> {
        if genes.len() % GENES_PER_TRIANGLE != 0 {
            return Err(ComputationError::MalformedGenome { len: genes.len() });
        }
        let triangles = genes
            .chunks_exact(GENES_PER_TRIANGLE)
            .map(|g| Triangle {
                vertices: [[g[0], g[1]], [g[2], g[3]], [g[4], g[5]]],
                color: [g[6], g[7], g[8], g[9]],
            })
            .collect();
        Ok(Self {
            width,
            height,
            triangles,
        })
    }
}

impl Genotype for Genome {
    fn mutate<R: Rng>(&self, rng: &mut R, rate: f32, scale: f32) -> Self {
        mutation::mutate(self, rate, scale, rng)
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> (Self, Self) {
        crossover::crossover(self, other, rng)
    }
}
