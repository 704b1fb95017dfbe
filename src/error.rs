//! Error taxonomy for the crate.
//!
//! Every failure is fatal for the run that produced it: evolution is a
//! deterministic batch computation, so nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to write image to {path}")]
    Output {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error("evolution run has already finished")]
    Finished,
}

/// Problems with the target image or with buffers compared against it.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("target image not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to decode image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("expected {expected} color channels, found {found}")]
    ChannelMismatch { expected: usize, found: usize },

    #[error("dimension mismatch: expected {}x{}, found {}x{}", expected.0, expected.1, found.0, found.1)]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("pixel buffer holds {found} values, expected {expected}")]
    BufferLength { expected: usize, found: usize },

    #[error("image has zero width or height")]
    EmptyImage,
}

/// Invalid run configuration, detected before any generation runs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than 0")]
    NonPositive { field: &'static str },

    #[error("mutation rate must be in (0, 1], got {0}")]
    RateOutOfRange(f32),

    #[error("mutation scale must be positive and finite, got {0}")]
    InvalidScale(f32),

    #[error("fitness scaling epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f32),

    #[error("target fitness must be finite, got {0}")]
    InvalidTarget(f32),
}

/// Numeric or structural failures during rendering and scoring.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ComputationError {
    #[error("fitness evaluated to a non-finite value: {0}")]
    NonFiniteFitness(f64),

    #[error("flat gene buffer of length {len} is not a whole number of triangles")]
    MalformedGenome { len: usize },

    #[error("population has no evaluated member to report")]
    EmptyPopulation,
}
