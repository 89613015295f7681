//! Sampler-facing interface for log-density evaluation.
//!
//! The ensemble sampler itself lives outside this crate. Any driver (affine
//! invariant ensemble, HMC, variational) sees a model only through
//! [`LogDensity`]: a fixed dimension and a pure function from a flat position
//! to a log-density. Rejected regions are reported as `f64::NEG_INFINITY`;
//! errors are reserved for malformed inputs and must abort the run.

use faer::Mat;
use rayon::prelude::*;
use thiserror::Error;

use crate::models::matrix_ops::row_values;

/// Errors for ensemble shape handling.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InferenceError {
    #[error("ensemble requires at least one walker")]
    NoWalkers,
    #[error("walker positions have {found} columns; model dimension is {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// A log-density over a flat parameter vector.
///
/// Implementations must be pure: the same position always yields the same
/// value, and evaluation never mutates shared state, so walkers can be
/// evaluated concurrently.
pub trait LogDensity: Sync {
    type Error;

    /// Number of coordinates in a position.
    fn dimension(&self) -> usize;

    /// Log-density at `position`, `f64::NEG_INFINITY` outside the support.
    ///
    /// # Errors
    ///
    /// Returns the implementation's error for malformed positions or data.
    fn log_density(&self, position: &[f64]) -> Result<f64, Self::Error>;
}

/// Evaluate every walker (row of `positions`) in parallel.
///
/// An error from any walker aborts the whole evaluation rather than
/// discarding the offending walker. When several walkers fail, which of their
/// errors is returned depends on scheduling.
///
/// # Errors
///
/// Returns `InferenceError` (converted into `D::Error`) for an empty ensemble
/// or a width mismatch, or an error raised by `density` for one of the
/// walkers.
pub fn evaluate_ensemble<D>(density: &D, positions: &Mat<f64>) -> Result<Vec<f64>, D::Error>
where
    D: LogDensity,
    D::Error: From<InferenceError> + Send,
{
    if positions.nrows() == 0 {
        return Err(InferenceError::NoWalkers.into());
    }
    if positions.ncols() != density.dimension() {
        return Err(InferenceError::DimensionMismatch {
            expected: density.dimension(),
            found: positions.ncols(),
        }
        .into());
    }

    (0..positions.nrows())
        .into_par_iter()
        .map(|row| density.log_density(&row_values(positions, row)))
        .collect()
}
