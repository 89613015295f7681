//! Log-posterior of the MWC mutant model and its sampler-facing wrapper.

use faer::Mat;

use crate::inference::{LogDensity, evaluate_ensemble};

use super::input::McmcInput;
use super::likelihood::log_likelihood;
use super::priors::log_prior;
use super::types::{McmcError, ParameterSet, PosteriorConfig};

/// Log-posterior probability of `params`.
///
/// The prior is evaluated first; a rejected point returns
/// `f64::NEG_INFINITY` without evaluating the likelihood. Otherwise the
/// result is `-(N + 1) ln(sigma) + log_likelihood + log_prior`, where `N` is
/// the number of measurements and the extra `-ln(sigma)` is the Jeffreys
/// prior on the noise scale. The prior only accepts `sigma > 0`, so the
/// logarithm is always defined.
///
/// # Errors
///
/// Returns `McmcError` if the configuration is invalid, `params` does not
/// carry one energy per label, or the data fail model validation.
pub fn log_post(
    params: &ParameterSet,
    input: &McmcInput,
    config: &PosteriorConfig,
) -> Result<f64, McmcError> {
    config.validate()?;

    let lnp = log_prior(params, input, &config.prior)?;
    if lnp == f64::NEG_INFINITY {
        return Ok(f64::NEG_INFINITY);
    }

    let log_like = log_likelihood(params, input, &config.constants)?;
    let normalization = -(input.n_observations_f64() + 1.0) * params.noise_scale.ln();
    Ok(normalization + log_like + lnp)
}

/// [`log_post`] on the sampler's flat vector.
///
/// # Errors
///
/// Returns `McmcError` if `param` does not match the input's layout or
/// [`log_post`] fails.
pub fn log_post_flat(
    param: &[f64],
    input: &McmcInput,
    config: &PosteriorConfig,
) -> Result<f64, McmcError> {
    let params = input.param_idx.unpack(param, &input.unique_var)?;
    log_post(&params, input, config)
}

/// Posterior bound to one prepared dataset, usable by any ensemble driver.
#[derive(Debug, Clone)]
pub struct MwcPosterior<'a> {
    input: &'a McmcInput,
    config: PosteriorConfig,
}

impl<'a> MwcPosterior<'a> {
    /// # Errors
    ///
    /// Returns `McmcError` if `config` is invalid.
    pub fn new(input: &'a McmcInput, config: PosteriorConfig) -> Result<Self, McmcError> {
        config.validate()?;
        Ok(Self { input, config })
    }

    #[must_use]
    pub const fn input(&self) -> &McmcInput {
        self.input
    }

    #[must_use]
    pub const fn config(&self) -> &PosteriorConfig {
        &self.config
    }

    /// Parameter names in flat-vector order.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<String> {
        self.input.param_idx.parameter_names(&self.input.unique_var)
    }
}

impl LogDensity for MwcPosterior<'_> {
    type Error = McmcError;

    fn dimension(&self) -> usize {
        self.input.dimension()
    }

    fn log_density(&self, position: &[f64]) -> Result<f64, McmcError> {
        log_post_flat(position, self.input, &self.config)
    }
}

/// Log-posterior of every walker (row) in `positions`.
///
/// # Errors
///
/// Returns `McmcError` on the first walker that fails, or if the ensemble is
/// empty or has the wrong width.
pub fn log_post_ensemble(
    input: &McmcInput,
    positions: &Mat<f64>,
    config: &PosteriorConfig,
) -> Result<Vec<f64>, McmcError> {
    let posterior = MwcPosterior::new(input, config.clone())?;
    trace_debug!(
        walkers = positions.nrows(),
        dimension = posterior.dimension(),
        "evaluating log-posterior ensemble"
    );
    evaluate_ensemble(&posterior, positions)
}
