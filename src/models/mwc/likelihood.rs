//! Gaussian log-likelihood of fold-change measurements under the MWC model.

use crate::models::thermo::{MwcConstants, fold_change};

use super::input::{FOLD_CHANGE, INDUCER, McmcInput};
use super::types::{McmcError, ParameterSet};

/// Sum of squared residuals of one `(repressors, mutant)` block.
///
/// Empty blocks contribute zero.
fn block_squared_error(
    input: &McmcInput,
    repressors: f64,
    mutant: &str,
    binding_energy: f64,
    constants: &MwcConstants,
) -> Result<f64, McmcError> {
    let rows = input.data.block_rows(repressors, mutant);
    if rows.is_empty() {
        return Ok(0.0);
    }
    let observed = input.data.column(FOLD_CHANGE, &rows);
    let inducer = input.data.column(INDUCER, &rows);
    let predicted = fold_change(&inducer, repressors, binding_energy, constants)?;

    Ok(predicted
        .iter()
        .zip(&observed)
        .map(|(pred, obs)| {
            let residual = pred - obs;
            residual * residual
        })
        .sum())
}

/// Unnormalized Gaussian log-likelihood of the fold-change data.
///
/// For every unique repressor copy number and mutant label, the block of
/// matching rows contributes `-sum((fc_theory - fc_exp)^2) / (2 sigma^2)`.
/// The `-N ln(sigma)` normalization is added by the posterior.
///
/// # Errors
///
/// Returns `McmcError` if `params` does not carry one energy per label, or
/// `McmcError::Validation` if a concentration or copy number is negative.
pub fn log_likelihood(
    params: &ParameterSet,
    input: &McmcInput,
    constants: &MwcConstants,
) -> Result<f64, McmcError> {
    let energies = params.energies_for(&input.unique_var)?;
    let two_var = 2.0 * params.noise_scale * params.noise_scale;

    let mut log_like = 0.0;
    for &repressors in &input.unique_var.repressors {
        for (mutant, &energy) in input.unique_var.mutants.iter().zip(&energies) {
            let squared_error = block_squared_error(input, repressors, mutant, energy, constants)?;
            log_like -= squared_error / two_var;
        }
    }
    Ok(log_like)
}

/// [`log_likelihood`] on the sampler's flat vector.
///
/// # Errors
///
/// Returns `McmcError` if `param` does not match the input's layout or the
/// data fail model validation.
pub fn log_likelihood_flat(
    param: &[f64],
    input: &McmcInput,
    constants: &MwcConstants,
) -> Result<f64, McmcError> {
    let params = input.param_idx.unpack(param, &input.unique_var)?;
    log_likelihood(&params, input, constants)
}
