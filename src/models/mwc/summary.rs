//! Posterior summaries of a flattened MCMC chain.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};
use faer::Mat;
use num_traits::ToPrimitive;
use statrs::statistics::Statistics;

use crate::models::matrix_ops::select_column;
use crate::models::thermo::{MwcConstants, fold_change_scalar};
use crate::utils::{mean, percentile, sorted_copy, usize_to_f64};

use super::types::McmcError;

/// Flattened sampler output: one row per retained draw.
#[derive(Debug, Clone)]
pub struct FlatChain {
    names: Vec<String>,
    draws: Mat<f64>,
    log_prob: Vec<f64>,
}

impl FlatChain {
    /// # Errors
    ///
    /// Returns `McmcError` if the chain is empty or the names and
    /// log-probabilities do not match the draw matrix.
    pub fn new(names: Vec<String>, draws: Mat<f64>, log_prob: Vec<f64>) -> Result<Self, McmcError> {
        if draws.nrows() == 0 {
            return Err(McmcError::EmptyChain);
        }
        if names.len() != draws.ncols() {
            return Err(McmcError::ChainNameMismatch {
                columns: draws.ncols(),
                names: names.len(),
            });
        }
        if log_prob.len() != draws.nrows() {
            return Err(McmcError::ChainLengthMismatch {
                draws: draws.nrows(),
                log_prob: log_prob.len(),
            });
        }
        Ok(Self {
            names,
            draws,
            log_prob,
        })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn n_draws(&self) -> usize {
        self.draws.nrows()
    }

    #[must_use]
    pub fn draws(&self) -> &Mat<f64> {
        &self.draws
    }

    /// Every draw of parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns `McmcError::UnknownParameter` if no column carries `name`.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, McmcError> {
        let index = self
            .names
            .iter()
            .position(|candidate| candidate == name)
            .ok_or_else(|| McmcError::UnknownParameter(name.to_owned()))?;
        Ok(self.column_at(index))
    }

    fn column_at(&self, index: usize) -> Vec<f64> {
        let rows: Vec<usize> = (0..self.n_draws()).collect();
        select_column(&self.draws, index, &rows)
    }

    /// Row index of the draw with the highest log-probability.
    #[must_use]
    pub fn max_log_prob_index(&self) -> usize {
        self.log_prob
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(index, _)| index)
    }
}

fn check_mass_fraction(mass_frac: f64) -> Result<(), McmcError> {
    if mass_frac > 0.0 && mass_frac <= 1.0 {
        Ok(())
    } else {
        Err(McmcError::InvalidMassFraction(mass_frac))
    }
}

/// Highest posterior density interval of `trace`.
///
/// Returns the bounds of the shortest interval between sorted samples that
/// spans `floor(mass_frac * n)` steps. With `mass_frac = 1` the interval is
/// the full sample range.
///
/// # Errors
///
/// Returns `McmcError::EmptyChain` for an empty trace and
/// `McmcError::InvalidMassFraction` unless `0 < mass_frac <= 1`.
pub fn hpd(trace: &[f64], mass_frac: f64) -> Result<(f64, f64), McmcError> {
    check_mass_fraction(mass_frac)?;
    if trace.is_empty() {
        return Err(McmcError::EmptyChain);
    }

    let sorted = sorted_copy(trace);
    let n = sorted.len();
    let span = (mass_frac * usize_to_f64(n))
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(n - 1);

    let start = (0..n - span)
        .min_by(|&a, &b| {
            let width_a = sorted[a + span] - sorted[a];
            let width_b = sorted[b + span] - sorted[b];
            width_a.total_cmp(&width_b)
        })
        .unwrap_or(0);
    Ok((sorted[start], sorted[start + span]))
}

/// Posterior summary of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSummary {
    pub name: String,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    /// Value at the draw with the highest log-probability.
    pub mode: f64,
    pub hpd_min: f64,
    pub hpd_max: f64,
}

/// Summaries of every parameter of `chain`, in column order.
///
/// # Errors
///
/// Returns `McmcError::InvalidMassFraction` unless `0 < mass_frac <= 1`.
pub fn summarize_chain(
    chain: &FlatChain,
    mass_frac: f64,
) -> Result<Vec<ParameterSummary>, McmcError> {
    check_mass_fraction(mass_frac)?;
    let mode_row = chain.max_log_prob_index();

    chain
        .names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let trace = chain.column_at(index);
            let (hpd_min, hpd_max) = hpd(&trace, mass_frac)?;
            let sorted = sorted_copy(&trace);
            Ok(ParameterSummary {
                name: name.clone(),
                mean: mean(&trace),
                std_dev: trace.iter().std_dev(),
                median: percentile(&sorted, 0.5),
                mode: chain.draws[(mode_row, index)],
                hpd_min,
                hpd_max,
            })
        })
        .collect()
}

/// Fold-change HPD band over a grid of inducer concentrations.
///
/// The band reflects uncertainty in the binding energy only: `ka`, `ki` and
/// the other constants are fixed to `constants`. Every binding-energy draw is
/// pushed through the fold-change model at each concentration. Row 0 of the
/// result holds the lower bounds and row 1 the upper bounds, one column per
/// concentration.
///
/// # Errors
///
/// Returns `McmcError` for an empty draw set, an invalid mass fraction, or
/// model validation failures.
pub fn fold_change_credible_region(
    inducer_conc: &[f64],
    energy_draws: &[f64],
    repressors: f64,
    constants: &MwcConstants,
    mass_frac: f64,
) -> Result<Mat<f64>, McmcError> {
    check_mass_fraction(mass_frac)?;
    if energy_draws.is_empty() {
        return Err(McmcError::EmptyChain);
    }

    let mut region = Mat::<f64>::zeros(2, inducer_conc.len());
    for (col, &c) in inducer_conc.iter().enumerate() {
        let predictions = energy_draws
            .iter()
            .map(|&energy| fold_change_scalar(c, repressors, energy, constants))
            .collect::<Result<Vec<_>, _>>()?;
        let (low, high) = hpd(&predictions, mass_frac)?;
        region[(0, col)] = low;
        region[(1, col)] = high;
    }
    Ok(region)
}

fn make_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|header| Cell::new(*header)));
    table
}

/// Render parameter summaries as a text table.
#[must_use]
pub fn render_summary_table(summaries: &[ParameterSummary]) -> String {
    let mut table = make_table(&["Parameter", "Mean", "SD", "Median", "Mode", "HPD min", "HPD max"]);
    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(format!("{:.4}", summary.mean)),
            Cell::new(format!("{:.4}", summary.std_dev)),
            Cell::new(format!("{:.4}", summary.median)),
            Cell::new(format!("{:.4}", summary.mode)),
            Cell::new(format!("{:.4}", summary.hpd_min)),
            Cell::new(format!("{:.4}", summary.hpd_max)),
        ]);
    }
    table.to_string()
}
