//! MWC thermodynamic model functions.
//!
//! The allosteric repressor is described by two minus-log dissociation
//! constants `ka`, `ki` (so `Ka = exp(-ka)` in µM), the active/inactive energy
//! gap `epsilon` (in kT), and `n` inducer binding sites. Fold-change follows
//! the simple-repression architecture with `quaternary_state` DNA-binding heads
//! per repressor and `nonspecific_sites` competing genomic sites.
//!
//! Every function validates its physical preconditions and returns
//! `ThermoError` instead of clamping.

use thiserror::Error;

use crate::input::{BINDING_ENERGY_COLUMN, InputError, ObservationTable};

/// Validation errors raised by the thermodynamic model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThermoError {
    #[error("inducer concentration must be non-negative; found {value}")]
    NegativeConcentration { value: f64 },
    #[error("repressor copy number must be non-negative; found {value}")]
    NegativeRepressorCount { value: f64 },
    #[error("quaternary state must be positive; found {value}")]
    NonPositiveQuaternaryState { value: f64 },
    #[error("number of nonspecific binding sites must be positive; found {value}")]
    NonPositiveNonspecificSites { value: f64 },
    #[error("input table cannot be empty")]
    EmptyInput,
    #[error(transparent)]
    InvalidTable(#[from] InputError),
}

/// Physical constants of the MWC induction model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MwcConstants {
    /// Minus log of the active-state inducer dissociation constant.
    pub ka: f64,
    /// Minus log of the inactive-state inducer dissociation constant.
    pub ki: f64,
    /// Energy difference between the inactive and active states (kT).
    pub epsilon: f64,
    /// Number of inducer binding sites per repressor.
    pub n_sites: f64,
    /// DNA-binding heads per repressor molecule.
    pub quaternary_state: f64,
    /// Number of nonspecific genomic binding sites.
    pub nonspecific_sites: f64,
}

impl Default for MwcConstants {
    fn default() -> Self {
        Self {
            ka: -4.935,
            ki: 0.635,
            epsilon: 4.5,
            n_sites: 2.0,
            quaternary_state: 2.0,
            nonspecific_sites: 4.6e6,
        }
    }
}

impl MwcConstants {
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Dissociation constants `(Ka, Ki)` in µM.
    #[must_use]
    pub fn dissociation_constants(self) -> (f64, f64) {
        ((-self.ka).exp(), (-self.ki).exp())
    }

    /// # Errors
    ///
    /// Returns `ThermoError` if the stoichiometry constants are not positive.
    pub fn validate(self) -> Result<(), ThermoError> {
        if !(self.quaternary_state > 0.0) {
            return Err(ThermoError::NonPositiveQuaternaryState {
                value: self.quaternary_state,
            });
        }
        if !(self.nonspecific_sites > 0.0) {
            return Err(ThermoError::NonPositiveNonspecificSites {
                value: self.nonspecific_sites,
            });
        }
        Ok(())
    }

    /// Whether every constant is finite and the stoichiometry is positive.
    #[must_use]
    pub fn is_valid(self) -> bool {
        [
            self.ka,
            self.ki,
            self.epsilon,
            self.n_sites,
            self.quaternary_state,
            self.nonspecific_sites,
        ]
        .iter()
        .all(|value| value.is_finite())
            && self.validate().is_ok()
    }
}

fn check_concentration(value: f64) -> Result<(), ThermoError> {
    if value < 0.0 {
        Err(ThermoError::NegativeConcentration { value })
    } else {
        Ok(())
    }
}

fn check_repressors(value: f64) -> Result<(), ThermoError> {
    if value < 0.0 {
        Err(ThermoError::NegativeRepressorCount { value })
    } else {
        Ok(())
    }
}

// Ratio form avoids inf/inf at saturating concentrations.
fn pact_unchecked(inducer_conc: f64, ka: f64, ki: f64, epsilon: f64, n_sites: f64) -> f64 {
    let ratio = (inducer_conc.mul_add(ki.exp(), 1.0) / inducer_conc.mul_add(ka.exp(), 1.0))
        .powf(n_sites);
    1.0 / (-epsilon).exp().mul_add(ratio, 1.0)
}

/// Probability that a repressor is active at one inducer concentration.
///
/// # Errors
///
/// Returns `ThermoError::NegativeConcentration` if `inducer_conc < 0`.
pub fn active_probability_scalar(
    inducer_conc: f64,
    constants: &MwcConstants,
) -> Result<f64, ThermoError> {
    check_concentration(inducer_conc)?;
    Ok(pact_unchecked(
        inducer_conc,
        constants.ka,
        constants.ki,
        constants.epsilon,
        constants.n_sites,
    ))
}

/// MWC probability of the DNA-binding-competent state for each concentration.
///
/// # Errors
///
/// Returns `ThermoError::NegativeConcentration` if any concentration is
/// negative.
pub fn active_probability(
    inducer_conc: &[f64],
    constants: &MwcConstants,
) -> Result<Vec<f64>, ThermoError> {
    inducer_conc
        .iter()
        .map(|&c| active_probability_scalar(c, constants))
        .collect()
}

/// Leakiness and saturation of the active probability: its limits at zero
/// and at saturating inducer.
#[must_use]
pub fn active_probability_limits(constants: &MwcConstants) -> (f64, f64) {
    let boltzmann = (-constants.epsilon).exp();
    let leakiness = 1.0 / (1.0 + boltzmann);
    let affinity_ratio = (constants.ki - constants.ka).exp().powf(constants.n_sites);
    let saturation = 1.0 / boltzmann.mul_add(affinity_ratio, 1.0);
    (leakiness, saturation)
}

fn repression_factor(
    inducer_conc: f64,
    repressor_count: f64,
    binding_energy: f64,
    constants: &MwcConstants,
) -> Result<f64, ThermoError> {
    check_repressors(repressor_count)?;
    let pact = active_probability_scalar(inducer_conc, constants)?;
    Ok(constants.quaternary_state * repressor_count / constants.nonspecific_sites
        * pact
        * (1.0 + (-constants.epsilon).exp())
        * (-binding_energy).exp())
}

/// Fold-change at one inducer concentration.
///
/// # Errors
///
/// Returns `ThermoError` if the concentration or repressor count is negative
/// or the stoichiometry constants are not positive.
pub fn fold_change_scalar(
    inducer_conc: f64,
    repressor_count: f64,
    binding_energy: f64,
    constants: &MwcConstants,
) -> Result<f64, ThermoError> {
    constants.validate()?;
    let factor = repression_factor(inducer_conc, repressor_count, binding_energy, constants)?;
    Ok(1.0 / (1.0 + factor))
}

/// Predicted fold-change for every inducer concentration at a fixed repressor
/// copy number and binding energy.
///
/// # Errors
///
/// Returns `ThermoError` if any concentration is negative, the repressor
/// count is negative, or the stoichiometry constants are not positive.
pub fn fold_change(
    inducer_conc: &[f64],
    repressor_count: f64,
    binding_energy: f64,
    constants: &MwcConstants,
) -> Result<Vec<f64>, ThermoError> {
    constants.validate()?;
    check_repressors(repressor_count)?;
    inducer_conc
        .iter()
        .map(|&c| {
            repression_factor(c, repressor_count, binding_energy, constants)
                .map(|factor| 1.0 / (1.0 + factor))
        })
        .collect()
}

/// Per-row Bohr parameter (effective free energy) of an observation table.
///
/// Requires the table's binding-energy column. Fold-change relates to the
/// result as `1 / (1 + exp(-F))`.
///
/// # Errors
///
/// Returns `ThermoError::EmptyInput` for a zero-row table, an input error if
/// the table is malformed or lacks binding energies, and validation errors for
/// negative concentrations, copy numbers, or non-positive constants.
pub fn bohr_parameter(
    table: &ObservationTable,
    constants: &MwcConstants,
) -> Result<Vec<f64>, ThermoError> {
    if table.is_empty() {
        return Err(ThermoError::EmptyInput);
    }
    constants.validate()?;
    table.validate()?;
    let energies = table
        .binding_energy
        .as_ref()
        .ok_or(InputError::MissingColumn {
            column: BINDING_ENERGY_COLUMN,
        })?;

    (0..table.n_rows())
        .map(|row| {
            repression_factor(
                table.inducer_conc[row],
                table.repressors[row],
                energies[row],
                constants,
            )
            .map(|factor| -factor.ln())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Observation;
    use approx::assert_relative_eq;

    fn direct_pact(c: f64, ka: f64, ki: f64, epsilon: f64, n: f64) -> f64 {
        let active = c.mul_add(ka.exp(), 1.0).powf(n);
        let inactive = (-epsilon).exp() * c.mul_add(ki.exp(), 1.0).powf(n);
        active / (active + inactive)
    }

    #[test]
    fn active_probability_matches_closed_form() {
        let constants = MwcConstants::default();
        let concentrations = [0.0, 0.1, 1.0, 25.0, 100.0, 5_000.0];
        let pact = active_probability(&concentrations, &constants).expect("valid input");
        for (c, value) in concentrations.iter().zip(&pact) {
            let expected = direct_pact(*c, constants.ka, constants.ki, constants.epsilon, 2.0);
            assert_relative_eq!(*value, expected, max_relative = 1.0e-12);
        }
    }

    #[test]
    fn active_probability_is_a_probability() {
        for ka in [-8.0, -4.935, 0.0, 3.0] {
            for ki in [-3.0, 0.635, 4.0] {
                for epsilon in [-5.0, 0.0, 4.5, 20.0] {
                    let constants = MwcConstants {
                        ka,
                        ki,
                        epsilon,
                        ..MwcConstants::default()
                    };
                    let grid: Vec<f64> = (0..40).map(|k| 10f64.powf(f64::from(k) / 4.0 - 4.0)).collect();
                    for value in active_probability(&grid, &constants).expect("valid input") {
                        assert!((0.0..=1.0).contains(&value), "pact = {value}");
                    }
                }
            }
        }
    }

    #[test]
    fn active_probability_rejects_negative_concentration() {
        let err = active_probability(&[-1.0], &MwcConstants::default())
            .expect_err("negative concentration should fail");
        assert_eq!(err, ThermoError::NegativeConcentration { value: -1.0 });
    }

    #[test]
    fn limits_match_extreme_concentrations() {
        let constants = MwcConstants::default();
        let (leakiness, saturation) = active_probability_limits(&constants);
        assert_relative_eq!(
            leakiness,
            active_probability_scalar(0.0, &constants).expect("valid"),
            max_relative = 1.0e-12
        );
        assert_relative_eq!(
            saturation,
            active_probability_scalar(1.0e12, &constants).expect("valid"),
            max_relative = 1.0e-6
        );
        assert!(saturation < leakiness);
    }

    #[test]
    fn fold_change_is_non_increasing_in_repressors() {
        let constants = MwcConstants::default();
        for c in [0.0, 5.0, 50.0, 1_000.0] {
            let mut previous = f64::INFINITY;
            for r in [0.0, 1.0, 10.0, 60.0, 124.0, 260.0, 1_220.0, 5_000.0] {
                let fc = fold_change_scalar(c, r, -13.9, &constants).expect("valid input");
                assert!(fc <= previous);
                previous = fc;
            }
        }
    }

    #[test]
    fn fold_change_without_repressor_is_one() {
        let fc = fold_change(&[0.0, 10.0], 0.0, -15.0, &MwcConstants::default()).expect("valid");
        assert_relative_eq!(fc[0], 1.0);
        assert_relative_eq!(fc[1], 1.0);
    }

    #[test]
    fn fold_change_validates_preconditions() {
        let constants = MwcConstants::default();
        assert_eq!(
            fold_change(&[1.0], -2.0, -13.9, &constants),
            Err(ThermoError::NegativeRepressorCount { value: -2.0 })
        );
        assert_eq!(
            fold_change(&[1.0, -0.5], 60.0, -13.9, &constants),
            Err(ThermoError::NegativeConcentration { value: -0.5 })
        );

        let zero_heads = MwcConstants {
            quaternary_state: 0.0,
            ..constants
        };
        assert_eq!(
            fold_change(&[1.0], 60.0, -13.9, &zero_heads),
            Err(ThermoError::NonPositiveQuaternaryState { value: 0.0 })
        );

        let no_sites = MwcConstants {
            nonspecific_sites: -1.0,
            ..constants
        };
        assert_eq!(
            fold_change(&[1.0], 60.0, -13.9, &no_sites),
            Err(ThermoError::NonPositiveNonspecificSites { value: -1.0 })
        );
    }

    #[test]
    fn bohr_parameter_rejects_empty_table() {
        let err = bohr_parameter(&ObservationTable::default(), &MwcConstants::default())
            .expect_err("empty table should fail");
        assert_eq!(err, ThermoError::EmptyInput);
    }

    #[test]
    fn bohr_parameter_requires_binding_energy() {
        let table = ObservationTable::from_rows([Observation::new(0.5, 1.0, 60.0, "wt")]);
        let err = bohr_parameter(&table, &MwcConstants::default())
            .expect_err("missing energies should fail");
        assert_eq!(
            err,
            ThermoError::InvalidTable(InputError::MissingColumn {
                column: BINDING_ENERGY_COLUMN
            })
        );
    }

    #[test]
    fn bohr_parameter_collapses_fold_change() {
        let constants = MwcConstants::default();
        let table = ObservationTable::from_rows([
            Observation::new(0.0, 0.0, 60.0, "wt").with_binding_energy(-13.9),
            Observation::new(0.0, 50.0, 260.0, "Q21M").with_binding_energy(-15.4),
            Observation::new(0.0, 5_000.0, 1_220.0, "Y20I").with_binding_energy(-9.9),
        ]);
        let bohr = bohr_parameter(&table, &constants).expect("valid table");
        for (row, value) in bohr.iter().enumerate() {
            let fc = fold_change_scalar(
                table.inducer_conc[row],
                table.repressors[row],
                table.binding_energy.as_ref().expect("energies")[row],
                &constants,
            )
            .expect("valid");
            assert_relative_eq!(fc, 1.0 / (1.0 + (-value).exp()), max_relative = 1.0e-10);
        }
    }

    #[test]
    fn constants_report_dissociation_constants() {
        let (ka, ki) = MwcConstants::default().dissociation_constants();
        assert!((ka - 139.0).abs() < 1.0);
        assert!((ki - 0.53).abs() < 0.01);
        assert!(MwcConstants::default().is_valid());
    }
}
