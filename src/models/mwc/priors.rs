//! Prior specifications and the log-prior evaluator.

use std::collections::BTreeMap;

use super::input::McmcInput;
use super::types::{McmcError, ParameterSet};

/// Prior on the binding energy of a single mutant label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyPrior {
    /// Reject energies outside `[lower, upper)`.
    HardBound { lower: f64, upper: f64 },
    /// Unnormalized Gaussian penalty `-(e - center)^2 / (2 scale^2)`.
    GaussianPenalty { center: f64, scale: f64 },
    /// No label-specific contribution.
    Unconstrained,
}

impl EnergyPrior {
    /// Log-density contribution of `energy`.
    #[must_use]
    pub fn log_density(self, energy: f64) -> f64 {
        match self {
            Self::HardBound { lower, upper } => {
                if (lower..upper).contains(&energy) {
                    0.0
                } else {
                    f64::NEG_INFINITY
                }
            }
            Self::GaussianPenalty { center, scale } => {
                let offset = energy - center;
                -(offset * offset) / (2.0 * scale * scale)
            }
            Self::Unconstrained => 0.0,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        match self {
            Self::HardBound { lower, upper } => lower < upper,
            Self::GaussianPenalty { center, scale } => center.is_finite() && scale > 0.0,
            Self::Unconstrained => true,
        }
    }
}

/// Bounds and per-label priors of the MWC mutant posterior.
#[derive(Debug, Clone, PartialEq)]
pub struct MwcPriorConfig {
    /// Open interval allowed for the noise scale `sigma`.
    pub noise_scale_bounds: (f64, f64),
    /// Open interval allowed for every binding energy.
    pub energy_bounds: (f64, f64),
    /// Label-specific energy priors; labels not listed are unconstrained.
    pub label_priors: BTreeMap<String, EnergyPrior>,
}

impl Default for MwcPriorConfig {
    fn default() -> Self {
        let label_priors = BTreeMap::from([
            (
                "Q21M".to_owned(),
                EnergyPrior::HardBound {
                    lower: -18.0,
                    upper: -10.0,
                },
            ),
            (
                "wt".to_owned(),
                EnergyPrior::GaussianPenalty {
                    center: -13.9,
                    scale: 0.2,
                },
            ),
        ]);
        Self {
            noise_scale_bounds: (0.0, 0.15),
            energy_bounds: (-18.0, -5.0),
            label_priors,
        }
    }
}

impl MwcPriorConfig {
    #[must_use]
    pub fn with_label_prior(mut self, label: impl Into<String>, prior: EnergyPrior) -> Self {
        self.label_priors.insert(label.into(), prior);
        self
    }

    #[must_use]
    pub fn prior_for(&self, label: &str) -> EnergyPrior {
        self.label_priors
            .get(label)
            .copied()
            .unwrap_or(EnergyPrior::Unconstrained)
    }

    /// Whether all bounds are ordered and every label prior is valid.
    ///
    /// The noise-scale lower bound must be non-negative so that an accepted
    /// `sigma` is always strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let (noise_low, noise_high) = self.noise_scale_bounds;
        let (energy_low, energy_high) = self.energy_bounds;
        noise_low >= 0.0
            && noise_low < noise_high
            && energy_low < energy_high
            && self.label_priors.values().all(|prior| prior.is_valid())
    }
}

fn strictly_within(value: f64, (low, high): (f64, f64)) -> bool {
    value > low && value < high
}

/// Log-prior probability of `params`.
///
/// Label priors are evaluated first, in sorted label order, followed by the
/// global bounds on `sigma` and on every energy. The first violated bound
/// returns `f64::NEG_INFINITY`; otherwise the sum of the Gaussian penalties
/// (zero if no label is penalized) is returned.
///
/// # Errors
///
/// Returns `McmcError` if `params` does not carry exactly one energy per
/// dataset label.
pub fn log_prior(
    params: &ParameterSet,
    input: &McmcInput,
    prior: &MwcPriorConfig,
) -> Result<f64, McmcError> {
    let energies = params.energies_for(&input.unique_var)?;

    let mut log_prior = 0.0;
    for (label, &energy) in input.unique_var.mutants.iter().zip(&energies) {
        let contribution = prior.prior_for(label).log_density(energy);
        if contribution == f64::NEG_INFINITY {
            return Ok(f64::NEG_INFINITY);
        }
        log_prior += contribution;
    }

    if !strictly_within(params.noise_scale, prior.noise_scale_bounds) {
        return Ok(f64::NEG_INFINITY);
    }
    if energies
        .iter()
        .any(|&energy| !strictly_within(energy, prior.energy_bounds))
    {
        return Ok(f64::NEG_INFINITY);
    }

    Ok(log_prior)
}

/// [`log_prior`] on the sampler's flat vector.
///
/// # Errors
///
/// Returns `McmcError` if `param` does not match the input's layout.
pub fn log_prior_flat(
    param: &[f64],
    input: &McmcInput,
    prior: &MwcPriorConfig,
) -> Result<f64, McmcError> {
    let params = input.param_idx.unpack(param, &input.unique_var)?;
    log_prior(&params, input, prior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Observation, ObservationTable};
    use crate::models::mwc::input::mcmc_pre_process;
    use approx::assert_relative_eq;

    fn input() -> McmcInput {
        let table = ObservationTable::from_rows([
            Observation::new(0.4, 0.0, 60.0, "Q21M"),
            Observation::new(0.7, 0.0, 60.0, "wt"),
            Observation::new(0.6, 0.0, 60.0, "Y20I"),
        ]);
        mcmc_pre_process(&table).expect("valid table")
    }

    fn params(sigma: f64, q21m: f64, wt: f64) -> ParameterSet {
        ParameterSet::new(sigma, [("Q21M", q21m), ("Y20I", -9.0), ("wt", wt)])
    }

    #[test]
    fn hard_bound_rejects_energy_below_range() {
        let prior = MwcPriorConfig::default();
        let lp = log_prior(&params(0.05, -19.0, -13.9), &input(), &prior).expect("complete set");
        assert_eq!(lp, f64::NEG_INFINITY);
    }

    #[test]
    fn hard_bound_accepts_energy_inside_range() {
        let prior = MwcPriorConfig::default();
        let lp = log_prior(&params(0.05, -12.0, -13.9), &input(), &prior).expect("complete set");
        assert!(lp.is_finite());
    }

    #[test]
    fn hard_bound_upper_edge_is_exclusive() {
        let bound = EnergyPrior::HardBound {
            lower: -18.0,
            upper: -10.0,
        };
        assert_eq!(bound.log_density(-10.0), f64::NEG_INFINITY);
        assert_relative_eq!(bound.log_density(-18.0), 0.0);
    }

    #[test]
    fn noise_scale_outside_bounds_is_rejected() {
        let prior = MwcPriorConfig::default();
        for sigma in [0.2, 0.15, 0.0, -0.01, f64::NAN] {
            let lp = log_prior(&params(sigma, -15.0, -13.9), &input(), &prior)
                .expect("complete set");
            assert_eq!(lp, f64::NEG_INFINITY, "sigma = {sigma}");
        }
        let lp = log_prior(&params(0.05, -15.0, -13.9), &input(), &prior).expect("complete set");
        assert!(lp.is_finite());
    }

    #[test]
    fn wild_type_penalty_is_gaussian() {
        let prior = MwcPriorConfig::default();
        let at_center =
            log_prior(&params(0.05, -15.0, -13.9), &input(), &prior).expect("complete set");
        let shifted =
            log_prior(&params(0.05, -15.0, -13.5), &input(), &prior).expect("complete set");
        assert_relative_eq!(at_center, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(shifted, -(0.4 * 0.4) / (2.0 * 0.04), max_relative = 1.0e-9);
    }

    #[test]
    fn global_energy_bounds_apply_to_unlisted_labels() {
        let prior = MwcPriorConfig::default();
        let set = ParameterSet::new(0.05, [("Q21M", -15.0), ("Y20I", -4.0), ("wt", -13.9)]);
        assert_eq!(
            log_prior(&set, &input(), &prior).expect("complete set"),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn no_penalized_label_gives_zero() {
        let prior = MwcPriorConfig {
            label_priors: BTreeMap::new(),
            ..MwcPriorConfig::default()
        };
        let lp = log_prior(&params(0.05, -15.0, -12.0), &input(), &prior).expect("complete set");
        assert_relative_eq!(lp, 0.0);
    }

    #[test]
    fn flat_adapter_matches_named_parameters() {
        let prior = MwcPriorConfig::default();
        let flat = log_prior_flat(&[0.05, -15.0, -9.0, -13.5], &input(), &prior)
            .expect("matching layout");
        let named = log_prior(&params(0.05, -15.0, -13.5), &input(), &prior).expect("complete set");
        assert_relative_eq!(flat, named);
    }

    #[test]
    fn missing_energy_is_an_error_not_a_rejection() {
        let prior = MwcPriorConfig::default();
        let set = ParameterSet::new(0.05, [("wt", -13.9)]);
        assert!(matches!(
            log_prior(&set, &input(), &prior),
            Err(McmcError::MissingEnergy(_))
        ));
    }

    #[test]
    fn invalid_configs_are_detected() {
        assert!(MwcPriorConfig::default().is_valid());
        let negative_noise = MwcPriorConfig {
            noise_scale_bounds: (-0.1, 0.15),
            ..MwcPriorConfig::default()
        };
        assert!(!negative_noise.is_valid());
        let bad_label = MwcPriorConfig::default().with_label_prior(
            "Y20I",
            EnergyPrior::GaussianPenalty {
                center: -9.0,
                scale: 0.0,
            },
        );
        assert!(!bad_label.is_valid());
    }
}
