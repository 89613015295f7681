//! Initial positions for an ensemble of MCMC walkers.

use std::collections::BTreeMap;

use faer::Mat;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::inference::InferenceError;

use super::input::McmcInput;
use super::types::McmcError;

/// Distributions used to scatter walkers around plausible energies.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkerConfig {
    /// Uniform range of the initial noise scale.
    pub noise_scale_range: (f64, f64),
    /// Center of the initial energy of each known label (kT).
    pub reference_energies: BTreeMap<String, f64>,
    /// Standard deviation around a reference energy.
    pub reference_scale: f64,
    /// Center for labels missing from `reference_energies`.
    pub fallback_center: f64,
    /// Standard deviation for labels missing from `reference_energies`.
    pub fallback_scale: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            noise_scale_range: (1.0e-5, 0.15),
            reference_energies: BTreeMap::from([
                ("Q21A".to_owned(), -9.0),
                ("Q21M".to_owned(), -15.0),
                ("Y20I".to_owned(), -9.0),
                ("wt".to_owned(), -13.9),
            ]),
            reference_scale: 1.0,
            fallback_center: -13.9,
            fallback_scale: 3.0,
            seed: 42,
        }
    }
}

impl WalkerConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_reference_energy(mut self, label: impl Into<String>, energy: f64) -> Self {
        self.reference_energies.insert(label.into(), energy);
        self
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        let (low, high) = self.noise_scale_range;
        low.is_finite()
            && high.is_finite()
            && low < high
            && self.reference_scale > 0.0
            && self.fallback_scale > 0.0
            && self.fallback_center.is_finite()
            && self.reference_energies.values().all(|value| value.is_finite())
    }

    /// Normal distribution `(center, scale)` for the initial energy of `label`.
    #[must_use]
    pub fn energy_distribution(&self, label: &str) -> (f64, f64) {
        self.reference_energies.get(label).map_or(
            (self.fallback_center, self.fallback_scale),
            |&center| (center, self.reference_scale),
        )
    }
}

/// Draw initial walker positions for the prepared dataset.
///
/// Returns an `n_walkers x n_dim` matrix and `n_dim = 1 + n_mutants`.
/// Column 0 is uniform over the configured noise range and column
/// `1 + k` is normal around the reference energy of the `k`-th sorted label.
///
/// # Errors
///
/// Returns `McmcError::Ensemble` if `n_walkers` is zero and
/// `McmcError::InvalidWalkerConfig` if the configuration is invalid.
pub fn init_walkers(
    input: &McmcInput,
    n_walkers: usize,
    config: &WalkerConfig,
) -> Result<(Mat<f64>, usize), McmcError> {
    if n_walkers == 0 {
        return Err(InferenceError::NoWalkers.into());
    }
    if !config.is_valid() {
        return Err(McmcError::InvalidWalkerConfig);
    }

    let n_dim = input.dimension();
    let noise = input.param_idx.noise_range();
    let energy_start = input.param_idx.energy_range().start;
    let distributions: Vec<(f64, f64)> = input
        .unique_var
        .mutants
        .iter()
        .map(|label| config.energy_distribution(label))
        .collect();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (noise_low, noise_high) = config.noise_scale_range;
    let mut positions = Mat::<f64>::zeros(n_walkers, n_dim);
    for walker in 0..n_walkers {
        for col in noise.clone() {
            positions[(walker, col)] = rng.random_range(noise_low..noise_high);
        }
        for (offset, &(center, scale)) in distributions.iter().enumerate() {
            positions[(walker, energy_start + offset)] =
                scale.mul_add(sample_standard_normal(&mut rng), center);
        }
    }

    trace_info!(
        walkers = n_walkers,
        dimension = n_dim,
        seed = config.seed,
        "initialized walker positions"
    );
    Ok((positions, n_dim))
}

pub(crate) fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    let u1 = (1.0_f64 - rng.random::<f64>()).max(f64::MIN_POSITIVE);
    let u2 = rng.random::<f64>();
    (-2.0_f64 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Observation, ObservationTable};
    use crate::models::mwc::input::mcmc_pre_process;
    use crate::utils::mean;

    fn input(labels: &[&str]) -> McmcInput {
        let table = ObservationTable::from_rows(
            labels
                .iter()
                .map(|&label| Observation::new(0.5, 10.0, 260.0, label)),
        );
        mcmc_pre_process(&table).expect("valid table")
    }

    fn column(positions: &Mat<f64>, col: usize) -> Vec<f64> {
        (0..positions.nrows()).map(|row| positions[(row, col)]).collect()
    }

    #[test]
    fn shape_follows_walkers_and_labels() {
        let input = input(&["wt", "Q21M", "Y20I", "Q21A"]);
        let (positions, n_dim) =
            init_walkers(&input, 50, &WalkerConfig::default()).expect("valid");
        assert_eq!(n_dim, 5);
        assert_eq!(positions.nrows(), 50);
        assert_eq!(positions.ncols(), 5);
    }

    #[test]
    fn noise_scales_stay_in_range() {
        let input = input(&["wt"]);
        let (positions, _) = init_walkers(&input, 500, &WalkerConfig::default()).expect("valid");
        assert!(
            column(&positions, 0)
                .iter()
                .all(|&sigma| (1.0e-5..0.15).contains(&sigma))
        );
    }

    #[test]
    fn energies_center_on_reference_values() {
        // Sorted labels: Q21M, wt.
        let input = input(&["wt", "Q21M"]);
        let (positions, _) =
            init_walkers(&input, 4_000, &WalkerConfig::default()).expect("valid");
        assert!((mean(&column(&positions, 1)) + 15.0).abs() < 0.1);
        assert!((mean(&column(&positions, 2)) + 13.9).abs() < 0.1);
    }

    #[test]
    fn unknown_labels_use_fallback_distribution() {
        let config = WalkerConfig::default();
        assert_eq!(config.energy_distribution("Y17I"), (-13.9, 3.0));
        assert_eq!(config.energy_distribution("Q21M"), (-15.0, 1.0));

        let input = input(&["Y17I"]);
        let (positions, _) = init_walkers(&input, 4_000, &config).expect("valid");
        let energies = column(&positions, 1);
        let center = mean(&energies);
        let spread = (energies.iter().map(|e| (e - center).powi(2)).sum::<f64>()
            / 4_000.0)
            .sqrt();
        assert!((center + 13.9).abs() < 0.3);
        assert!((spread - 3.0).abs() < 0.3);
    }

    #[test]
    fn same_seed_gives_same_positions() {
        let input = input(&["wt", "Q21M"]);
        let config = WalkerConfig::default().with_seed(7);
        let (first, _) = init_walkers(&input, 10, &config).expect("valid");
        let (second, _) = init_walkers(&input, 10, &config).expect("valid");
        let (other, _) = init_walkers(&input, 10, &config.clone().with_seed(8)).expect("valid");
        assert_eq!(column(&first, 1), column(&second, 1));
        assert_ne!(column(&first, 1), column(&other, 1));
    }

    #[test]
    fn zero_walkers_and_bad_configs_are_errors() {
        let input = input(&["wt"]);
        assert!(matches!(
            init_walkers(&input, 0, &WalkerConfig::default()),
            Err(McmcError::Ensemble(InferenceError::NoWalkers))
        ));
        let config = WalkerConfig {
            noise_scale_range: (0.15, 1.0e-5),
            ..WalkerConfig::default()
        };
        assert!(matches!(
            init_walkers(&input, 4, &config),
            Err(McmcError::InvalidWalkerConfig)
        ));
    }
}
