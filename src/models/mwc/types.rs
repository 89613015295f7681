//! Core public types for the MWC mutant posterior.

use std::collections::BTreeMap;
use std::ops::Range;

use thiserror::Error;

use super::priors::MwcPriorConfig;
use crate::inference::InferenceError;
use crate::input::InputError;
use crate::models::thermo::{MwcConstants, ThermoError};
use crate::preprocess::cumulative_offsets;

/// Errors returned by MWC preprocessing, posterior evaluation and summaries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum McmcError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error(transparent)]
    Validation(#[from] ThermoError),
    #[error(transparent)]
    Ensemble(#[from] InferenceError),
    #[error("parameter vector has {found} entries; layout expects {expected}")]
    ParameterLengthMismatch { expected: usize, found: usize },
    #[error("no binding energy supplied for mutant `{0}`")]
    MissingEnergy(String),
    #[error("binding energy supplied for unknown mutant `{0}`")]
    UnknownMutant(String),
    #[error("invalid MWC physical constants")]
    InvalidConstants,
    #[error("invalid MWC prior configuration")]
    InvalidPriorConfig,
    #[error("invalid walker initialization configuration")]
    InvalidWalkerConfig,
    #[error("mass fraction must lie in (0, 1]; found {0}")]
    InvalidMassFraction(f64),
    #[error("posterior chain has no draws")]
    EmptyChain,
    #[error("chain has {columns} columns but {names} parameter names")]
    ChainNameMismatch { columns: usize, names: usize },
    #[error("chain has {draws} draws but {log_prob} log-probabilities")]
    ChainLengthMismatch { draws: usize, log_prob: usize },
    #[error("chain has no parameter named `{0}`")]
    UnknownParameter(String),
}

/// Sorted unique repressor copy numbers and mutant labels of a dataset.
///
/// Closed world: every value in the prepared data appears exactly once here.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueVariables {
    pub repressors: Vec<f64>,
    pub mutants: Vec<String>,
}

impl UniqueVariables {
    #[must_use]
    pub const fn n_mutants(&self) -> usize {
        self.mutants.len()
    }

    /// Position of `label` among the sorted mutant labels.
    #[must_use]
    pub fn mutant_index(&self, label: &str) -> Option<usize> {
        self.mutants
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .ok()
    }
}

/// Boundary offsets of the parameter groups inside the sampler's flat vector.
///
/// The layout is `[sigma | eps_r for each sorted mutant label]`, so the
/// offsets are `[1, 1 + n_mutants]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    offsets: Vec<usize>,
}

impl ParameterLayout {
    /// Layout with one noise scale followed by one energy per mutant.
    #[must_use]
    pub fn for_mutants(n_mutants: usize) -> Self {
        Self {
            offsets: cumulative_offsets(&[1, n_mutants]),
        }
    }

    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Length of a flat parameter vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn noise_range(&self) -> Range<usize> {
        0..self.offsets[0]
    }

    #[must_use]
    pub fn energy_range(&self) -> Range<usize> {
        self.offsets[0]..self.offsets[1]
    }

    /// Whether the offsets are strictly increasing from a non-empty first group.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.offsets.first().is_some_and(|&first| first > 0)
            && self.offsets.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Interpret a flat sampler vector as named parameters.
    ///
    /// # Errors
    ///
    /// Returns `McmcError::ParameterLengthMismatch` if `param` does not match
    /// the layout or the layout holds more energies than `unique` has labels,
    /// and `McmcError::MissingEnergy` if it holds fewer.
    pub fn unpack(
        &self,
        param: &[f64],
        unique: &UniqueVariables,
    ) -> Result<ParameterSet, McmcError> {
        if param.len() != self.dimension() {
            return Err(McmcError::ParameterLengthMismatch {
                expected: self.dimension(),
                found: param.len(),
            });
        }
        let energy_slots = &param[self.energy_range()];
        if let Some(label) = unique.mutants.get(energy_slots.len()) {
            return Err(McmcError::MissingEnergy(label.clone()));
        }
        if energy_slots.len() > unique.n_mutants() {
            return Err(McmcError::ParameterLengthMismatch {
                expected: self.noise_range().len() + unique.n_mutants(),
                found: param.len(),
            });
        }

        Ok(ParameterSet {
            noise_scale: param[self.noise_range().start],
            energies: unique
                .mutants
                .iter()
                .cloned()
                .zip(energy_slots.iter().copied())
                .collect(),
        })
    }

    /// Flatten named parameters into the sampler's vector order.
    ///
    /// # Errors
    ///
    /// Returns `McmcError` if a label is missing from or unknown to `params`.
    pub fn pack(
        &self,
        params: &ParameterSet,
        unique: &UniqueVariables,
    ) -> Result<Vec<f64>, McmcError> {
        let mut flat = vec![params.noise_scale; self.noise_range().len()];
        flat.extend(params.energies_for(unique)?);
        if flat.len() != self.dimension() {
            return Err(McmcError::ParameterLengthMismatch {
                expected: self.dimension(),
                found: flat.len(),
            });
        }
        Ok(flat)
    }

    /// Display names of the flat vector's coordinates.
    #[must_use]
    pub fn parameter_names(&self, unique: &UniqueVariables) -> Vec<String> {
        let mut names = vec![NOISE_SCALE_NAME.to_owned(); self.noise_range().len()];
        names.extend(unique.mutants.iter().map(|label| energy_name(label)));
        names
    }
}

/// Name of the noise-scale coordinate.
pub const NOISE_SCALE_NAME: &str = "sigma";

/// Name of the binding-energy coordinate of `label`.
#[must_use]
pub fn energy_name(label: &str) -> String {
    format!("eps_r[{label}]")
}

/// Named parameters of one posterior evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Shared Gaussian noise scale of the fold-change measurements.
    pub noise_scale: f64,
    /// Repressor-operator binding energy per mutant label (kT).
    pub energies: BTreeMap<String, f64>,
}

impl ParameterSet {
    #[must_use]
    pub fn new<L: Into<String>>(
        noise_scale: f64,
        energies: impl IntoIterator<Item = (L, f64)>,
    ) -> Self {
        Self {
            noise_scale,
            energies: energies
                .into_iter()
                .map(|(label, energy)| (label.into(), energy))
                .collect(),
        }
    }

    #[must_use]
    pub fn energy(&self, label: &str) -> Option<f64> {
        self.energies.get(label).copied()
    }

    /// Copy with every binding energy moved by `delta`.
    #[must_use]
    pub fn with_shifted_energies(&self, delta: f64) -> Self {
        Self {
            noise_scale: self.noise_scale,
            energies: self
                .energies
                .iter()
                .map(|(label, energy)| (label.clone(), energy + delta))
                .collect(),
        }
    }

    /// Energies aligned with `unique.mutants`.
    ///
    /// # Errors
    ///
    /// Returns `McmcError::MissingEnergy` for a dataset label without an
    /// energy and `McmcError::UnknownMutant` for an energy whose label is not
    /// in the dataset.
    pub fn energies_for(&self, unique: &UniqueVariables) -> Result<Vec<f64>, McmcError> {
        if let Some(label) = self
            .energies
            .keys()
            .find(|label| unique.mutant_index(label).is_none())
        {
            return Err(McmcError::UnknownMutant(label.clone()));
        }
        unique
            .mutants
            .iter()
            .map(|label| {
                self.energy(label)
                    .ok_or_else(|| McmcError::MissingEnergy(label.clone()))
            })
            .collect()
    }
}

/// Physical constants and prior table used by every posterior evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PosteriorConfig {
    pub constants: MwcConstants,
    pub prior: MwcPriorConfig,
}

impl PosteriorConfig {
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.constants = self.constants.with_epsilon(epsilon);
        self
    }

    /// # Errors
    ///
    /// Returns `McmcError` if the constants or the prior table are invalid.
    pub fn validate(&self) -> Result<(), McmcError> {
        if !self.constants.is_valid() {
            return Err(McmcError::InvalidConstants);
        }
        if !self.prior.is_valid() {
            return Err(McmcError::InvalidPriorConfig);
        }
        Ok(())
    }
}
