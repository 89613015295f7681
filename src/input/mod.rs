//! # Model inputs
//!
//! Defines the tidy observation table consumed by the preprocessor: one row
//! per fold-change measurement with its inducer concentration, repressor copy
//! number and mutant label. The column names are a contract with the loader
//! that produces the table and are exported as constants.
//!
//! # Examples
//!
//! ```
//! use mwc_mutants::{Observation, ObservationTable};
//!
//! let table = ObservationTable::from_rows([
//!     Observation::new(0.8, 0.0, 60.0, "wt"),
//!     Observation::new(0.9, 100.0, 60.0, "wt"),
//! ]);
//!
//! assert!(table.validate().is_ok());
//! assert_eq!(table.n_rows(), 2);
//! ```
//!
//! ```
//! use mwc_mutants::ObservationTable;
//!
//! let table = ObservationTable::new(vec![0.5], vec![0.0, 1.0], vec![60.0], vec!["wt".into()]);
//! assert!(table.validate().is_err());
//! ```

use thiserror::Error;

/// Experimental fold-change column.
pub const FOLD_CHANGE_COLUMN: &str = "fold_change";
/// Inducer (IPTG) concentration column, in µM.
pub const INDUCER_COLUMN: &str = "IPTGuM";
/// Mean repressor copy number column.
pub const REPRESSORS_COLUMN: &str = "repressors";
/// Mutant / operator category label column.
pub const MUTANT_COLUMN: &str = "mutant";
/// Optional repressor-operator binding energy column.
pub const BINDING_ENERGY_COLUMN: &str = "binding_energy";

/// Errors returned when validating observation tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("observation table must contain at least one row")]
    EmptyTable,
    #[error("column `{column}` has {len} entries but the table has {rows} rows")]
    ColumnLengthMismatch {
        column: &'static str,
        len: usize,
        rows: usize,
    },
    #[error("column `{column}` contains non-finite values")]
    NonFiniteColumn { column: &'static str },
    #[error("row {row} has an empty mutant label")]
    EmptyMutantLabel { row: usize },
    #[error("column `{column}` is required but missing")]
    MissingColumn { column: &'static str },
}

/// A single tidy measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub fold_change: f64,
    pub inducer_conc: f64,
    pub repressors: f64,
    pub mutant: String,
    pub binding_energy: Option<f64>,
}

impl Observation {
    #[must_use]
    pub fn new(
        fold_change: f64,
        inducer_conc: f64,
        repressors: f64,
        mutant: impl Into<String>,
    ) -> Self {
        Self {
            fold_change,
            inducer_conc,
            repressors,
            mutant: mutant.into(),
            binding_energy: None,
        }
    }

    #[must_use]
    pub const fn with_binding_energy(mut self, binding_energy: f64) -> Self {
        self.binding_energy = Some(binding_energy);
        self
    }
}

/// Column-oriented tidy table of fold-change measurements.
///
/// Rows are immutable once loaded; every consumer works on borrowed views or
/// on the preprocessed copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    pub fold_change: Vec<f64>,
    pub inducer_conc: Vec<f64>,
    pub repressors: Vec<f64>,
    pub mutant: Vec<String>,
    pub binding_energy: Option<Vec<f64>>,
}

impl ObservationTable {
    #[must_use]
    pub const fn new(
        fold_change: Vec<f64>,
        inducer_conc: Vec<f64>,
        repressors: Vec<f64>,
        mutant: Vec<String>,
    ) -> Self {
        Self {
            fold_change,
            inducer_conc,
            repressors,
            mutant,
            binding_energy: None,
        }
    }

    /// Build a table from row records.
    ///
    /// The binding-energy column is kept only if every row carries a value.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = Observation>) -> Self {
        let mut table = Self::default();
        let mut energies = Vec::new();
        let mut all_energies = true;
        for row in rows {
            table.fold_change.push(row.fold_change);
            table.inducer_conc.push(row.inducer_conc);
            table.repressors.push(row.repressors);
            table.mutant.push(row.mutant);
            match row.binding_energy {
                Some(value) => energies.push(value),
                None => all_energies = false,
            }
        }
        if all_energies && !table.fold_change.is_empty() {
            table.binding_energy = Some(energies);
        }
        table
    }

    #[must_use]
    pub fn with_binding_energy(mut self, binding_energy: Vec<f64>) -> Self {
        self.binding_energy = Some(binding_energy);
        self
    }

    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.fold_change.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fold_change.is_empty()
    }

    /// Row `index` as an owned record.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Observation> {
        if index >= self.n_rows() {
            return None;
        }
        Some(Observation {
            fold_change: self.fold_change[index],
            inducer_conc: self.inducer_conc[index],
            repressors: self.repressors[index],
            mutant: self.mutant[index].clone(),
            binding_energy: self
                .binding_energy
                .as_ref()
                .and_then(|energies| energies.get(index).copied()),
        })
    }

    /// Validate column shapes and values.
    ///
    /// Negative concentrations and copy numbers are not rejected here; the
    /// model functions raise those as validation errors at evaluation time.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if columns disagree in length, contain non-finite
    /// values, or a mutant label is empty.
    pub fn validate(&self) -> Result<(), InputError> {
        let rows = self.n_rows();
        check_length(INDUCER_COLUMN, self.inducer_conc.len(), rows)?;
        check_length(REPRESSORS_COLUMN, self.repressors.len(), rows)?;
        check_length(MUTANT_COLUMN, self.mutant.len(), rows)?;
        if let Some(energies) = &self.binding_energy {
            check_length(BINDING_ENERGY_COLUMN, energies.len(), rows)?;
        }

        check_finite(FOLD_CHANGE_COLUMN, &self.fold_change)?;
        check_finite(INDUCER_COLUMN, &self.inducer_conc)?;
        check_finite(REPRESSORS_COLUMN, &self.repressors)?;
        if let Some(energies) = &self.binding_energy {
            check_finite(BINDING_ENERGY_COLUMN, energies)?;
        }

        if let Some(row) = self.mutant.iter().position(|label| label.trim().is_empty()) {
            return Err(InputError::EmptyMutantLabel { row });
        }
        Ok(())
    }

    /// Permuted copy of the table; `order[i]` is the source row of row `i`.
    ///
    /// A shorter `order` selects a subset of rows.
    ///
    /// # Panics
    ///
    /// Panics if any entry of `order` is not a row index of the table.
    #[must_use]
    pub fn reordered(&self, order: &[usize]) -> Self {
        Self {
            fold_change: order.iter().map(|&i| self.fold_change[i]).collect(),
            inducer_conc: order.iter().map(|&i| self.inducer_conc[i]).collect(),
            repressors: order.iter().map(|&i| self.repressors[i]).collect(),
            mutant: order.iter().map(|&i| self.mutant[i].clone()).collect(),
            binding_energy: self
                .binding_energy
                .as_ref()
                .map(|energies| order.iter().map(|&i| energies[i]).collect()),
        }
    }
}

const fn check_length(column: &'static str, len: usize, rows: usize) -> Result<(), InputError> {
    if len == rows {
        Ok(())
    } else {
        Err(InputError::ColumnLengthMismatch { column, len, rows })
    }
}

fn check_finite(column: &'static str, values: &[f64]) -> Result<(), InputError> {
    if crate::utils::slice_is_finite(values) {
        Ok(())
    } else {
        Err(InputError::NonFiniteColumn { column })
    }
}
