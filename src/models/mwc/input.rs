//! Preprocessing of a tidy observation table into the sampler's view.

use faer::Mat;

use crate::input::{InputError, ObservationTable};
use crate::models::matrix_ops::{select_column, select_rows};
use crate::preprocess::{
    canonical_value, sorted_unique_labels, sorted_unique_values, stable_sort_order,
};
use crate::utils::usize_to_f64;

use super::types::{McmcError, ParameterLayout, UniqueVariables};

/// Numeric columns of [`McmcData::values`].
pub const FOLD_CHANGE: usize = 0;
pub const INDUCER: usize = 1;
pub const REPRESSORS: usize = 2;
const N_NUMERIC_COLUMNS: usize = 3;

/// Observations sorted by repressor copy number, then mutant label, then
/// inducer concentration.
#[derive(Debug, Clone)]
pub struct McmcData {
    /// `n_rows x 3` matrix of fold-change, inducer and repressor columns.
    pub values: Mat<f64>,
    /// Mutant label of each row.
    pub mutants: Vec<String>,
}

impl McmcData {
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Rows whose repressor copy number equals `repressors` and whose label
    /// equals `mutant`, in data order.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn block_rows(&self, repressors: f64, mutant: &str) -> Vec<usize> {
        // Copy numbers come straight from the table; exact equality is the key.
        (0..self.n_rows())
            .filter(|&row| {
                self.values[(row, REPRESSORS)] == repressors && self.mutants[row] == mutant
            })
            .collect()
    }

    #[must_use]
    pub fn column(&self, column: usize, rows: &[usize]) -> Vec<f64> {
        select_column(&self.values, column, rows)
    }
}

impl PartialEq for McmcData {
    fn eq(&self, other: &Self) -> bool {
        self.mutants == other.mutants
            && self.values.nrows() == other.values.nrows()
            && self.values.ncols() == other.values.ncols()
            && (0..self.values.nrows()).all(|row| {
                (0..self.values.ncols()).all(|col| {
                    self.values[(row, col)].to_bits() == other.values[(row, col)].to_bits()
                })
            })
    }
}

/// Everything the posterior needs from a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct McmcInput {
    pub unique_var: UniqueVariables,
    pub param_idx: ParameterLayout,
    pub data: McmcData,
}

impl McmcInput {
    /// Length of the flat parameter vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.param_idx.dimension()
    }

    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.data.n_rows()
    }

    /// Number of fold-change measurements as a float, for normalization terms.
    #[must_use]
    pub fn n_observations_f64(&self) -> f64 {
        usize_to_f64(self.n_observations())
    }
}

/// Prepare a tidy observation table for posterior evaluation.
///
/// Rows are sorted stably by repressor copy number, mutant label and inducer
/// concentration. The unique repressor values and labels are extracted in
/// ascending order and the flat parameter layout becomes
/// `[sigma | one energy per label]`.
///
/// # Errors
///
/// Returns `McmcError::InvalidInput` if the table is empty, its columns
/// disagree in length, or it contains non-finite values or blank labels.
pub fn mcmc_pre_process(table: &ObservationTable) -> Result<McmcInput, McmcError> {
    table.validate()?;
    if table.is_empty() {
        return Err(InputError::EmptyTable.into());
    }

    // Signed zeros are merged so that sorting, unique values and the block
    // filter all agree on equality.
    let repressors: Vec<f64> = table.repressors.iter().copied().map(canonical_value).collect();
    let inducer: Vec<f64> = table.inducer_conc.iter().copied().map(canonical_value).collect();

    let order = stable_sort_order(table.n_rows(), |a, b| {
        repressors[a]
            .total_cmp(&repressors[b])
            .then_with(|| table.mutant[a].cmp(&table.mutant[b]))
            .then_with(|| inducer[a].total_cmp(&inducer[b]))
    });

    let raw = Mat::from_fn(table.n_rows(), N_NUMERIC_COLUMNS, |row, col| match col {
        FOLD_CHANGE => table.fold_change[row],
        INDUCER => inducer[row],
        _ => repressors[row],
    });
    let data = McmcData {
        values: select_rows(&raw, &order),
        mutants: order.iter().map(|&row| table.mutant[row].clone()).collect(),
    };

    let unique_var = UniqueVariables {
        repressors: sorted_unique_values(&repressors),
        mutants: sorted_unique_labels(&table.mutant),
    };
    let param_idx = ParameterLayout::for_mutants(unique_var.n_mutants());

    trace_debug!(
        rows = data.n_rows(),
        repressors = unique_var.repressors.len(),
        mutants = unique_var.n_mutants(),
        "prepared MWC mutant input"
    );

    Ok(McmcInput {
        unique_var,
        param_idx,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Observation;

    fn table() -> ObservationTable {
        ObservationTable::from_rows([
            Observation::new(0.9, 50.0, 260.0, "wt"),
            Observation::new(0.2, 0.0, 60.0, "wt"),
            Observation::new(0.5, 25.0, 60.0, "Q21M"),
            Observation::new(0.3, 0.0, 60.0, "Q21M"),
            Observation::new(0.8, 50.0, 60.0, "wt"),
        ])
    }

    #[test]
    fn extracts_sorted_unique_values() {
        let input = mcmc_pre_process(&table()).expect("valid table");
        assert_eq!(input.unique_var.repressors, vec![60.0, 260.0]);
        assert_eq!(input.unique_var.mutants, vec!["Q21M", "wt"]);
        assert_eq!(input.param_idx.offsets(), &[1, 3]);
        assert_eq!(input.dimension(), 3);
    }

    #[test]
    fn sorts_rows_by_repressors_mutant_and_inducer() {
        let input = mcmc_pre_process(&table()).expect("valid table");
        let data = &input.data;
        assert_eq!(data.mutants, vec!["Q21M", "Q21M", "wt", "wt", "wt"]);
        let inducer: Vec<f64> = (0..data.n_rows()).map(|r| data.values[(r, INDUCER)]).collect();
        assert_eq!(inducer, vec![0.0, 25.0, 0.0, 50.0, 50.0]);
        let fold_change: Vec<f64> = (0..data.n_rows())
            .map(|r| data.values[(r, FOLD_CHANGE)])
            .collect();
        assert_eq!(fold_change, vec![0.3, 0.5, 0.2, 0.8, 0.9]);
    }

    #[test]
    fn block_rows_select_one_repressor_mutant_pair() {
        let input = mcmc_pre_process(&table()).expect("valid table");
        assert_eq!(input.data.block_rows(60.0, "wt"), vec![2, 3]);
        assert_eq!(input.data.block_rows(260.0, "wt"), vec![4]);
        assert!(input.data.block_rows(260.0, "Q21M").is_empty());
    }

    #[test]
    fn signed_zero_repressors_form_one_block() {
        let table = ObservationTable::from_rows([
            Observation::new(0.5, 0.0, 0.0, "wt"),
            Observation::new(0.5, 10.0, -0.0, "wt"),
        ]);
        let input = mcmc_pre_process(&table).expect("valid table");
        assert_eq!(input.unique_var.repressors.len(), 1);
        assert_eq!(input.data.block_rows(input.unique_var.repressors[0], "wt"), vec![0, 1]);
        assert!(
            (0..input.n_observations())
                .all(|row| input.data.values[(row, REPRESSORS)].to_bits() == 0.0_f64.to_bits())
        );
    }

    #[test]
    fn single_mutant_gives_two_dimensional_layout() {
        let table = ObservationTable::from_rows([
            Observation::new(0.4, 0.0, 60.0, "wt"),
            Observation::new(0.6, 10.0, 60.0, "wt"),
        ]);
        let input = mcmc_pre_process(&table).expect("valid table");
        assert_eq!(input.param_idx.offsets(), &[1, 2]);
    }

    #[test]
    fn rejects_empty_and_malformed_tables() {
        assert_eq!(
            mcmc_pre_process(&ObservationTable::default()),
            Err(McmcError::InvalidInput(InputError::EmptyTable))
        );

        let mut ragged = table();
        ragged.inducer_conc.pop();
        assert!(matches!(
            mcmc_pre_process(&ragged),
            Err(McmcError::InvalidInput(InputError::ColumnLengthMismatch { .. }))
        ));
    }

    #[test]
    fn permuted_rows_prepare_identically() {
        let original = table();
        let permuted = original.reordered(&[4, 2, 0, 3, 1]);
        assert_eq!(
            mcmc_pre_process(&original).expect("valid table"),
            mcmc_pre_process(&permuted).expect("valid table")
        );
    }
}
