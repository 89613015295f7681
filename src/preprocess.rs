//! Generic tidy-table helpers shared by model-specific preprocessing.

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// `value` with negative zero folded into positive zero, so that values equal
/// under `==` are also equal under `total_cmp`.
#[must_use]
pub fn canonical_value(value: f64) -> f64 {
    value + 0.0
}

/// Sorted, deduplicated copy of numeric values (IEEE total order, signed
/// zeros merged).
#[must_use]
pub fn sorted_unique_values(values: &[f64]) -> Vec<f64> {
    let mut unique: Vec<f64> = values.iter().copied().map(canonical_value).collect();
    unique.sort_by(f64::total_cmp);
    unique.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    unique
}

/// Sorted, deduplicated copy of categorical labels.
#[must_use]
pub fn sorted_unique_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Row order that sorts `len` rows by `compare`; ties keep their original
/// relative order.
#[must_use]
pub fn stable_sort_order(len: usize, compare: impl Fn(usize, usize) -> Ordering) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| compare(a, b));
    order
}

/// Running totals of group sizes, used as boundary offsets into a flat
/// parameter vector.
#[must_use]
pub fn cumulative_offsets(sizes: &[usize]) -> Vec<usize> {
    sizes
        .iter()
        .scan(0usize, |total, &size| {
            *total += size;
            Some(*total)
        })
        .collect()
}
