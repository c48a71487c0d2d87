//! Original-vs-privatized summaries for the presentation layer.
//!
//! The core does not draw anything; it hands back the binned counts a
//! plotting layer needs to show how much a release distorted a column.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Column, NumericCell};

/// Number of bins for numeric comparisons.
pub const NUMERIC_BINS: usize = 30;

/// Number of categories kept for categorical comparisons.
pub const TOP_CATEGORIES: usize = 10;

/// Label used for missing cells in categorical comparisons.
pub const MISSING_LABEL: &str = "NULL";

/// Comparison of one column before and after privatization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnComparison {
    Numeric(NumericComparison),
    Categorical(CategoricalComparison),
}

/// Histograms of original and privatized values over shared bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericComparison {
    /// `bins + 1` ascending edges
    pub bin_edges: Vec<f64>,
    pub original: Vec<u64>,
    pub privatized: Vec<u64>,
}

/// Counts for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub original: u64,
    pub privatized: u64,
}

/// The most frequent original categories with their privatized counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalComparison {
    pub categories: Vec<CategoryCount>,
}

/// Summarize `original` against its privatized counterpart.
///
/// The original column's kind decides the summary.
#[must_use]
pub fn compare_columns(original: &Column, privatized: &Column) -> ColumnComparison {
    if original.is_numeric() {
        ColumnComparison::Numeric(compare_numeric(original, privatized))
    } else {
        ColumnComparison::Categorical(compare_categorical(original, privatized))
    }
}

fn finite_values(column: &Column) -> Vec<f64> {
    column
        .values()
        .iter()
        .filter_map(|v| match v.to_numeric() {
            NumericCell::Finite(x) => Some(x),
            _ => None,
        })
        .collect()
}

fn compare_numeric(original: &Column, privatized: &Column) -> NumericComparison {
    let before = finite_values(original);
    let after = finite_values(privatized);

    let (mut lo, mut hi) = before
        .iter()
        .chain(after.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    if !lo.is_finite() {
        lo = 0.0;
        hi = 1.0;
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / NUMERIC_BINS as f64;
    let bin_edges = (0..=NUMERIC_BINS).map(|i| lo + width * i as f64).collect();
    let bin_of = |x: f64| (((x - lo) / width) as usize).min(NUMERIC_BINS - 1);

    let mut counts_before = vec![0u64; NUMERIC_BINS];
    let mut counts_after = vec![0u64; NUMERIC_BINS];
    for x in before {
        counts_before[bin_of(x)] += 1;
    }
    for x in after {
        counts_after[bin_of(x)] += 1;
    }

    NumericComparison {
        bin_edges,
        original: counts_before,
        privatized: counts_after,
    }
}

fn label_counts(column: &Column) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for value in column.values() {
        let label = value.key().unwrap_or_else(|| MISSING_LABEL.to_string());
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

fn compare_categorical(original: &Column, privatized: &Column) -> CategoricalComparison {
    let before = label_counts(original);
    let after = label_counts(privatized);

    let mut ranked: Vec<(String, u64)> = before.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_CATEGORIES);

    let categories = ranked
        .into_iter()
        .map(|(label, original)| CategoryCount {
            privatized: after.get(&label).copied().unwrap_or(0),
            label,
            original,
        })
        .collect();

    CategoricalComparison { categories }
}
