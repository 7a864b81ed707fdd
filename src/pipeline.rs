//! Derived view pipeline: raw records -> sort -> name filter
//!
//! Sorting is a full stable resort on every directive change. Filtering is
//! applied afterwards and never touches the sorted list itself.

use crate::types::{MarketRecord, SortDirection, SortDirective, SortField};
use std::cmp::Ordering;

/// Computes the directive that a click on `field` produces
///
/// Same field while ascending flips to descending. Every other case
/// (no directive, another field, or already descending) is ascending.
pub fn next_directive(current: Option<SortDirective>, field: SortField) -> SortDirective {
    let direction = match current {
        Some(active)
            if active.field == field && active.direction == SortDirection::Ascending =>
        {
            SortDirection::Descending
        }
        _ => SortDirection::Ascending,
    };
    SortDirective::new(field, direction)
}

/// Ascending order of two optional values; a missing value compares as zero
fn compare_values(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))
}

/// Compares two records under a directive; equal values compare equal
pub fn compare_records(a: &MarketRecord, b: &MarketRecord, directive: SortDirective) -> Ordering {
    let ordering = compare_values(a.sort_value(directive.field), b.sort_value(directive.field));
    match directive.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Returns a copy of `records` sorted by `directive`, or in input order when there is none
pub fn sort_records(
    records: &[MarketRecord],
    directive: Option<SortDirective>,
) -> Vec<MarketRecord> {
    let mut sorted = records.to_vec();
    if let Some(directive) = directive {
        // sort_by is stable: ties keep their input order
        sorted.sort_by(|a, b| compare_records(a, b, directive));
    }
    sorted
}

/// Keeps the records whose display name contains `term`, ignoring case
pub fn filter_by_name(records: &[MarketRecord], term: &str) -> Vec<MarketRecord> {
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Sort then filter in one call
pub fn derive_projection(
    records: &[MarketRecord],
    directive: Option<SortDirective>,
    term: &str,
) -> Vec<MarketRecord> {
    filter_by_name(&sort_records(records, directive), term)
}
