//! In-memory view state for the table

use crate::{
    pipeline::{filter_by_name, next_directive, sort_records},
    types::{LoadState, MarketRecord, SortDirective, SortField},
};
use chrono::Utc;

/// View state of one table
///
/// Holds the load state, the search term and the sort directive. The sorted
/// list is memoized and rebuilt only when the records or the directive change;
/// the search filter is applied on every [`projection`](Self::projection).
#[derive(Debug)]
pub struct ViewState {
    load: LoadState,
    search: String,
    directive: Option<SortDirective>,
    sorted: Vec<MarketRecord>,
}

impl ViewState {
    /// Creates an empty view state
    pub fn new() -> Self {
        Self {
            load: LoadState::NotLoaded,
            search: String::new(),
            directive: None,
            sorted: Vec::new(),
        }
    }

    /// Replaces the raw records wholesale
    pub fn replace_records(&mut self, records: Vec<MarketRecord>) {
        self.load = LoadState::Loaded {
            records,
            fetched_at: Utc::now(),
        };
        self.resort();
    }

    /// Records a failed fetch
    ///
    /// Previously loaded data is kept; only an unloaded table moves to `Failed`.
    /// Returns true when the state changed.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> bool {
        if self.load.is_loaded() {
            return false;
        }
        self.load = LoadState::Failed {
            reason: reason.into(),
            failed_at: Utc::now(),
        };
        true
    }

    /// Sets the search term
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Applies a click on the sort control for `field` and returns the new directive
    pub fn click_sort(&mut self, field: SortField) -> SortDirective {
        let directive = next_directive(self.directive, field);
        self.set_directive(Some(directive));
        directive
    }

    /// Sets or clears the directive
    pub fn set_directive(&mut self, directive: Option<SortDirective>) {
        if self.directive == directive {
            return;
        }
        self.directive = directive;
        self.resort();
    }

    fn resort(&mut self) {
        self.sorted = sort_records(self.load.records(), self.directive);
    }

    /// Sorted then filtered records
    pub fn projection(&self) -> Vec<MarketRecord> {
        filter_by_name(&self.sorted, &self.search)
    }

    /// Sorted records without the search filter
    pub fn sorted(&self) -> &[MarketRecord] {
        &self.sorted
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn directive(&self) -> Option<SortDirective> {
        self.directive
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
