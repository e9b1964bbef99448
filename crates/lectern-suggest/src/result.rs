// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The suggestion response DTO.

use std::collections::BTreeMap;

use lectern_model::index::ClassId;
use serde::{Deserialize, Serialize};

use crate::suggestion::Suggestion;

/// The state of the timetable the search started from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineInfo {
    /// The baseline's weighted total objective.
    pub value: f64,
    /// Weighted per-criterion values of the baseline, restricted to
    /// reported criteria.
    pub criteria: BTreeMap<String, f64>,
    /// Number of unassigned classes in the baseline.
    pub unassigned: usize,
}

/// Hard conflicts a pinned selection induced, for display next to the
/// selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConflict {
    /// The conflicting class.
    pub class_id: ClassId,
    /// Display name of the conflicting class.
    pub class_name: String,
    /// Names of the violated hard constraints.
    pub descriptions: Vec<String>,
}

/// The full response of one suggestion request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsResult {
    /// The kept suggestions, ascending by objective value.
    pub suggestions: Vec<Suggestion>,
    /// The timetable the search started from.
    pub base: BaselineInfo,
    /// False when a pinned selection conflicts with a committed class and
    /// can therefore never be assigned; no search is run in that case.
    pub can_assign: bool,
    /// Hard conflicts induced by the pinned selections, ascending by class.
    pub selection_conflicts: Vec<SelectionConflict>,
    /// True when the search stopped on its wall-clock budget.
    pub timeout_reached: bool,
    /// Total combinations the search considered.
    pub nr_combinations_considered: u64,
    /// Total complete assignments found (kept or not).
    pub nr_solutions: u64,
    /// Echo of the request's depth.
    pub depth: u32,
    /// Echo of the request's limit.
    pub limit: usize,
    /// Echo of the request's time budget in milliseconds.
    pub time_limit_ms: u64,
}

impl SuggestionsResult {
    /// Returns true if the search found at least one suggestion.
    #[inline]
    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }
}
