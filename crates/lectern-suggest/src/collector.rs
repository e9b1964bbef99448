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

//! The bounded, ordered suggestion collector.
//!
//! Keeps the K best suggestions seen so far under a *strict* total order:
//! objective value first (`f64::total_cmp`), canonical diff key second. The
//! tie-break makes eviction deterministic even when many leaves share one
//! objective value, and deduplicates leaves that describe the same set of
//! moves.

use std::collections::BTreeSet;

use crate::suggestion::Suggestion;

/// A suggestion together with its ordering key.
#[derive(Clone, Debug)]
struct RankedSuggestion {
    value: f64,
    diff_key: String,
    suggestion: Suggestion,
}

impl RankedSuggestion {
    fn new(suggestion: Suggestion) -> Self {
        Self {
            value: suggestion.value,
            diff_key: suggestion.diff_key(),
            suggestion,
        }
    }
}

impl Ord for RankedSuggestion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.diff_key.cmp(&other.diff_key))
    }
}

impl PartialOrd for RankedSuggestion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedSuggestion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for RankedSuggestion {}

/// The bounded collector. See the module docs for the ordering contract.
#[derive(Clone, Debug)]
pub struct SuggestionCollector {
    entries: BTreeSet<RankedSuggestion>,
    capacity: usize,
}

impl SuggestionCollector {
    /// Creates a collector keeping at most `capacity` suggestions.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeSet::new(),
            capacity,
        }
    }

    /// Returns the number of currently kept suggestions.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no suggestion is kept.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the collector is at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Returns the objective value of the worst kept suggestion.
    ///
    /// Defined only when the collector is full; a collector with spare
    /// room accepts everything, so there is no pruning threshold yet.
    #[inline]
    pub fn worst_value(&self) -> Option<f64> {
        if self.is_full() {
            self.entries.last().map(|entry| entry.value)
        } else {
            None
        }
    }

    /// Offers a suggestion. The worst kept entry is evicted when the
    /// collector runs over capacity. Callers count offers themselves; the
    /// search keeps that tally in its statistics.
    pub fn offer(&mut self, suggestion: Suggestion) {
        if self.capacity == 0 {
            return;
        }
        self.entries.insert(RankedSuggestion::new(suggestion));
        while self.entries.len() > self.capacity {
            self.entries.pop_last();
        }
    }

    /// Consumes the collector, returning the kept suggestions ascending by
    /// objective value.
    pub fn into_sorted(self) -> Vec<Suggestion> {
        self.entries
            .into_iter()
            .map(|entry| entry.suggestion)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::{ClassAssignmentChange, PlacementDetail};
    use lectern_model::index::{ClassId, PlacementId, RoomId};
    use std::collections::BTreeMap;

    fn suggestion(value: f64, class: u64, placement: u64) -> Suggestion {
        Suggestion {
            value,
            changes: vec![ClassAssignmentChange {
                class_id: ClassId::new(class),
                class_name: format!("C{}", class),
                old: None,
                new: Some(PlacementDetail {
                    placement_id: PlacementId::new(placement),
                    day_code: 0b1,
                    start_slot: 0,
                    length: 12,
                    room_ids: vec![RoomId::new(1)],
                    room_names: vec!["Room A".to_string()],
                    value,
                }),
                conflict_descriptions: Vec::new(),
            }],
            unassigned: Vec::new(),
            student_conflicts: Vec::new(),
            distribution_conflicts: Vec::new(),
            btb_instructors: Vec::new(),
            criteria: BTreeMap::new(),
        }
    }

    #[test]
    fn test_keeps_the_k_smallest() {
        let mut collector = SuggestionCollector::new(2);
        collector.offer(suggestion(5.0, 1, 10));
        collector.offer(suggestion(1.0, 1, 11));
        collector.offer(suggestion(3.0, 1, 12));
        let kept = collector.into_sorted();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].value, 1.0);
        assert_eq!(kept[1].value, 3.0);
    }

    #[test]
    fn test_worst_value_only_when_full() {
        let mut collector = SuggestionCollector::new(2);
        collector.offer(suggestion(5.0, 1, 10));
        assert_eq!(collector.worst_value(), None);
        collector.offer(suggestion(1.0, 1, 11));
        assert_eq!(collector.worst_value(), Some(5.0));
        collector.offer(suggestion(3.0, 1, 12));
        assert_eq!(collector.worst_value(), Some(3.0));
    }

    #[test]
    fn test_equal_values_break_ties_on_diff_key() {
        let mut collector = SuggestionCollector::new(1);
        collector.offer(suggestion(2.0, 1, 11));
        collector.offer(suggestion(2.0, 1, 10));
        let kept = collector.into_sorted();
        assert_eq!(kept.len(), 1);
        // "1:10" sorts before "1:11", so the later offer wins the tie.
        assert_eq!(
            kept[0].changes[0].new.as_ref().map(|d| d.placement_id),
            Some(PlacementId::new(10))
        );
    }

    #[test]
    fn test_identical_leaves_are_deduplicated() {
        let mut collector = SuggestionCollector::new(5);
        collector.offer(suggestion(2.0, 1, 10));
        collector.offer(suggestion(2.0, 1, 10));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut collector = SuggestionCollector::new(0);
        collector.offer(suggestion(2.0, 1, 10));
        assert!(collector.is_empty());
    }
}
