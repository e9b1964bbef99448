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

//! The mutable assignment store.
//!
//! `AssignmentState` is the single shared, destructively mutated resource of
//! one suggestion search: a dense `ClassIndex -> Option<CandidateIndex>` map
//! with `assign`/`unassign`. The search engine owns it exclusively for the
//! lifetime of one call and must leave it byte-for-byte identical to its
//! pre-search snapshot on every exit path.

use crate::index::{CandidateIndex, ClassIndex};

/// A reference to one candidate placement of one class.
///
/// Conflict sets and trial frames identify placements by this pair instead of
/// cloning `Placement` values; the placement data itself stays in the model's
/// candidate arenas.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PlacementRef {
    /// The class the candidate belongs to.
    pub class: ClassIndex,
    /// The candidate's position in that class's candidate list.
    pub candidate: CandidateIndex,
}

impl PlacementRef {
    /// Creates a new placement reference.
    #[inline(always)]
    pub const fn new(class: ClassIndex, candidate: CandidateIndex) -> Self {
        Self { class, candidate }
    }
}

impl std::fmt::Display for PlacementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PlacementRef(class: {}, candidate: {})",
            self.class.get(),
            self.candidate.get()
        )
    }
}

/// A full snapshot of an `AssignmentState`, used to verify and restore the
/// rollback invariant.
pub type AssignmentSnapshot = Vec<Option<CandidateIndex>>;

/// The live class -> placement mapping being searched over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentState {
    values: Vec<Option<CandidateIndex>>,
    nr_assigned: usize,
}

impl AssignmentState {
    /// Creates a new, fully unassigned state for `num_classes` classes.
    #[inline]
    pub fn new(num_classes: usize) -> Self {
        Self {
            values: vec![None; num_classes],
            nr_assigned: 0,
        }
    }

    /// Returns the number of classes this state covers.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.values.len()
    }

    /// Returns the number of currently assigned classes.
    #[inline]
    pub fn nr_assigned(&self) -> usize {
        self.nr_assigned
    }

    /// Returns the number of currently unassigned classes.
    #[inline]
    pub fn nr_unassigned(&self) -> usize {
        self.values.len() - self.nr_assigned
    }

    /// Returns the current placement of the given class, if any.
    ///
    /// # Panics
    ///
    /// Panics if `class` is out of `0..num_classes()`.
    #[inline]
    pub fn placement(&self, class: ClassIndex) -> Option<CandidateIndex> {
        self.values[class.get()]
    }

    /// Assigns the given candidate to the class, replacing any current
    /// placement.
    ///
    /// # Panics
    ///
    /// Panics if `class` is out of `0..num_classes()`.
    #[inline]
    pub fn assign(&mut self, class: ClassIndex, candidate: CandidateIndex) {
        let slot = &mut self.values[class.get()];
        if slot.is_none() {
            self.nr_assigned += 1;
        }
        *slot = Some(candidate);
    }

    /// Removes the class's current placement, returning it.
    ///
    /// # Panics
    ///
    /// Panics if `class` is out of `0..num_classes()`.
    #[inline]
    pub fn unassign(&mut self, class: ClassIndex) -> Option<CandidateIndex> {
        let slot = &mut self.values[class.get()];
        let previous = slot.take();
        if previous.is_some() {
            self.nr_assigned -= 1;
        }
        previous
    }

    /// Returns an iterator over all assigned classes in ascending index
    /// order.
    #[inline]
    pub fn assigned_classes(&self) -> impl Iterator<Item = (ClassIndex, CandidateIndex)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|c| (ClassIndex::new(i), c)))
    }

    /// Captures a snapshot of the full mapping.
    #[inline]
    pub fn snapshot(&self) -> AssignmentSnapshot {
        self.values.clone()
    }

    /// Returns true if the state equals the given snapshot.
    #[inline]
    pub fn matches_snapshot(&self, snapshot: &AssignmentSnapshot) -> bool {
        self.values == *snapshot
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AssignmentState(assigned: {}/{})",
            self.nr_assigned,
            self.values.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_unassign_update_counters() {
        let mut state = AssignmentState::new(3);
        assert_eq!(state.nr_assigned(), 0);
        assert_eq!(state.nr_unassigned(), 3);

        state.assign(ClassIndex::new(0), CandidateIndex::new(1));
        state.assign(ClassIndex::new(2), CandidateIndex::new(0));
        assert_eq!(state.nr_assigned(), 2);
        assert_eq!(
            state.placement(ClassIndex::new(0)),
            Some(CandidateIndex::new(1))
        );

        let previous = state.unassign(ClassIndex::new(0));
        assert_eq!(previous, Some(CandidateIndex::new(1)));
        assert_eq!(state.nr_assigned(), 1);
        assert_eq!(state.placement(ClassIndex::new(0)), None);
    }

    #[test]
    fn test_reassign_does_not_double_count() {
        let mut state = AssignmentState::new(1);
        state.assign(ClassIndex::new(0), CandidateIndex::new(0));
        state.assign(ClassIndex::new(0), CandidateIndex::new(1));
        assert_eq!(state.nr_assigned(), 1);
        assert_eq!(
            state.placement(ClassIndex::new(0)),
            Some(CandidateIndex::new(1))
        );
    }

    #[test]
    fn test_unassign_empty_slot_is_a_no_op() {
        let mut state = AssignmentState::new(1);
        assert_eq!(state.unassign(ClassIndex::new(0)), None);
        assert_eq!(state.nr_assigned(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = AssignmentState::new(2);
        state.assign(ClassIndex::new(1), CandidateIndex::new(3));
        let snapshot = state.snapshot();
        assert!(state.matches_snapshot(&snapshot));

        state.unassign(ClassIndex::new(1));
        assert!(!state.matches_snapshot(&snapshot));

        state.assign(ClassIndex::new(1), CandidateIndex::new(3));
        assert!(state.matches_snapshot(&snapshot));
    }

    #[test]
    fn test_assigned_classes_iterates_ascending() {
        let mut state = AssignmentState::new(4);
        state.assign(ClassIndex::new(3), CandidateIndex::new(0));
        state.assign(ClassIndex::new(1), CandidateIndex::new(2));
        let assigned: Vec<_> = state.assigned_classes().collect();
        assert_eq!(
            assigned,
            vec![
                (ClassIndex::new(1), CandidateIndex::new(2)),
                (ClassIndex::new(3), CandidateIndex::new(0)),
            ]
        );
    }
}
