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

//! Undo machinery for the suggestion search.
//!
//! The search mutates one shared [`AssignmentState`] destructively and must
//! leave it untouched when it returns. Every trial installation is recorded
//! in a [`TrialFrame`] that captures exactly what changed; `rollback`
//! replays the frame in reverse on every exit path, so the state after a
//! subtree equals the state before it regardless of how the subtree ended.

use std::collections::BTreeMap;

use lectern_model::assignment::{AssignmentState, PlacementRef};
use lectern_model::index::{CandidateIndex, ClassIndex};

/// The classes evicted so far and the placements they were evicted from.
///
/// Iteration is ascending by class index, which fixes the variable
/// selection order of the search and makes results independent of
/// insertion history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConflictSet {
    entries: BTreeMap<ClassIndex, PlacementRef>,
}

impl ConflictSet {
    /// Creates an empty conflict set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of outstanding conflicts.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no conflict is outstanding.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the class has an outstanding conflict.
    #[inline]
    pub fn contains(&self, class: ClassIndex) -> bool {
        self.entries.contains_key(&class)
    }

    /// Records the placement a class was evicted from, returning any prior
    /// entry.
    #[inline]
    pub fn insert(&mut self, class: ClassIndex, place: PlacementRef) -> Option<PlacementRef> {
        self.entries.insert(class, place)
    }

    /// Removes and returns the class's entry.
    #[inline]
    pub fn remove(&mut self, class: ClassIndex) -> Option<PlacementRef> {
        self.entries.remove(&class)
    }

    /// Returns the first conflicted class in ascending index order.
    #[inline]
    pub fn first_class(&self) -> Option<ClassIndex> {
        self.entries.keys().next().copied()
    }

    /// Iterates over the outstanding conflicts in ascending class order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (ClassIndex, PlacementRef)> + '_ {
        self.entries.iter().map(|(&class, &place)| (class, place))
    }
}

/// The classes the search is currently resolving, in resolution order.
///
/// Doubles as a guard: a class on the trail has a trial placement installed
/// above, so evicting it again would corrupt the undo chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedTrail {
    classes: Vec<ClassIndex>,
}

impl ResolvedTrail {
    /// Creates an empty trail.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the class is currently being resolved.
    #[inline]
    pub fn contains(&self, class: ClassIndex) -> bool {
        self.classes.contains(&class)
    }

    /// Pushes a class onto the trail.
    #[inline]
    pub fn push(&mut self, class: ClassIndex) {
        self.classes.push(class);
    }

    /// Pops the most recently pushed class.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the popped class is not `class`.
    #[inline]
    pub fn pop(&mut self, class: ClassIndex) {
        let popped = self.classes.pop();
        debug_assert!(
            popped == Some(class),
            "called `ResolvedTrail::pop` out of order"
        );
        let _ = popped;
    }

    /// Returns the trail in resolution order.
    #[inline]
    pub fn as_slice(&self) -> &[ClassIndex] {
        &self.classes
    }
}

/// The undo record of one trial installation.
///
/// Captures the three things `install` changes: the variable's prior
/// placement, the placements the trial evicted, and the variable's own
/// conflict-set entry. `rollback` restores all three.
#[derive(Clone, Debug)]
pub struct TrialFrame {
    class: ClassIndex,
    candidate: CandidateIndex,
    previous: Option<CandidateIndex>,
    evicted: Vec<PlacementRef>,
    prior_entry: Option<PlacementRef>,
}

impl TrialFrame {
    /// Installs a trial placement: unassigns every conflicting placement,
    /// assigns the trial, moves the evicted placements into the conflict
    /// set, and clears the variable's own entry (it is being resolved right
    /// now). Returns the frame that undoes all of it.
    pub fn install(
        state: &mut AssignmentState,
        conflict_set: &mut ConflictSet,
        class: ClassIndex,
        candidate: CandidateIndex,
        conflicts: Vec<PlacementRef>,
    ) -> Self {
        let previous = state.placement(class);
        for conflict in &conflicts {
            let unassigned = state.unassign(conflict.class);
            debug_assert!(
                unassigned == Some(conflict.candidate),
                "called `TrialFrame::install` with a stale conflict list"
            );
        }
        state.assign(class, candidate);
        for conflict in &conflicts {
            conflict_set.insert(conflict.class, *conflict);
        }
        let prior_entry = conflict_set.remove(class);
        Self {
            class,
            candidate,
            previous,
            evicted: conflicts,
            prior_entry,
        }
    }

    /// The class whose placement this frame trialled.
    #[inline]
    pub const fn class(&self) -> ClassIndex {
        self.class
    }

    /// The trialled candidate.
    #[inline]
    pub const fn candidate(&self) -> CandidateIndex {
        self.candidate
    }

    /// Undoes the installation, restoring the assignment state and the
    /// conflict set exactly as they were before `install`.
    pub fn rollback(self, state: &mut AssignmentState, conflict_set: &mut ConflictSet) {
        match self.previous {
            Some(previous) => state.assign(self.class, previous),
            None => {
                state.unassign(self.class);
            }
        }
        for conflict in &self.evicted {
            state.assign(conflict.class, conflict.candidate);
            conflict_set.remove(conflict.class);
        }
        if let Some(entry) = self.prior_entry {
            conflict_set.insert(self.class, entry);
        }
    }
}
