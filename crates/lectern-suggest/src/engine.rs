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

//! The branch-and-bound suggestion search.
//!
//! One [`SuggestionSearch`] session owns the assignment state exclusively
//! for the duration of one request. It installs the pinned selections,
//! recursively resolves the conflicts they and the requested class's trial
//! placements induce, offers every complete assignment to the bounded
//! collector, and restores the assignment to its pre-search snapshot before
//! returning. The restore happens on every path: normal completion, bound
//! and depth prunes, timeout, and the `can_assign = false` short-circuit.
//!
//! Determinism: conflicted variables are iterated ascending by arena index
//! and candidates ascending by `(value, placement id)`, so identical inputs
//! produce identical outputs.

use std::time::{Duration, Instant};

use lectern_model::assignment::{AssignmentSnapshot, AssignmentState, PlacementRef};
use lectern_model::index::{CandidateIndex, ClassId, ClassIndex};
use lectern_model::model::TimetableModel;
use rustc_hash::FxHashMap;

use crate::builder::build_suggestion;
use crate::collector::SuggestionCollector;
use crate::err::{InvalidSelectionError, SelectionProblem, SuggestionError};
use crate::request::ComputeSuggestionsRequest;
use crate::resolver::resolve_selection;
use crate::result::{BaselineInfo, SelectionConflict, SuggestionsResult};
use crate::stats::SearchStatistics;
use crate::trail::{ConflictSet, ResolvedTrail, TrialFrame};

/// One suggestion search session. See the module docs for the contract.
pub struct SuggestionSearch<'a> {
    model: &'a TimetableModel,
    state: &'a mut AssignmentState,
    request: ComputeSuggestionsRequest,
    baseline: AssignmentSnapshot,
    conflict_set: ConflictSet,
    resolved: ResolvedTrail,
    collector: SuggestionCollector,
    stats: SearchStatistics,
    deadline: Option<Instant>,
    timeout: bool,
    hint_conflicts: FxHashMap<ClassId, Vec<String>>,
}

impl<'a> SuggestionSearch<'a> {
    /// Creates a session over the given model and assignment state.
    ///
    /// The state is borrowed mutably for the whole session; the boundary
    /// layer guarantees nothing else touches it until `run` returns.
    pub fn new(
        model: &'a TimetableModel,
        state: &'a mut AssignmentState,
        request: ComputeSuggestionsRequest,
    ) -> Self {
        let deadline = if request.time_limit_ms == 0 {
            None
        } else {
            Some(Instant::now() + Duration::from_millis(request.time_limit_ms))
        };
        let baseline = state.snapshot();
        let collector = SuggestionCollector::new(request.limit);
        Self {
            model,
            state,
            request,
            baseline,
            conflict_set: ConflictSet::new(),
            resolved: ResolvedTrail::new(),
            collector,
            stats: SearchStatistics::default(),
            deadline,
            timeout: false,
            hint_conflicts: FxHashMap::default(),
        }
    }

    /// Overrides the session's deadline, replacing the one derived from the
    /// request's time budget. Lets tests force an already-expired budget.
    #[cfg(test)]
    fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Runs the search and consumes the session.
    ///
    /// On success the assignment state equals its pre-search snapshot and
    /// the result carries the kept suggestions ascending by value. Errors
    /// are raised only before any mutation (unknown class, unresolvable
    /// selection); after the first installed hint every path restores.
    pub fn run(mut self) -> Result<SuggestionsResult, SuggestionError> {
        let started = Instant::now();

        let class = self
            .model
            .class_index(self.request.class_id)
            .ok_or_else(|| {
                InvalidSelectionError::new(self.request.class_id, SelectionProblem::UnknownClass)
            })?;
        // Committed classes are fixed externally and are never variables of
        // the search.
        if self.model.is_committed(class) {
            return Err(InvalidSelectionError::new(
                self.request.class_id,
                SelectionProblem::Committed,
            )
            .into());
        }

        // Fail fast: every selection must resolve before anything mutates.
        let hints = self
            .request
            .selections
            .iter()
            .map(|selection| resolve_selection(self.model, selection, true))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            class = %self.request.class_id,
            hints = hints.len(),
            depth = self.request.depth,
            limit = self.request.limit,
            "starting suggestion search"
        );

        let can_assign = self.install_hints(&hints);
        if can_assign {
            let roots: Vec<ClassIndex> = if hints.iter().any(|hint| hint.class == class) {
                Vec::new()
            } else {
                vec![class]
            };
            self.backtrack(self.request.depth, &roots);
        }

        self.restore_baseline();
        self.stats.set_total_time(started.elapsed());

        let base = BaselineInfo {
            value: self.model.total_value(self.state),
            criteria: self.model.criterion_values(self.state),
            unassigned: self.state.nr_unassigned(),
        };

        let mut selection_conflicts: Vec<SelectionConflict> = self
            .hint_conflicts
            .iter()
            .map(|(&class_id, descriptions)| SelectionConflict {
                class_id,
                class_name: self
                    .model
                    .class_index(class_id)
                    .map_or_else(String::new, |c| self.model.class(c).name().to_string()),
                descriptions: descriptions.clone(),
            })
            .collect();
        selection_conflicts.sort_by_key(|conflict| conflict.class_id);

        tracing::debug!(
            suggestions = self.collector.len(),
            combinations = self.stats.combinations_considered,
            timeout = self.timeout,
            elapsed = ?self.stats.time_total,
            "suggestion search finished"
        );

        Ok(SuggestionsResult {
            suggestions: self.collector.into_sorted(),
            base,
            can_assign,
            selection_conflicts,
            timeout_reached: self.timeout,
            nr_combinations_considered: self.stats.combinations_considered,
            nr_solutions: self.stats.solutions_found,
            depth: self.request.depth,
            limit: self.request.limit,
            time_limit_ms: self.request.time_limit_ms,
        })
    }

    /// Installs the pinned selections in pin order, evicting their conflicts
    /// into the conflict set. Returns false when a selection conflicts with
    /// a committed class and can therefore never be assigned; installation
    /// stops there and the search is skipped.
    fn install_hints(&mut self, hints: &[PlacementRef]) -> bool {
        for &hint in hints {
            let conflicts = self
                .model
                .conflicts_of(self.state, hint.class, hint.candidate);
            for (class_id, reasons) in
                self.model
                    .conflict_explanations(self.state, hint.class, hint.candidate)
            {
                self.hint_conflicts
                    .entry(class_id)
                    .or_default()
                    .extend(reasons);
            }
            if conflicts.contains(&hint) {
                tracing::debug!(
                    class = %self.model.class(hint.class).id(),
                    "pinned selection conflicts with a committed class"
                );
                return false;
            }
            TrialFrame::install(
                self.state,
                &mut self.conflict_set,
                hint.class,
                hint.candidate,
                conflicts,
            );
            // Pinned classes stay on the trail for the whole session: the
            // `conflicts ∩ resolved` skip must protect them from eviction,
            // and the diff lists them ahead of the searched classes.
            self.resolved.push(hint.class);
        }
        true
    }

    /// Restores the assignment to the pre-search snapshot.
    fn restore_baseline(&mut self) {
        for (i, &before) in self.baseline.iter().enumerate() {
            let class = ClassIndex::new(i);
            if self.state.placement(class) == before {
                continue;
            }
            match before {
                Some(candidate) => self.state.assign(class, candidate),
                None => {
                    self.state.unassign(class);
                }
            }
        }
        debug_assert!(
            self.state.matches_snapshot(&self.baseline),
            "suggestion search failed to restore the assignment state"
        );
    }

    /// Polls the deadline. Once tripped the flag is sticky: no new branch
    /// starts anywhere in the tree, and every opened branch unwinds through
    /// the normal rollback path.
    fn timed_out(&mut self) -> bool {
        if self.timeout {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.timeout = true;
                tracing::debug!("suggestion search hit its time budget");
            }
        }
        self.timeout
    }

    /// Candidates of a class ascending by `(value, placement id)`.
    fn ordered_candidates(&self, class: ClassIndex) -> Vec<CandidateIndex> {
        let candidates = self.model.class(class).candidates();
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[a]
                .value()
                .total_cmp(&candidates[b].value())
                .then_with(|| candidates[a].id().cmp(&candidates[b].id()))
        });
        order.into_iter().map(CandidateIndex::new).collect()
    }

    /// Admissible lower bound for the current branch: the assignment's
    /// total value plus, for every still-conflicted class, its cheapest
    /// usable candidate's local value. Every conflicted class must be
    /// reassigned before a leaf, and no reassignment can cost less than
    /// its cheapest candidate.
    fn branch_bound(&self) -> f64 {
        let mut bound = self.model.total_value(self.state);
        for (class, _) in self.conflict_set.iter() {
            let variable = self.model.class(class);
            let best = variable
                .candidates()
                .iter()
                .filter(|placement| placement.is_valid())
                .filter(|placement| {
                    !placement.is_hard()
                        || self.request.allow_break_hard
                        || variable.allow_break_hard()
                })
                .map(|placement| placement.value())
                .fold(f64::INFINITY, f64::min);
            if best.is_finite() {
                bound += best;
            }
        }
        bound
    }

    /// One recursion frame. `roots` is non-empty only at the top call: the
    /// requested class when no pinned selection already covers it.
    fn backtrack(&mut self, depth: u32, roots: &[ClassIndex]) {
        self.stats.on_combination();
        self.stats
            .on_depth_update(u64::from(self.request.depth - depth));

        // Base case: nothing left to decide, the assignment is complete.
        if roots.is_empty() && self.conflict_set.is_empty() {
            let suggestion = build_suggestion(
                self.model,
                self.state,
                &self.baseline,
                self.resolved.as_slice(),
                &self.hint_conflicts,
            );
            self.stats.on_solution_found();
            self.collector.offer(suggestion);
            return;
        }

        if depth == 0 {
            self.stats.on_pruning_depth();
            return;
        }

        if self.timed_out() {
            return;
        }

        if let Some(worst) = self.collector.worst_value() {
            if worst < self.branch_bound() {
                self.stats.on_pruning_bound();
                return;
            }
        }

        // Roots first, in caller order; afterwards the conflict set in
        // ascending class order.
        let variables: Vec<ClassIndex> = if roots.is_empty() {
            self.conflict_set.iter().map(|(class, _)| class).collect()
        } else {
            roots.to_vec()
        };

        for class in variables {
            if self.timed_out() {
                return;
            }
            if self.resolved.contains(class) {
                continue;
            }
            self.try_candidates(class, depth);
        }
    }

    /// The candidate loop for one variable: skip ladder, trial install,
    /// recursion, unconditional rollback.
    fn try_candidates(&mut self, class: ClassIndex, depth: u32) {
        let model = self.model;
        let variable = model.class(class);
        let current = self.state.placement(class);
        // Stickiness compares against the live placement when there is one,
        // else against the pre-search placement.
        let reference = current.or(self.baseline[class.get()]);

        for candidate in self.ordered_candidates(class) {
            if self.timed_out() {
                return;
            }
            if Some(candidate) == current {
                continue;
            }
            let placement = variable.candidate(candidate);
            if !placement.is_valid() {
                continue;
            }
            if placement.is_hard()
                && !self.request.allow_break_hard
                && !variable.allow_break_hard()
            {
                continue;
            }
            if let Some(reference) = reference {
                let reference = variable.candidate(reference);
                if self.request.same_time && !placement.same_time(reference) {
                    continue;
                }
                if self.request.same_room && !placement.same_rooms(reference) {
                    continue;
                }
            }

            let conflicts = model.conflicts_of(self.state, class, candidate);
            // Everything still pending plus the new conflicts must fit in the
            // remaining depth, or the branch can never reach a leaf.
            if self.conflict_set.len() + conflicts.len() > depth as usize {
                continue;
            }
            if conflicts.contains(&PlacementRef::new(class, candidate)) {
                continue;
            }
            if conflicts
                .iter()
                .any(|conflict| self.resolved.contains(conflict.class))
            {
                continue;
            }

            self.resolved.push(class);
            let frame = TrialFrame::install(
                self.state,
                &mut self.conflict_set,
                class,
                candidate,
                conflicts,
            );
            self.backtrack(depth - 1, &[]);
            frame.rollback(self.state, &mut self.conflict_set);
            self.resolved.pop(class);
        }
    }
}
