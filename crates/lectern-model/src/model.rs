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

//! The immutable timetable model.
//!
//! A [`TimetableModel`] is an arena/index representation of one timetabling
//! problem: classes with their ordered candidate placements, rooms,
//! instructors, distribution constraints, student-enrollment overlap pairs
//! (jenrl pairs), and the weighted criteria that make up the objective.
//!
//! The model is assembled once through a [`TimetableModelBuilder`], validated
//! eagerly on `build()`, and never mutated afterwards. All mutable search
//! state lives in [`AssignmentState`](crate::assignment::AssignmentState);
//! every query on the model takes the state by shared reference.
//!
//! Identifier conventions:
//! - `ClassId`, `RoomId`, `InstructorId`, `PlacementId` are stable external
//!   identifiers, preserved across model rebuilds.
//! - `ClassIndex`, `ConstraintIndex`, `CandidateIndex` are dense arena
//!   positions, valid only against the model that produced them.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::assignment::{AssignmentState, PlacementRef};
use crate::index::{
    CandidateIndex, ClassId, ClassIndex, ConstraintIndex, InstructorId, RoomId,
};
use crate::placement::Placement;

/// The pairwise semantics of a distribution constraint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DistributionKind {
    /// Member classes must meet concurrently (shared days, intersecting
    /// slot ranges).
    SameTime,
    /// Member classes must not overlap in time at all.
    DifferentTime,
}

impl DistributionKind {
    /// Returns true if the two placements satisfy this constraint pairwise.
    #[inline]
    pub fn is_satisfied(&self, first: &Placement, second: &Placement) -> bool {
        match self {
            DistributionKind::SameTime => {
                first.time().shares_days(second.time())
                    && first.time().shares_hours(second.time())
            }
            DistributionKind::DifferentTime => !first.time().overlaps(second.time()),
        }
    }
}

impl std::fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionKind::SameTime => write!(f, "Same Time"),
            DistributionKind::DifferentTime => write!(f, "Different Time"),
        }
    }
}

/// A distribution constraint over a set of classes.
#[derive(Clone, Debug)]
pub struct DistributionConstraint {
    name: String,
    kind: DistributionKind,
    hard: bool,
    preference: f64,
    members: Vec<ClassIndex>,
}

impl DistributionConstraint {
    /// Returns the constraint's display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the constraint's pairwise semantics.
    #[inline]
    pub const fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// Returns true if a violation of this constraint is a hard conflict.
    #[inline]
    pub const fn is_hard(&self) -> bool {
        self.hard
    }

    /// Returns the preference weight charged per violated soft constraint.
    #[inline]
    pub const fn preference(&self) -> f64 {
        self.preference
    }

    /// Returns the member classes, in the order they were added.
    #[inline]
    pub fn members(&self) -> &[ClassIndex] {
        &self.members
    }
}

/// A student-enrollment overlap pair between two classes.
///
/// The pair is *active* when both classes are assigned and their placements
/// overlap in time; an active pair puts `students` joint enrollments into a
/// student conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JenrlPair {
    first: ClassIndex,
    second: ClassIndex,
    students: u32,
}

impl JenrlPair {
    /// Returns the first class of the pair.
    #[inline]
    pub const fn first(&self) -> ClassIndex {
        self.first
    }

    /// Returns the second class of the pair.
    #[inline]
    pub const fn second(&self) -> ClassIndex {
        self.second
    }

    /// Returns the number of jointly enrolled students.
    #[inline]
    pub const fn students(&self) -> u32 {
        self.students
    }

    /// Given one endpoint, returns the other.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `class` is neither endpoint.
    #[inline]
    pub fn other(&self, class: ClassIndex) -> ClassIndex {
        debug_assert!(
            class == self.first || class == self.second,
            "called `JenrlPair::other` with a class that is not an endpoint"
        );
        if class == self.first {
            self.second
        } else {
            self.first
        }
    }
}

/// An instructor known to the model.
#[derive(Clone, Debug)]
pub struct Instructor {
    id: InstructorId,
    name: String,
    btb_preference: f64,
}

impl Instructor {
    /// Returns the instructor's stable identifier.
    #[inline]
    pub const fn id(&self) -> InstructorId {
        self.id
    }

    /// Returns the instructor's display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the preference charged when two of this instructor's classes
    /// meet back to back.
    #[inline]
    pub const fn btb_preference(&self) -> f64 {
        self.btb_preference
    }
}

/// A room known to the model.
#[derive(Clone, Debug)]
pub struct Room {
    id: RoomId,
    name: String,
}

impl Room {
    /// Returns the room's stable identifier.
    #[inline]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Returns the room's display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The kind of an objective criterion.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CriterionKind {
    /// Sum of time preferences over assigned placements.
    TimePreferences,
    /// Sum of room preferences over assigned placements.
    RoomPreferences,
    /// Jointly enrolled students on active overlap pairs.
    StudentConflicts,
    /// Preferences of violated soft distribution constraints.
    DistributionPreferences,
    /// Back-to-back preferences of instructors.
    BackToBackInstructor,
}

/// One named, weighted component of the objective.
#[derive(Clone, Debug)]
pub struct Criterion {
    name: String,
    kind: CriterionKind,
    weight: f64,
    reported: bool,
}

impl Criterion {
    /// Returns the criterion's display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the criterion's kind.
    #[inline]
    pub const fn kind(&self) -> CriterionKind {
        self.kind
    }

    /// Returns the criterion's weight in the total objective.
    #[inline]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns true if the criterion appears in per-criterion report maps.
    ///
    /// Helper criteria (delta-style bookkeeping values) contribute to the
    /// total but are kept out of the maps shown to users.
    #[inline]
    pub const fn is_reported(&self) -> bool {
        self.reported
    }
}

/// One schedulable class and its candidate placements.
#[derive(Clone, Debug)]
pub struct ClassVariable {
    id: ClassId,
    name: String,
    candidates: Vec<Placement>,
    committed: bool,
    allow_break_hard: bool,
    required_rooms: usize,
    room_candidates: Vec<RoomId>,
    instructors: Vec<InstructorId>,
    constraints: Vec<ConstraintIndex>,
    jenrls: Vec<usize>,
}

impl ClassVariable {
    /// Returns the class's stable identifier.
    #[inline]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    /// Returns the class's display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered candidate placements.
    #[inline]
    pub fn candidates(&self) -> &[Placement] {
        &self.candidates
    }

    /// Returns the candidate at the given position.
    ///
    /// # Panics
    ///
    /// Panics if `candidate` is not in `0..candidates().len()`.
    #[inline]
    pub fn candidate(&self, candidate: CandidateIndex) -> &Placement {
        debug_assert!(
            candidate.get() < self.candidates.len(),
            "called `ClassVariable::candidate` with candidate index out of bounds: the len is {} but the index is {}",
            self.candidates.len(),
            candidate.get()
        );
        &self.candidates[candidate.get()]
    }

    /// Returns true if the class belongs to the committed timetable and must
    /// never be moved.
    #[inline]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Returns true if the class may take placements flagged as hard.
    #[inline]
    pub const fn allow_break_hard(&self) -> bool {
        self.allow_break_hard
    }

    /// Returns the number of rooms every placement of this class must carry.
    #[inline]
    pub const fn required_rooms(&self) -> usize {
        self.required_rooms
    }

    /// Returns the rooms this class may be placed into.
    #[inline]
    pub fn room_candidates(&self) -> &[RoomId] {
        &self.room_candidates
    }

    /// Returns the instructors teaching this class.
    #[inline]
    pub fn instructors(&self) -> &[InstructorId] {
        &self.instructors
    }

    /// Returns the distribution constraints this class participates in.
    #[inline]
    pub fn constraints(&self) -> &[ConstraintIndex] {
        &self.constraints
    }

    /// Returns the indices of the overlap pairs this class participates in.
    #[inline]
    pub fn jenrl_pairs(&self) -> &[usize] {
        &self.jenrls
    }

    #[inline]
    fn shares_instructor(&self, other: &ClassVariable) -> bool {
        self.instructors
            .iter()
            .any(|i| other.instructors.contains(i))
    }
}

impl std::fmt::Display for ClassVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ClassVariable(id: {}, name: {}, candidates: {})",
            self.id,
            self.name,
            self.candidates.len()
        )
    }
}

/// The immutable timetable model. See the module docs for an overview.
#[derive(Clone, Debug)]
pub struct TimetableModel {
    classes: Vec<ClassVariable>,
    rooms: Vec<Room>,
    instructors: Vec<Instructor>,
    constraints: Vec<DistributionConstraint>,
    jenrl_pairs: Vec<JenrlPair>,
    criteria: Vec<Criterion>,
    class_lookup: FxHashMap<ClassId, ClassIndex>,
    room_lookup: FxHashMap<RoomId, usize>,
    instructor_lookup: FxHashMap<InstructorId, usize>,
    instructor_classes: Vec<Vec<ClassIndex>>,
}

impl TimetableModel {
    /// Returns the number of classes in the model.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Returns the class at the given arena position.
    ///
    /// # Panics
    ///
    /// Panics if `class` is not in `0..num_classes()`.
    #[inline]
    pub fn class(&self, class: ClassIndex) -> &ClassVariable {
        debug_assert!(
            class.get() < self.classes.len(),
            "called `TimetableModel::class` with class index out of bounds: the len is {} but the index is {}",
            self.classes.len(),
            class.get()
        );
        &self.classes[class.get()]
    }

    /// Resolves a stable class identifier to its arena position.
    #[inline]
    pub fn class_index(&self, id: ClassId) -> Option<ClassIndex> {
        self.class_lookup.get(&id).copied()
    }

    /// Returns the candidate placement behind a placement reference.
    #[inline]
    pub fn placement(&self, place: PlacementRef) -> &Placement {
        self.class(place.class).candidate(place.candidate)
    }

    /// Returns true if the given class is committed.
    #[inline]
    pub fn is_committed(&self, class: ClassIndex) -> bool {
        self.class(class).is_committed()
    }

    /// Looks up a room by its stable identifier.
    #[inline]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.room_lookup.get(&id).map(|&i| &self.rooms[i])
    }

    /// Looks up an instructor by its stable identifier.
    #[inline]
    pub fn instructor(&self, id: InstructorId) -> Option<&Instructor> {
        self.instructor_lookup.get(&id).map(|&i| &self.instructors[i])
    }

    /// Returns the classes taught by the given instructor, ascending by
    /// arena position.
    #[inline]
    pub fn instructor_classes(&self, id: InstructorId) -> &[ClassIndex] {
        match self.instructor_lookup.get(&id) {
            Some(&i) => &self.instructor_classes[i],
            None => &[],
        }
    }

    /// Returns the distribution constraint at the given arena position.
    ///
    /// # Panics
    ///
    /// Panics if `constraint` is not in `0..` the constraint arena length.
    #[inline]
    pub fn constraint(&self, constraint: ConstraintIndex) -> &DistributionConstraint {
        debug_assert!(
            constraint.get() < self.constraints.len(),
            "called `TimetableModel::constraint` with constraint index out of bounds: the len is {} but the index is {}",
            self.constraints.len(),
            constraint.get()
        );
        &self.constraints[constraint.get()]
    }

    /// Returns the overlap pair at the given arena position.
    ///
    /// # Panics
    ///
    /// Panics if `pair` is not in `0..` the pair arena length.
    #[inline]
    pub fn jenrl_pair(&self, pair: usize) -> &JenrlPair {
        debug_assert!(
            pair < self.jenrl_pairs.len(),
            "called `TimetableModel::jenrl_pair` with pair index out of bounds: the len is {} but the index is {}",
            self.jenrl_pairs.len(),
            pair
        );
        &self.jenrl_pairs[pair]
    }

    /// Returns the objective criteria.
    #[inline]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Returns true if the overlap pair is active under the given state:
    /// both endpoints assigned with overlapping placements.
    pub fn is_jenrl_active(&self, state: &AssignmentState, pair: usize) -> bool {
        let jenrl = self.jenrl_pair(pair);
        let (Some(first), Some(second)) = (
            state.placement(jenrl.first()),
            state.placement(jenrl.second()),
        ) else {
            return false;
        };
        let first = self.class(jenrl.first()).candidate(first);
        let second = self.class(jenrl.second()).candidate(second);
        first.time().overlaps(second.time())
    }

    /// Returns true if the distribution constraint is violated under the
    /// given state: some pair of assigned members breaks its pairwise
    /// predicate.
    pub fn is_constraint_violated(&self, state: &AssignmentState, constraint: ConstraintIndex) -> bool {
        let constraint = self.constraint(constraint);
        let members = constraint.members();
        for (i, &a) in members.iter().enumerate() {
            let Some(place_a) = state.placement(a) else {
                continue;
            };
            let place_a = self.class(a).candidate(place_a);
            for &b in &members[i + 1..] {
                let Some(place_b) = state.placement(b) else {
                    continue;
                };
                let place_b = self.class(b).candidate(place_b);
                if !constraint.kind().is_satisfied(place_a, place_b) {
                    return true;
                }
            }
        }
        false
    }

    /// Returns the nonzero back-to-back preference between two placements of
    /// one instructor, or `0.0` when they do not meet back to back.
    ///
    /// Two placements are back to back when they fall on a shared day of the
    /// same date pattern and one starts exactly where the other ends.
    pub fn back_to_back_preference(
        &self,
        instructor: InstructorId,
        first: &Placement,
        second: &Placement,
    ) -> f64 {
        let Some(instructor) = self.instructor(instructor) else {
            return 0.0;
        };
        let a = first.time();
        let b = second.time();
        if a.date_pattern_id() != b.date_pattern_id() || !a.shares_days(b) {
            return 0.0;
        }
        if a.end_slot() == b.start_slot() || b.end_slot() == a.start_slot() {
            instructor.btb_preference()
        } else {
            0.0
        }
    }

    /// Returns true if placing `trial` on `class` clashes hard with `other`
    /// placed on `other_place`: shared room at overlapping times, shared
    /// instructor at overlapping times, or a violated hard distribution
    /// constraint connecting both classes.
    fn hard_clash(
        &self,
        class: ClassIndex,
        trial: &Placement,
        other: ClassIndex,
        other_place: &Placement,
    ) -> bool {
        let overlapping = trial.time().overlaps(other_place.time());
        if overlapping && trial.shares_room(other_place) {
            return true;
        }
        if overlapping && self.class(class).shares_instructor(self.class(other)) {
            return true;
        }
        self.class(class).constraints().iter().any(|&c| {
            let constraint = self.constraint(c);
            constraint.is_hard()
                && constraint.members().contains(&other)
                && !constraint.kind().is_satisfied(trial, other_place)
        })
    }

    /// Computes the hard conflicts of placing the given candidate.
    ///
    /// Every currently assigned class (other than `class` itself, whose
    /// placement the trial would replace) that clashes hard with the trial
    /// placement contributes its current placement to the result, in
    /// ascending class order. A clash with a *committed* class contributes
    /// the trial placement itself instead: committed placements are never
    /// evicted, so the trial is its own conflict.
    pub fn conflicts_of(
        &self,
        state: &AssignmentState,
        class: ClassIndex,
        candidate: CandidateIndex,
    ) -> Vec<PlacementRef> {
        let trial = self.class(class).candidate(candidate);
        let mut conflicts = Vec::new();
        let mut self_conflicting = false;
        for (other, other_candidate) in state.assigned_classes() {
            if other == class {
                continue;
            }
            let other_place = self.class(other).candidate(other_candidate);
            if self.hard_clash(class, trial, other, other_place) {
                if self.is_committed(other) {
                    self_conflicting = true;
                } else {
                    conflicts.push(PlacementRef::new(other, other_candidate));
                }
            }
        }
        if self_conflicting {
            conflicts.push(PlacementRef::new(class, candidate));
        }
        conflicts
    }

    /// Names the hard constraints behind each conflict of placing the given
    /// candidate, keyed by the conflicting class's stable identifier.
    pub fn conflict_explanations(
        &self,
        state: &AssignmentState,
        class: ClassIndex,
        candidate: CandidateIndex,
    ) -> BTreeMap<ClassId, Vec<String>> {
        let trial = self.class(class).candidate(candidate);
        let mut explanations: BTreeMap<ClassId, Vec<String>> = BTreeMap::new();
        for (other, other_candidate) in state.assigned_classes() {
            if other == class {
                continue;
            }
            let other_place = self.class(other).candidate(other_candidate);
            let mut reasons = Vec::new();
            let overlapping = trial.time().overlaps(other_place.time());
            if overlapping && trial.shares_room(other_place) {
                reasons.push("room conflict".to_string());
            }
            if overlapping && self.class(class).shares_instructor(self.class(other)) {
                reasons.push("instructor conflict".to_string());
            }
            for &c in self.class(class).constraints() {
                let constraint = self.constraint(c);
                if constraint.is_hard()
                    && constraint.members().contains(&other)
                    && !constraint.kind().is_satisfied(trial, other_place)
                {
                    reasons.push(constraint.name().to_string());
                }
            }
            if !reasons.is_empty() {
                explanations.insert(self.class(other).id(), reasons);
            }
        }
        explanations
    }

    /// Computes the raw (unweighted) value of one criterion under the state.
    pub fn criterion_value(&self, kind: CriterionKind, state: &AssignmentState) -> f64 {
        match kind {
            CriterionKind::TimePreferences => state
                .assigned_classes()
                .map(|(class, candidate)| {
                    self.class(class).candidate(candidate).time().preference()
                })
                .sum(),
            CriterionKind::RoomPreferences => state
                .assigned_classes()
                .map(|(class, candidate)| {
                    let placement = self.class(class).candidate(candidate);
                    placement.value() - placement.time().preference()
                })
                .sum(),
            CriterionKind::StudentConflicts => (0..self.jenrl_pairs.len())
                .filter(|&pair| self.is_jenrl_active(state, pair))
                .map(|pair| f64::from(self.jenrl_pairs[pair].students()))
                .sum(),
            CriterionKind::DistributionPreferences => (0..self.constraints.len())
                .map(ConstraintIndex::new)
                .filter(|&c| !self.constraint(c).is_hard())
                .filter(|&c| self.is_constraint_violated(state, c))
                .map(|c| self.constraint(c).preference())
                .sum(),
            CriterionKind::BackToBackInstructor => {
                let mut total = 0.0;
                for (i, instructor) in self.instructors.iter().enumerate() {
                    let classes = &self.instructor_classes[i];
                    for (j, &a) in classes.iter().enumerate() {
                        let Some(place_a) = state.placement(a) else {
                            continue;
                        };
                        let place_a = self.class(a).candidate(place_a);
                        for &b in &classes[j + 1..] {
                            let Some(place_b) = state.placement(b) else {
                                continue;
                            };
                            let place_b = self.class(b).candidate(place_b);
                            total += self.back_to_back_preference(
                                instructor.id(),
                                place_a,
                                place_b,
                            );
                        }
                    }
                }
                total
            }
        }
    }

    /// Computes the weighted total objective under the state. Lower is
    /// better.
    pub fn total_value(&self, state: &AssignmentState) -> f64 {
        self.criteria
            .iter()
            .map(|criterion| criterion.weight() * self.criterion_value(criterion.kind(), state))
            .sum()
    }

    /// Computes the per-criterion report map under the state, restricted to
    /// reported criteria. Values are weighted.
    pub fn criterion_values(&self, state: &AssignmentState) -> BTreeMap<String, f64> {
        self.criteria
            .iter()
            .filter(|criterion| criterion.is_reported())
            .map(|criterion| {
                (
                    criterion.name().to_string(),
                    criterion.weight() * self.criterion_value(criterion.kind(), state),
                )
            })
            .collect()
    }
}

impl std::fmt::Display for TimetableModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimetableModel(classes: {}, rooms: {}, instructors: {}, constraints: {}, jenrl pairs: {})",
            self.classes.len(),
            self.rooms.len(),
            self.instructors.len(),
            self.constraints.len(),
            self.jenrl_pairs.len()
        )
    }
}

/// An eager-validating builder for [`TimetableModel`].
///
/// Classes, rooms, instructors, constraints, overlap pairs, and criteria are
/// added in any order; `build()` validates all cross-references and wires
/// the per-class adjacency lists.
#[derive(Clone, Debug, Default)]
pub struct TimetableModelBuilder {
    classes: Vec<ClassVariable>,
    rooms: Vec<Room>,
    instructors: Vec<Instructor>,
    constraints: Vec<DistributionConstraint>,
    jenrl_pairs: Vec<JenrlPair>,
    criteria: Vec<Criterion>,
}

impl TimetableModelBuilder {
    /// Creates an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a room.
    pub fn add_room(&mut self, id: RoomId, name: impl Into<String>) -> &mut Self {
        self.rooms.push(Room {
            id,
            name: name.into(),
        });
        self
    }

    /// Registers an instructor with its back-to-back preference.
    pub fn add_instructor(
        &mut self,
        id: InstructorId,
        name: impl Into<String>,
        btb_preference: f64,
    ) -> &mut Self {
        self.instructors.push(Instructor {
            id,
            name: name.into(),
            btb_preference,
        });
        self
    }

    /// Adds a class with its ordered candidate placements and returns its
    /// arena position.
    #[allow(clippy::too_many_arguments)]
    pub fn add_class(
        &mut self,
        id: ClassId,
        name: impl Into<String>,
        committed: bool,
        allow_break_hard: bool,
        required_rooms: usize,
        room_candidates: Vec<RoomId>,
        instructors: Vec<InstructorId>,
        candidates: Vec<Placement>,
    ) -> ClassIndex {
        let index = ClassIndex::new(self.classes.len());
        self.classes.push(ClassVariable {
            id,
            name: name.into(),
            candidates,
            committed,
            allow_break_hard,
            required_rooms,
            room_candidates,
            instructors,
            constraints: Vec::new(),
            jenrls: Vec::new(),
        });
        index
    }

    /// Adds a distribution constraint over the given member classes and
    /// returns its arena position.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        kind: DistributionKind,
        hard: bool,
        preference: f64,
        members: Vec<ClassIndex>,
    ) -> ConstraintIndex {
        let index = ConstraintIndex::new(self.constraints.len());
        self.constraints.push(DistributionConstraint {
            name: name.into(),
            kind,
            hard,
            preference,
            members,
        });
        index
    }

    /// Adds a student-enrollment overlap pair.
    pub fn add_jenrl(&mut self, first: ClassIndex, second: ClassIndex, students: u32) -> &mut Self {
        self.jenrl_pairs.push(JenrlPair {
            first,
            second,
            students,
        });
        self
    }

    /// Adds an objective criterion.
    pub fn add_criterion(
        &mut self,
        name: impl Into<String>,
        kind: CriterionKind,
        weight: f64,
        reported: bool,
    ) -> &mut Self {
        self.criteria.push(Criterion {
            name: name.into(),
            kind,
            weight,
            reported,
        });
        self
    }

    /// Validates the assembled data and produces the immutable model.
    pub fn build(mut self) -> Result<TimetableModel, crate::err::ModelBuildError> {
        use crate::err::ModelBuildError;

        let num_classes = self.classes.len();

        let mut class_lookup = FxHashMap::default();
        for (i, class) in self.classes.iter().enumerate() {
            if class_lookup.insert(class.id, ClassIndex::new(i)).is_some() {
                return Err(ModelBuildError::DuplicateClassId(class.id));
            }
        }

        let mut room_lookup = FxHashMap::default();
        for (i, room) in self.rooms.iter().enumerate() {
            if room_lookup.insert(room.id, i).is_some() {
                return Err(ModelBuildError::DuplicateRoomId(room.id));
            }
        }

        let mut instructor_lookup = FxHashMap::default();
        for (i, instructor) in self.instructors.iter().enumerate() {
            if instructor_lookup.insert(instructor.id, i).is_some() {
                return Err(ModelBuildError::DuplicateInstructorId(instructor.id));
            }
        }

        for class in &self.classes {
            for &instructor in &class.instructors {
                if !instructor_lookup.contains_key(&instructor) {
                    return Err(ModelBuildError::UnknownInstructor {
                        class: class.id,
                        instructor,
                    });
                }
            }
            for &room in &class.room_candidates {
                if !room_lookup.contains_key(&room) {
                    return Err(ModelBuildError::UnknownRoom {
                        class: class.id,
                        room,
                    });
                }
            }
            for candidate in &class.candidates {
                if candidate.rooms().len() != class.required_rooms {
                    return Err(ModelBuildError::RoomCountMismatch {
                        class: class.id,
                        placement: candidate.id(),
                        expected: class.required_rooms,
                        actual: candidate.rooms().len(),
                    });
                }
            }
        }

        for (i, constraint) in self.constraints.iter().enumerate() {
            if constraint.members.len() < 2 {
                return Err(ModelBuildError::ConstraintTooFewMembers {
                    constraint: constraint.name.clone(),
                });
            }
            for &member in &constraint.members {
                if member.get() >= num_classes {
                    return Err(ModelBuildError::ConstraintMemberOutOfBounds {
                        constraint: constraint.name.clone(),
                        index: member.get(),
                        len: num_classes,
                    });
                }
                self.classes[member.get()]
                    .constraints
                    .push(ConstraintIndex::new(i));
            }
        }

        for (i, pair) in self.jenrl_pairs.iter().enumerate() {
            for endpoint in [pair.first, pair.second] {
                if endpoint.get() >= num_classes {
                    return Err(ModelBuildError::JenrlClassOutOfBounds {
                        index: endpoint.get(),
                        len: num_classes,
                    });
                }
            }
            if pair.first == pair.second {
                return Err(ModelBuildError::JenrlSelfPair {
                    index: pair.first.get(),
                });
            }
            self.classes[pair.first.get()].jenrls.push(i);
            self.classes[pair.second.get()].jenrls.push(i);
        }

        let mut instructor_classes = vec![Vec::new(); self.instructors.len()];
        for (i, class) in self.classes.iter().enumerate() {
            for instructor in &class.instructors {
                instructor_classes[instructor_lookup[instructor]].push(ClassIndex::new(i));
            }
        }

        Ok(TimetableModel {
            classes: self.classes,
            rooms: self.rooms,
            instructors: self.instructors,
            constraints: self.constraints,
            jenrl_pairs: self.jenrl_pairs,
            criteria: self.criteria,
            class_lookup,
            room_lookup,
            instructor_lookup,
            instructor_classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PlacementId;
    use crate::time::TimeLocation;

    fn placement(id: u64, day_code: u32, start: u32, length: u32, room: u64) -> Placement {
        Placement::new(
            PlacementId::new(id),
            TimeLocation::new(day_code, start, length, 1, 1, 0.0),
            [RoomId::new(room)],
            0.0,
            false,
            true,
        )
    }

    fn build_model() -> TimetableModel {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_room(RoomId::new(2), "Room B");
        builder.add_instructor(InstructorId::new(1), "Curie", 0.0);
        // Two movable classes and one committed class, all able to land on
        // the Monday morning slots of room A.
        let a = builder.add_class(
            ClassId::new(10),
            "ALG 101",
            false,
            false,
            1,
            vec![RoomId::new(1), RoomId::new(2)],
            vec![InstructorId::new(1)],
            vec![
                placement(100, 0b1, 0, 12, 1),
                placement(101, 0b1, 12, 12, 2),
            ],
        );
        let b = builder.add_class(
            ClassId::new(11),
            "ALG 102",
            false,
            false,
            1,
            vec![RoomId::new(1), RoomId::new(2)],
            vec![],
            vec![
                placement(110, 0b1, 0, 12, 1),
                placement(111, 0b1, 0, 12, 2),
            ],
        );
        builder.add_class(
            ClassId::new(12),
            "PHY 201",
            true,
            false,
            1,
            vec![RoomId::new(2)],
            vec![],
            vec![placement(120, 0b1, 12, 12, 2)],
        );
        builder.add_jenrl(a, b, 3);
        builder.add_criterion("Student conflicts", CriterionKind::StudentConflicts, 1.0, true);
        builder.add_criterion("Time preferences", CriterionKind::TimePreferences, 1.0, true);
        builder.build().expect("fixture model must build")
    }

    #[test]
    fn test_build_wires_adjacency() {
        let model = build_model();
        assert_eq!(model.num_classes(), 3);
        assert_eq!(model.class(ClassIndex::new(0)).jenrl_pairs(), &[0]);
        assert_eq!(model.class(ClassIndex::new(1)).jenrl_pairs(), &[0]);
        assert_eq!(
            model.class_index(ClassId::new(11)),
            Some(ClassIndex::new(1))
        );
        assert_eq!(model.class_index(ClassId::new(99)), None);
    }

    #[test]
    fn test_build_rejects_duplicate_class_id() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_class(
            ClassId::new(1),
            "A",
            false,
            false,
            0,
            vec![],
            vec![],
            vec![],
        );
        builder.add_class(
            ClassId::new(1),
            "B",
            false,
            false,
            0,
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(
            builder.build().unwrap_err(),
            crate::err::ModelBuildError::DuplicateClassId(ClassId::new(1))
        );
    }

    #[test]
    fn test_build_rejects_room_count_mismatch() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_class(
            ClassId::new(1),
            "A",
            false,
            false,
            2,
            vec![RoomId::new(1)],
            vec![],
            vec![placement(100, 0b1, 0, 12, 1)],
        );
        assert!(matches!(
            builder.build().unwrap_err(),
            crate::err::ModelBuildError::RoomCountMismatch { actual: 1, expected: 2, .. }
        ));
    }

    #[test]
    fn test_room_double_booking_is_a_conflict() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        // ALG 102 sits in room A on Monday morning.
        state.assign(ClassIndex::new(1), CandidateIndex::new(0));
        let conflicts = model.conflicts_of(&state, ClassIndex::new(0), CandidateIndex::new(0));
        assert_eq!(
            conflicts,
            vec![PlacementRef::new(ClassIndex::new(1), CandidateIndex::new(0))]
        );
        // The room-B candidate does not clash.
        let conflicts = model.conflicts_of(&state, ClassIndex::new(0), CandidateIndex::new(1));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_committed_clash_returns_trial_placement() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        // PHY 201 is committed into room B in the late morning.
        state.assign(ClassIndex::new(2), CandidateIndex::new(0));
        let conflicts = model.conflicts_of(&state, ClassIndex::new(0), CandidateIndex::new(1));
        assert_eq!(
            conflicts,
            vec![PlacementRef::new(ClassIndex::new(0), CandidateIndex::new(1))]
        );
    }

    #[test]
    fn test_hard_distribution_violation_is_a_conflict() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_room(RoomId::new(2), "Room B");
        let a = builder.add_class(
            ClassId::new(1),
            "A",
            false,
            false,
            1,
            vec![RoomId::new(1)],
            vec![],
            vec![placement(100, 0b1, 0, 12, 1)],
        );
        let b = builder.add_class(
            ClassId::new(2),
            "B",
            false,
            false,
            1,
            vec![RoomId::new(2)],
            vec![],
            vec![placement(200, 0b1, 0, 12, 2), placement(201, 0b1, 12, 12, 2)],
        );
        builder.add_constraint("Same Time A/B", DistributionKind::SameTime, true, 0.0, vec![a, b]);
        let model = builder.build().expect("fixture model must build");

        let mut state = AssignmentState::new(model.num_classes());
        state.assign(a, CandidateIndex::new(0));
        // The concurrent candidate satisfies the constraint.
        assert!(model.conflicts_of(&state, b, CandidateIndex::new(0)).is_empty());
        // The disjoint candidate violates it.
        assert_eq!(
            model.conflicts_of(&state, b, CandidateIndex::new(1)),
            vec![PlacementRef::new(a, CandidateIndex::new(0))]
        );
        let explanations = model.conflict_explanations(&state, b, CandidateIndex::new(1));
        assert_eq!(
            explanations.get(&ClassId::new(1)),
            Some(&vec!["Same Time A/B".to_string()])
        );
    }

    #[test]
    fn test_instructor_double_booking_is_a_conflict() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_room(RoomId::new(2), "Room B");
        builder.add_instructor(InstructorId::new(1), "Curie", 0.0);
        let a = builder.add_class(
            ClassId::new(1),
            "A",
            false,
            false,
            1,
            vec![RoomId::new(1)],
            vec![InstructorId::new(1)],
            vec![placement(100, 0b1, 0, 12, 1)],
        );
        let b = builder.add_class(
            ClassId::new(2),
            "B",
            false,
            false,
            1,
            vec![RoomId::new(2)],
            vec![InstructorId::new(1)],
            vec![placement(200, 0b1, 0, 12, 2)],
        );
        let model = builder.build().expect("fixture model must build");

        let mut state = AssignmentState::new(model.num_classes());
        state.assign(a, CandidateIndex::new(0));
        assert_eq!(
            model.conflicts_of(&state, b, CandidateIndex::new(0)),
            vec![PlacementRef::new(a, CandidateIndex::new(0))]
        );
    }

    #[test]
    fn test_student_conflicts_criterion_counts_active_pairs() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        state.assign(ClassIndex::new(0), CandidateIndex::new(0));
        state.assign(ClassIndex::new(1), CandidateIndex::new(1));
        // Overlapping times in different rooms: students still collide.
        assert_eq!(
            model.criterion_value(CriterionKind::StudentConflicts, &state),
            3.0
        );
        assert_eq!(model.total_value(&state), 3.0);

        // Moving ALG 101 to the late-morning slot deactivates the pair.
        state.assign(ClassIndex::new(0), CandidateIndex::new(1));
        assert_eq!(
            model.criterion_value(CriterionKind::StudentConflicts, &state),
            0.0
        );
    }

    #[test]
    fn test_criterion_values_skips_unreported() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_criterion("Student conflicts", CriterionKind::StudentConflicts, 2.0, true);
        builder.add_criterion("Delta time", CriterionKind::TimePreferences, 1.0, false);
        let model = builder.build().expect("fixture model must build");
        let state = AssignmentState::new(0);
        let values = model.criterion_values(&state);
        assert_eq!(values.len(), 1);
        assert!(values.contains_key("Student conflicts"));
    }

    #[test]
    fn test_back_to_back_preference() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_instructor(InstructorId::new(1), "Curie", -2.0);
        builder.add_class(
            ClassId::new(1),
            "A",
            false,
            false,
            1,
            vec![RoomId::new(1)],
            vec![InstructorId::new(1)],
            vec![placement(100, 0b1, 0, 12, 1)],
        );
        let model = builder.build().expect("fixture model must build");

        let adjacent = placement(200, 0b1, 12, 12, 1);
        let gapped = placement(201, 0b1, 24, 12, 1);
        let first = placement(100, 0b1, 0, 12, 1);
        assert_eq!(
            model.back_to_back_preference(InstructorId::new(1), &first, &adjacent),
            -2.0
        );
        assert_eq!(
            model.back_to_back_preference(InstructorId::new(1), &first, &gapped),
            0.0
        );
    }
}
