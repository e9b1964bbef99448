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

//! Construction of [`Suggestion`] diffs from a complete assignment.
//!
//! The builder never walks the whole timetable for annotations: student
//! overlaps, distribution violations, and back-to-back preferences are
//! gathered only from the changed classes' adjacency lists, so the cost of
//! one suggestion scales with the size of the diff.

use std::collections::BTreeSet;

use lectern_model::assignment::{AssignmentSnapshot, AssignmentState};
use lectern_model::index::{CandidateIndex, ClassId, ClassIndex, ConstraintIndex, InstructorId};
use lectern_model::model::TimetableModel;
use rustc_hash::FxHashMap;

use crate::suggestion::{
    BtbInstructorInfo, ClassAssignmentChange, DistributionConflictInfo, PlacementDetail,
    StudentConflictInfo, Suggestion,
};

/// Renders one candidate placement for display.
pub fn placement_detail(
    model: &TimetableModel,
    class: ClassIndex,
    candidate: CandidateIndex,
) -> PlacementDetail {
    let placement = model.class(class).candidate(candidate);
    let time = placement.time();
    PlacementDetail {
        placement_id: placement.id(),
        day_code: time.day_code(),
        start_slot: time.start_slot(),
        length: time.length(),
        room_ids: placement.rooms().to_vec(),
        room_names: placement
            .rooms()
            .iter()
            .map(|&room| {
                model
                    .room(room)
                    .map_or_else(|| room.to_string(), |r| r.name().to_string())
            })
            .collect(),
        value: placement.value(),
    }
}

fn change_entry(
    model: &TimetableModel,
    class: ClassIndex,
    old: Option<CandidateIndex>,
    new: Option<CandidateIndex>,
    hint_conflicts: &FxHashMap<ClassId, Vec<String>>,
) -> ClassAssignmentChange {
    let variable = model.class(class);
    ClassAssignmentChange {
        class_id: variable.id(),
        class_name: variable.name().to_string(),
        old: old.map(|candidate| placement_detail(model, class, candidate)),
        new: new.map(|candidate| placement_detail(model, class, candidate)),
        conflict_descriptions: hint_conflicts
            .get(&variable.id())
            .cloned()
            .unwrap_or_default(),
    }
}

/// Builds a suggestion as a diff of `state` against `baseline`.
///
/// Changed entries follow `order` (the search's resolution order) where the
/// class appears there; remaining changed classes are appended ascending by
/// arena position. `hint_conflicts` carries the hard-constraint names a
/// pinned selection induced, attached to the matching entries.
pub fn build_suggestion(
    model: &TimetableModel,
    state: &AssignmentState,
    baseline: &AssignmentSnapshot,
    order: &[ClassIndex],
    hint_conflicts: &FxHashMap<ClassId, Vec<String>>,
) -> Suggestion {
    debug_assert!(
        baseline.len() == state.num_classes(),
        "called `build_suggestion` with a foreign baseline: the len is {} but the state covers {}",
        baseline.len(),
        state.num_classes()
    );

    let mut changed: Vec<(ClassIndex, Option<CandidateIndex>, CandidateIndex)> = Vec::new();
    let mut unassigned: Vec<(ClassIndex, CandidateIndex)> = Vec::new();
    for (i, &before) in baseline.iter().enumerate() {
        let class = ClassIndex::new(i);
        let now = state.placement(class);
        if now == before {
            continue;
        }
        match now {
            Some(candidate) => changed.push((class, before, candidate)),
            None => {
                if let Some(candidate) = before {
                    unassigned.push((class, candidate));
                }
            }
        }
    }

    // Resolution order first; classes the search never touched (there are
    // none today, but the diff does not assume that) follow ascending.
    changed.sort_by_key(|&(class, _, _)| {
        (
            order
                .iter()
                .position(|&c| c == class)
                .unwrap_or(usize::MAX),
            class,
        )
    });

    let changes: Vec<ClassAssignmentChange> = changed
        .iter()
        .map(|&(class, old, new)| change_entry(model, class, old, Some(new), hint_conflicts))
        .collect();
    let unassigned: Vec<ClassAssignmentChange> = unassigned
        .iter()
        .map(|&(class, old)| change_entry(model, class, Some(old), None, hint_conflicts))
        .collect();

    let changed_classes: BTreeSet<ClassIndex> =
        changed.iter().map(|&(class, _, _)| class).collect();

    let mut active_pairs: BTreeSet<usize> = BTreeSet::new();
    let mut violated_constraints: BTreeSet<ConstraintIndex> = BTreeSet::new();
    let mut btb_pairs: BTreeSet<(ClassIndex, ClassIndex, InstructorId)> = BTreeSet::new();
    for &class in &changed_classes {
        let variable = model.class(class);
        for &pair in variable.jenrl_pairs() {
            if model.is_jenrl_active(state, pair) {
                active_pairs.insert(pair);
            }
        }
        for &constraint in variable.constraints() {
            if model.is_constraint_violated(state, constraint) {
                violated_constraints.insert(constraint);
            }
        }
        for &instructor in variable.instructors() {
            for &other in model.instructor_classes(instructor) {
                if other == class {
                    continue;
                }
                let (first, second) = if class < other {
                    (class, other)
                } else {
                    (other, class)
                };
                btb_pairs.insert((first, second, instructor));
            }
        }
    }

    let student_conflicts = active_pairs
        .iter()
        .map(|&pair| {
            let jenrl = model.jenrl_pair(pair);
            StudentConflictInfo {
                first_class_id: model.class(jenrl.first()).id(),
                first_class_name: model.class(jenrl.first()).name().to_string(),
                second_class_id: model.class(jenrl.second()).id(),
                second_class_name: model.class(jenrl.second()).name().to_string(),
                students: jenrl.students(),
            }
        })
        .collect();

    let distribution_conflicts = violated_constraints
        .iter()
        .map(|&index| {
            let constraint = model.constraint(index);
            DistributionConflictInfo {
                name: constraint.name().to_string(),
                preference: constraint.preference(),
                class_ids: constraint
                    .members()
                    .iter()
                    .map(|&member| model.class(member).id())
                    .collect(),
            }
        })
        .collect();

    let mut btb_instructors = Vec::new();
    for &(first, second, instructor) in &btb_pairs {
        let (Some(place_a), Some(place_b)) = (state.placement(first), state.placement(second))
        else {
            continue;
        };
        let preference = model.back_to_back_preference(
            instructor,
            model.class(first).candidate(place_a),
            model.class(second).candidate(place_b),
        );
        if preference != 0.0 {
            btb_instructors.push(BtbInstructorInfo {
                instructor_id: instructor,
                instructor_name: model
                    .instructor(instructor)
                    .map_or_else(String::new, |i| i.name().to_string()),
                first_class_id: model.class(first).id(),
                second_class_id: model.class(second).id(),
                preference,
            });
        }
    }

    Suggestion {
        value: model.total_value(state),
        changes,
        unassigned,
        student_conflicts,
        distribution_conflicts,
        btb_instructors,
        criteria: model.criterion_values(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::index::{PlacementId, RoomId};
    use lectern_model::model::{CriterionKind, TimetableModelBuilder};
    use lectern_model::placement::Placement;
    use lectern_model::time::TimeLocation;

    fn placement(id: u64, day_code: u32, start: u32, room: u64) -> Placement {
        Placement::new(
            PlacementId::new(id),
            TimeLocation::new(day_code, start, 12, 1, 1, 0.0),
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
        let a = builder.add_class(
            ClassId::new(10),
            "ALG 101",
            false,
            false,
            1,
            vec![RoomId::new(1), RoomId::new(2)],
            vec![],
            vec![placement(100, 0b1, 0, 1), placement(101, 0b1, 0, 2)],
        );
        let b = builder.add_class(
            ClassId::new(11),
            "ALG 102",
            false,
            false,
            1,
            vec![RoomId::new(1), RoomId::new(2)],
            vec![],
            vec![placement(110, 0b1, 0, 2), placement(111, 0b1, 12, 2)],
        );
        builder.add_jenrl(a, b, 4);
        builder.add_criterion(
            "Student conflicts",
            CriterionKind::StudentConflicts,
            1.0,
            true,
        );
        builder.build().expect("fixture model must build")
    }

    #[test]
    fn test_diff_contains_only_changed_classes() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        state.assign(ClassIndex::new(0), CandidateIndex::new(0));
        state.assign(ClassIndex::new(1), CandidateIndex::new(1));
        let baseline = state.snapshot();

        // Move ALG 102 only.
        state.assign(ClassIndex::new(1), CandidateIndex::new(0));
        let suggestion = build_suggestion(
            &model,
            &state,
            &baseline,
            &[ClassIndex::new(1)],
            &FxHashMap::default(),
        );
        assert_eq!(suggestion.changes.len(), 1);
        assert_eq!(suggestion.changes[0].class_id, ClassId::new(11));
        assert_eq!(
            suggestion.changes[0].old.as_ref().map(|d| d.placement_id),
            Some(PlacementId::new(111))
        );
        assert_eq!(
            suggestion.changes[0].new.as_ref().map(|d| d.placement_id),
            Some(PlacementId::new(110))
        );
        assert!(suggestion.unassigned.is_empty());
    }

    #[test]
    fn test_annotations_cover_the_changed_neighborhood() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        state.assign(ClassIndex::new(0), CandidateIndex::new(0));
        state.assign(ClassIndex::new(1), CandidateIndex::new(1));
        let baseline = state.snapshot();

        // Moving ALG 102 on top of ALG 101's time activates the overlap
        // pair, student-wise (different rooms, so no hard conflict).
        state.assign(ClassIndex::new(1), CandidateIndex::new(0));
        let suggestion = build_suggestion(
            &model,
            &state,
            &baseline,
            &[ClassIndex::new(1)],
            &FxHashMap::default(),
        );
        assert_eq!(suggestion.student_conflicts.len(), 1);
        assert_eq!(suggestion.student_conflicts[0].students, 4);
        assert_eq!(suggestion.value, 4.0);
        assert_eq!(suggestion.criteria.get("Student conflicts"), Some(&4.0));
    }

    #[test]
    fn test_resolution_order_drives_change_order() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        let baseline = state.snapshot();
        state.assign(ClassIndex::new(0), CandidateIndex::new(0));
        state.assign(ClassIndex::new(1), CandidateIndex::new(1));

        let suggestion = build_suggestion(
            &model,
            &state,
            &baseline,
            &[ClassIndex::new(1), ClassIndex::new(0)],
            &FxHashMap::default(),
        );
        let ids: Vec<ClassId> = suggestion.changes.iter().map(|c| c.class_id).collect();
        assert_eq!(ids, vec![ClassId::new(11), ClassId::new(10)]);
    }

    #[test]
    fn test_unassigned_classes_are_listed() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        state.assign(ClassIndex::new(0), CandidateIndex::new(0));
        let baseline = state.snapshot();
        state.unassign(ClassIndex::new(0));

        let suggestion =
            build_suggestion(&model, &state, &baseline, &[], &FxHashMap::default());
        assert!(suggestion.changes.is_empty());
        assert_eq!(suggestion.unassigned.len(), 1);
        assert_eq!(suggestion.unassigned[0].class_id, ClassId::new(10));
        assert!(suggestion.unassigned[0].new.is_none());
    }

    #[test]
    fn test_hint_descriptions_attach_to_matching_entries() {
        let model = build_model();
        let mut state = AssignmentState::new(model.num_classes());
        state.assign(ClassIndex::new(1), CandidateIndex::new(1));
        let baseline = state.snapshot();
        state.assign(ClassIndex::new(1), CandidateIndex::new(0));

        let mut hints = FxHashMap::default();
        hints.insert(ClassId::new(11), vec!["room conflict".to_string()]);
        let suggestion = build_suggestion(&model, &state, &baseline, &[], &hints);
        assert_eq!(
            suggestion.changes[0].conflict_descriptions,
            vec!["room conflict".to_string()]
        );
    }
}
