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

//! Resolution of structural placement selections.
//!
//! Clients pin placements structurally (time fields plus a room list), not
//! by candidate index: indices are not stable across model rebuilds, while
//! times and rooms are. The resolver maps a [`SelectedPlacement`] back onto
//! the class's candidate list and rejects selections that no longer exist.
//! It never mutates any state.

use lectern_model::assignment::PlacementRef;
use lectern_model::index::{CandidateIndex, RoomId};
use lectern_model::model::TimetableModel;
use lectern_model::placement::Placement;

use crate::err::{InvalidSelectionError, SelectionProblem};
use crate::request::SelectedPlacement;

#[inline]
fn matches_selection(candidate: &Placement, selection: &SelectedPlacement, rooms: &[RoomId]) -> bool {
    let time = candidate.time();
    time.day_code() == selection.day_code
        && time.start_slot() == selection.start_slot
        && time.time_pattern_id() == selection.time_pattern_id
        && time.date_pattern_id() == selection.date_pattern_id
        && candidate.rooms() == rooms
}

/// Resolves a structural selection to a candidate of its class.
///
/// The requested room list is matched unordered. When `check_validity` is
/// set, a structurally matching but unusable candidate is rejected with
/// [`SelectionProblem::NotAvailable`]; otherwise it resolves normally, which
/// lets clients inspect placements the model has blacklisted.
pub fn resolve_selection(
    model: &TimetableModel,
    selection: &SelectedPlacement,
    check_validity: bool,
) -> Result<PlacementRef, InvalidSelectionError> {
    let Some(class) = model.class_index(selection.class_id) else {
        return Err(InvalidSelectionError::new(
            selection.class_id,
            SelectionProblem::UnknownClass,
        ));
    };
    // Committed placements are fixed; a pin on one can never be honored.
    if model.is_committed(class) {
        return Err(InvalidSelectionError::new(
            selection.class_id,
            SelectionProblem::Committed,
        ));
    }

    // Candidate room lists are stored sorted, so one sorted copy of the
    // request suffices for all comparisons.
    let mut rooms = selection.room_ids.clone();
    rooms.sort_unstable();

    for (i, candidate) in model.class(class).candidates().iter().enumerate() {
        if !matches_selection(candidate, selection, &rooms) {
            continue;
        }
        if check_validity && !candidate.is_valid() {
            return Err(InvalidSelectionError::new(
                selection.class_id,
                SelectionProblem::NotAvailable,
            ));
        }
        return Ok(PlacementRef::new(class, CandidateIndex::new(i)));
    }

    Err(InvalidSelectionError::new(
        selection.class_id,
        SelectionProblem::NoMatchingPlacement,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::index::{ClassId, ClassIndex, PlacementId};
    use lectern_model::model::{TimetableModel, TimetableModelBuilder};
    use lectern_model::time::TimeLocation;

    fn build_model() -> TimetableModel {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_room(RoomId::new(2), "Room B");
        builder.add_class(
            ClassId::new(10),
            "ALG 101",
            false,
            false,
            2,
            vec![RoomId::new(1), RoomId::new(2)],
            vec![],
            vec![
                Placement::new(
                    PlacementId::new(100),
                    TimeLocation::new(0b1, 0, 12, 1, 1, 0.0),
                    [RoomId::new(1), RoomId::new(2)],
                    0.0,
                    false,
                    true,
                ),
                Placement::new(
                    PlacementId::new(101),
                    TimeLocation::new(0b1, 12, 12, 1, 1, 0.0),
                    [RoomId::new(1), RoomId::new(2)],
                    0.0,
                    false,
                    false,
                ),
            ],
        );
        builder.build().expect("fixture model must build")
    }

    fn selection(start_slot: u32, room_ids: Vec<RoomId>) -> SelectedPlacement {
        SelectedPlacement {
            class_id: ClassId::new(10),
            day_code: 0b1,
            start_slot,
            time_pattern_id: 1,
            date_pattern_id: 1,
            room_ids,
        }
    }

    #[test]
    fn test_resolves_with_rooms_in_any_order() {
        let model = build_model();
        let place = resolve_selection(
            &model,
            &selection(0, vec![RoomId::new(2), RoomId::new(1)]),
            true,
        )
        .expect("selection must resolve");
        assert_eq!(
            place,
            PlacementRef::new(ClassIndex::new(0), CandidateIndex::new(0))
        );
    }

    #[test]
    fn test_unknown_class_is_an_error() {
        let model = build_model();
        let mut bad = selection(0, vec![RoomId::new(1), RoomId::new(2)]);
        bad.class_id = ClassId::new(99);
        assert_eq!(
            resolve_selection(&model, &bad, true).unwrap_err(),
            InvalidSelectionError::new(ClassId::new(99), SelectionProblem::UnknownClass)
        );
    }

    #[test]
    fn test_structural_no_match_is_an_error() {
        let model = build_model();
        // No candidate starts at slot 24.
        assert_eq!(
            resolve_selection(
                &model,
                &selection(24, vec![RoomId::new(1), RoomId::new(2)]),
                true
            )
            .unwrap_err()
            .problem(),
            SelectionProblem::NoMatchingPlacement
        );
        // Wrong room set.
        assert_eq!(
            resolve_selection(&model, &selection(0, vec![RoomId::new(1)]), true)
                .unwrap_err()
                .problem(),
            SelectionProblem::NoMatchingPlacement
        );
    }

    #[test]
    fn test_invalid_candidate_reported_as_not_available() {
        let model = build_model();
        let pinned = selection(12, vec![RoomId::new(1), RoomId::new(2)]);
        assert_eq!(
            resolve_selection(&model, &pinned, true).unwrap_err().problem(),
            SelectionProblem::NotAvailable
        );
        // Without the validity check the same selection resolves.
        assert_eq!(
            resolve_selection(&model, &pinned, false).expect("selection must resolve"),
            PlacementRef::new(ClassIndex::new(0), CandidateIndex::new(1))
        );
    }

    #[test]
    fn test_committed_class_cannot_be_pinned() {
        let mut builder = TimetableModelBuilder::new();
        builder.add_room(RoomId::new(1), "Room A");
        builder.add_class(
            ClassId::new(20),
            "PHY 900",
            true,
            false,
            1,
            vec![RoomId::new(1)],
            vec![],
            vec![Placement::new(
                PlacementId::new(200),
                TimeLocation::new(0b1, 0, 12, 1, 1, 0.0),
                [RoomId::new(1)],
                0.0,
                false,
                true,
            )],
        );
        let model = builder.build().expect("fixture model must build");

        let mut pinned = selection(0, vec![RoomId::new(1)]);
        pinned.class_id = ClassId::new(20);
        assert_eq!(
            resolve_selection(&model, &pinned, true).unwrap_err(),
            InvalidSelectionError::new(ClassId::new(20), SelectionProblem::Committed)
        );
    }
}
