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

//! The suggestion DTOs returned to clients.
//!
//! A [`Suggestion`] is a *diff* against the timetable the search started
//! from: the classes whose placement changed, the classes left unassigned,
//! and conflict annotations restricted to the changed classes'
//! neighborhoods. The full timetable is never serialized.

use std::collections::BTreeMap;

use lectern_model::index::{ClassId, InstructorId, PlacementId, RoomId};
use serde::{Deserialize, Serialize};

/// One placement rendered for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementDetail {
    /// The placement's stable identifier.
    pub placement_id: PlacementId,
    /// Day-of-week bitmask.
    pub day_code: u32,
    /// First slot.
    pub start_slot: u32,
    /// Length in slots.
    pub length: u32,
    /// The occupied rooms, sorted by identifier.
    pub room_ids: Vec<RoomId>,
    /// Display names of the occupied rooms, aligned with `room_ids`.
    pub room_names: Vec<String>,
    /// The placement's local objective contribution.
    pub value: f64,
}

/// One class whose assignment differs from the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassAssignmentChange {
    /// The class that moved.
    pub class_id: ClassId,
    /// Display name of the class.
    pub class_name: String,
    /// The baseline placement, if the class was assigned.
    pub old: Option<PlacementDetail>,
    /// The suggested placement, `None` when the class is left unassigned.
    pub new: Option<PlacementDetail>,
    /// Names of the hard constraints that forced this class to move, when
    /// the move was induced by a pinned selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflict_descriptions: Vec<String>,
}

/// An active student-enrollment overlap touching a changed class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentConflictInfo {
    /// First class of the pair.
    pub first_class_id: ClassId,
    /// Display name of the first class.
    pub first_class_name: String,
    /// Second class of the pair.
    pub second_class_id: ClassId,
    /// Display name of the second class.
    pub second_class_name: String,
    /// Number of jointly enrolled students in conflict.
    pub students: u32,
}

/// A violated soft distribution constraint touching a changed class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionConflictInfo {
    /// Display name of the constraint.
    pub name: String,
    /// The preference charged for the violation.
    pub preference: f64,
    /// The member classes.
    pub class_ids: Vec<ClassId>,
}

/// A nonzero back-to-back preference between two classes of one instructor,
/// at least one of which changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BtbInstructorInfo {
    /// The instructor.
    pub instructor_id: InstructorId,
    /// Display name of the instructor.
    pub instructor_name: String,
    /// First class of the pair.
    pub first_class_id: ClassId,
    /// Second class of the pair.
    pub second_class_id: ClassId,
    /// The charged preference.
    pub preference: f64,
}

/// One suggested timetable, expressed as a diff against the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The weighted total objective of the suggested timetable. Lower is
    /// better.
    pub value: f64,
    /// Classes whose placement changed, in resolution order.
    pub changes: Vec<ClassAssignmentChange>,
    /// Classes assigned in the baseline but left unassigned here.
    pub unassigned: Vec<ClassAssignmentChange>,
    /// Active student overlaps touching the changed classes.
    pub student_conflicts: Vec<StudentConflictInfo>,
    /// Violated soft distribution constraints touching the changed classes.
    pub distribution_conflicts: Vec<DistributionConflictInfo>,
    /// Nonzero back-to-back instructor preferences touching the changed
    /// classes.
    pub btb_instructors: Vec<BtbInstructorInfo>,
    /// Weighted per-criterion values, restricted to reported criteria.
    pub criteria: BTreeMap<String, f64>,
}

impl Suggestion {
    /// Renders the canonical diff key: the sorted `classId:placementId`
    /// sequence over all changed and unassigned classes. Two suggestions
    /// with equal keys describe the same set of moves.
    pub fn diff_key(&self) -> String {
        let mut parts: Vec<String> = self
            .changes
            .iter()
            .chain(self.unassigned.iter())
            .map(|change| {
                let placement = change
                    .new
                    .as_ref()
                    .map_or(u64::MAX, |detail| detail.placement_id.get());
                format!("{}:{}", change.class_id.get(), placement)
            })
            .collect();
        parts.sort_unstable();
        parts.join(",")
    }
}
