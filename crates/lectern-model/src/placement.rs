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

//! Candidate placements.
//!
//! A `Placement` is one concrete (time, room-set) choice for a class. It is
//! produced once by the `TimetableModelBuilder` and immutable afterwards; the
//! search engine only ever refers to placements by `(ClassIndex,
//! CandidateIndex)` pairs and never constructs new ones.

use crate::{index::PlacementId, index::RoomId, time::TimeLocation};
use smallvec::SmallVec;

/// One concrete (time, room-set) choice for a class.
///
/// Attributes relevant to the search:
/// - `value`: the static local objective contribution (time preference plus
///   room preference), used for candidate ordering and the branch bound.
/// - `hard`: the placement introduces a hard-preference violation by itself
///   (a prohibited time or room); offered only when hard-breaking is allowed.
/// - `valid`: the placement is structurally usable at all. Invalid
///   placements are kept in the candidate list for diagnostics but are never
///   offered to the search.
///
/// Room lists are stored sorted by `RoomId`, so `same_rooms` is a plain
/// slice comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    id: PlacementId,
    time: TimeLocation,
    rooms: SmallVec<[RoomId; 2]>,
    value: f64,
    hard: bool,
    valid: bool,
}

impl Placement {
    /// Creates a new placement. The room list is sorted on construction.
    pub fn new(
        id: PlacementId,
        time: TimeLocation,
        rooms: impl IntoIterator<Item = RoomId>,
        room_preference: f64,
        hard: bool,
        valid: bool,
    ) -> Self {
        let mut rooms: SmallVec<[RoomId; 2]> = rooms.into_iter().collect();
        rooms.sort_unstable();
        let value = time.preference() + room_preference;
        Self {
            id,
            time,
            rooms,
            value,
            hard,
            valid,
        }
    }

    /// Returns the stable identifier, used as deterministic tie-break.
    #[inline]
    pub const fn id(&self) -> PlacementId {
        self.id
    }

    /// Returns the meeting time.
    #[inline]
    pub const fn time(&self) -> &TimeLocation {
        &self.time
    }

    /// Returns the sorted room list.
    #[inline]
    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Returns the static local objective contribution.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns true if the placement violates a hard preference by itself.
    #[inline]
    pub const fn is_hard(&self) -> bool {
        self.hard
    }

    /// Returns true if the placement is structurally usable.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns true if both placements use the same meeting time.
    #[inline]
    pub fn same_time(&self, other: &Placement) -> bool {
        self.time.same_time(&other.time)
    }

    /// Returns true if both placements use exactly the same rooms.
    #[inline]
    pub fn same_rooms(&self, other: &Placement) -> bool {
        self.rooms == other.rooms
    }

    /// Returns true if both placements share at least one room.
    #[inline]
    pub fn shares_room(&self, other: &Placement) -> bool {
        // Both lists are sorted and tiny; a linear merge walk suffices.
        let (mut i, mut j) = (0, 0);
        while i < self.rooms.len() && j < other.rooms.len() {
            match self.rooms[i].cmp(&other.rooms[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Placement(id: {}, time: {}, rooms: {}, value: {})",
            self.id.get(),
            self.time,
            self.rooms.len(),
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(id: u64, day_code: u32, start_slot: u32, rooms: &[u64]) -> Placement {
        Placement::new(
            PlacementId::new(id),
            TimeLocation::new(day_code, start_slot, 6, 1, 1, 0.0),
            rooms.iter().map(|r| RoomId::new(*r)),
            0.0,
            false,
            true,
        )
    }

    #[test]
    fn test_rooms_are_sorted_on_construction() {
        let p = placement(1, 0b1, 10, &[5, 2]);
        assert_eq!(p.rooms(), &[RoomId::new(2), RoomId::new(5)]);
    }

    #[test]
    fn test_same_rooms_is_order_independent() {
        let a = placement(1, 0b1, 10, &[5, 2]);
        let b = placement(2, 0b1, 20, &[2, 5]);
        assert!(a.same_rooms(&b));
    }

    #[test]
    fn test_shares_room() {
        let a = placement(1, 0b1, 10, &[1, 3]);
        let b = placement(2, 0b1, 10, &[3, 7]);
        let c = placement(3, 0b1, 10, &[2, 9]);
        assert!(a.shares_room(&b));
        assert!(!a.shares_room(&c));
    }

    #[test]
    fn test_value_combines_time_and_room_preference() {
        let p = Placement::new(
            PlacementId::new(1),
            TimeLocation::new(0b1, 10, 6, 1, 1, 3.0),
            [RoomId::new(1)],
            2.0,
            false,
            true,
        );
        assert_eq!(p.value(), 5.0);
    }
}
