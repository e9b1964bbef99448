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

//! The suggestion request DTO.

use lectern_model::index::{ClassId, RoomId};
use serde::{Deserialize, Serialize};

/// A placement pinned by the user, described structurally: the time the
/// class should meet and the rooms it should occupy. Resolved against the
/// class's candidate list by the placement resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPlacement {
    /// The class being pinned.
    pub class_id: ClassId,
    /// Day-of-week bitmask of the requested time.
    pub day_code: u32,
    /// First slot of the requested time.
    pub start_slot: u32,
    /// Time pattern of the requested time.
    pub time_pattern_id: u64,
    /// Date pattern of the requested time.
    pub date_pattern_id: u64,
    /// The requested rooms, in any order.
    pub room_ids: Vec<RoomId>,
}

/// A request for placement suggestions around one class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeSuggestionsRequest {
    /// The class to compute suggestions for.
    pub class_id: ClassId,
    /// Placements pinned before the search starts, in pin order.
    pub selections: Vec<SelectedPlacement>,
    /// Maximum length of eviction chains the search may resolve.
    pub depth: u32,
    /// Maximum number of suggestions to return.
    pub limit: usize,
    /// Wall-clock budget in milliseconds. `0` means unlimited.
    pub time_limit_ms: u64,
    /// Allow candidates that introduce a hard-preference violation.
    pub allow_break_hard: bool,
    /// Restrict candidates of the requested class to its current rooms.
    pub same_room: bool,
    /// Restrict candidates of the requested class to its current time.
    pub same_time: bool,
}

impl Default for ComputeSuggestionsRequest {
    fn default() -> Self {
        Self {
            class_id: ClassId::new(0),
            selections: Vec::new(),
            depth: 2,
            limit: 20,
            time_limit_ms: 5000,
            allow_break_hard: false,
            same_room: false,
            same_time: false,
        }
    }
}

impl ComputeSuggestionsRequest {
    /// Creates a request for the given class with default parameters.
    #[inline]
    pub fn for_class(class_id: ClassId) -> Self {
        Self {
            class_id,
            ..Self::default()
        }
    }
}
