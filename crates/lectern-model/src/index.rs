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

//! # Strongly Typed Identifiers and Indices
//!
//! The timetable model uses two distinct index spaces that must never be
//! confused with each other:
//!
//! - **External identifiers** (`ClassId`, `RoomId`, `InstructorId`,
//!   `PlacementId`): stable `u64` keys assigned by the caller. They survive
//!   across model rebuilds and appear on the wire in requests and responses.
//! - **Arena indices** (`ClassIndex`, `ConstraintIndex`, `CandidateIndex`):
//!   dense `usize` positions into the model's internal arenas. They are only
//!   meaningful for one `TimetableModel` instance and are never serialized.
//!
//! All of them are `#[repr(transparent)]` newtypes, so they compile down to
//! their underlying integer with no runtime overhead while preventing
//! accidental swaps at compile time.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[repr(transparent)]
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from its raw `u64` value.
            #[inline(always)]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw `u64` value.
            #[inline(always)]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self::new(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

macro_rules! define_index {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new index from its raw `usize` position.
            #[inline(always)]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Returns the raw `usize` position.
            #[inline(always)]
            pub const fn get(&self) -> usize {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::new(index)
            }
        }

        impl From<$name> for usize {
            fn from(index: $name) -> Self {
                index.0
            }
        }
    };
}

define_id! {
    /// The stable external identifier of a class (section) needing a placement.
    ClassId
}

define_id! {
    /// The stable external identifier of a room.
    RoomId
}

define_id! {
    /// The stable external identifier of an instructor.
    InstructorId
}

define_id! {
    /// The stable external identifier of a candidate placement.
    ///
    /// Used as the deterministic tie-break when two candidates of one class
    /// carry the same local objective contribution.
    PlacementId
}

define_index! {
    /// A dense arena index into the model's class arena.
    ClassIndex
}

define_index! {
    /// A dense arena index into the model's distribution-constraint arena.
    ConstraintIndex
}

define_index! {
    /// The position of a candidate placement within one class's candidate list.
    CandidateIndex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_new_and_get() {
        let id = ClassId::new(42);
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_id_conversions() {
        let id: RoomId = 7u64.into();
        assert_eq!(id.get(), 7);
        let raw: u64 = id.into();
        assert_eq!(raw, 7);
    }

    #[test]
    fn test_id_debug_and_display() {
        let id = PlacementId::new(3);
        assert_eq!(format!("{}", id), "PlacementId(3)");
        assert_eq!(format!("{:?}", id), "PlacementId(3)");
    }

    #[test]
    fn test_index_new_and_get() {
        let index = ClassIndex::new(5);
        assert_eq!(index.get(), 5);
        assert_eq!(format!("{}", index), "ClassIndex(5)");
    }

    #[test]
    fn test_index_ordering_is_ascending() {
        let a = ClassIndex::new(1);
        let b = ClassIndex::new(2);
        assert!(a < b);
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = ClassId::new(11);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "11");
        let back: ClassId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
