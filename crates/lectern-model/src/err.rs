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

//! Errors reported while assembling a [`TimetableModel`].
//!
//! The builder validates eagerly on `build()`, so a model that exists is a
//! model whose cross-references are all in bounds.
//!
//! [`TimetableModel`]: crate::model::TimetableModel

use crate::index::{ClassId, InstructorId, PlacementId, RoomId};

/// An error raised by [`TimetableModelBuilder::build`].
///
/// [`TimetableModelBuilder::build`]: crate::model::TimetableModelBuilder::build
#[derive(Clone, Debug, PartialEq)]
pub enum ModelBuildError {
    /// Two classes were added with the same external identifier.
    DuplicateClassId(ClassId),
    /// Two rooms were added with the same external identifier.
    DuplicateRoomId(RoomId),
    /// Two instructors were added with the same external identifier.
    DuplicateInstructorId(InstructorId),
    /// A class references an instructor that was never added.
    UnknownInstructor {
        /// The referencing class.
        class: ClassId,
        /// The missing instructor.
        instructor: InstructorId,
    },
    /// A class lists a room candidate that was never added.
    UnknownRoom {
        /// The referencing class.
        class: ClassId,
        /// The missing room.
        room: RoomId,
    },
    /// A candidate placement carries a different number of rooms than the
    /// class requires.
    RoomCountMismatch {
        /// The owning class.
        class: ClassId,
        /// The offending candidate.
        placement: PlacementId,
        /// The class's required room count.
        expected: usize,
        /// The candidate's actual room count.
        actual: usize,
    },
    /// A distribution constraint names a class index outside the class arena.
    ConstraintMemberOutOfBounds {
        /// The constraint's name.
        constraint: String,
        /// The offending member index.
        index: usize,
        /// The class arena length.
        len: usize,
    },
    /// A distribution constraint has fewer than two members.
    ConstraintTooFewMembers {
        /// The constraint's name.
        constraint: String,
    },
    /// A student-overlap pair names a class index outside the class arena.
    JenrlClassOutOfBounds {
        /// The offending class index.
        index: usize,
        /// The class arena length.
        len: usize,
    },
    /// A student-overlap pair connects a class with itself.
    JenrlSelfPair {
        /// The class paired with itself.
        index: usize,
    },
}

impl std::fmt::Display for ModelBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelBuildError::DuplicateClassId(id) => {
                write!(f, "duplicate class identifier: {}", id)
            }
            ModelBuildError::DuplicateRoomId(id) => {
                write!(f, "duplicate room identifier: {}", id)
            }
            ModelBuildError::DuplicateInstructorId(id) => {
                write!(f, "duplicate instructor identifier: {}", id)
            }
            ModelBuildError::UnknownInstructor { class, instructor } => {
                write!(f, "class {} references unknown instructor {}", class, instructor)
            }
            ModelBuildError::UnknownRoom { class, room } => {
                write!(f, "class {} lists unknown room candidate {}", class, room)
            }
            ModelBuildError::RoomCountMismatch {
                class,
                placement,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "candidate {} of class {} has {} rooms but the class requires {}",
                    placement, class, actual, expected
                )
            }
            ModelBuildError::ConstraintMemberOutOfBounds {
                constraint,
                index,
                len,
            } => {
                write!(
                    f,
                    "constraint '{}' names class index out of bounds: the len is {} but the index is {}",
                    constraint, len, index
                )
            }
            ModelBuildError::ConstraintTooFewMembers { constraint } => {
                write!(f, "constraint '{}' has fewer than two members", constraint)
            }
            ModelBuildError::JenrlClassOutOfBounds { index, len } => {
                write!(
                    f,
                    "student overlap pair names class index out of bounds: the len is {} but the index is {}",
                    len, index
                )
            }
            ModelBuildError::JenrlSelfPair { index } => {
                write!(f, "student overlap pair connects class index {} with itself", index)
            }
        }
    }
}

impl std::error::Error for ModelBuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_duplicate_class() {
        let err = ModelBuildError::DuplicateClassId(ClassId::new(7));
        assert_eq!(err.to_string(), "duplicate class identifier: ClassId(7)");
    }

    #[test]
    fn test_display_room_count_mismatch() {
        let err = ModelBuildError::RoomCountMismatch {
            class: ClassId::new(1),
            placement: PlacementId::new(2),
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "candidate PlacementId(2) of class ClassId(1) has 1 rooms but the class requires 2"
        );
    }
}
