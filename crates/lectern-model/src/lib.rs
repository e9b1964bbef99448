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

//! # Lectern Model
//!
//! **The Core Domain Model for the Lectern Timetabling Suggestion Engine.**
//!
//! This crate defines the data structures used to represent a university
//! course timetable: classes with candidate placements, rooms, instructors,
//! distribution constraints, student-enrollment overlap pairs, and the
//! weighted criteria that make up the objective. It is the data interchange
//! layer between the problem definition and the suggestion search engine
//! (`lectern_suggest`).
//!
//! ## Architecture
//!
//! The crate separates the immutable problem from the mutable search state:
//!
//! * **`index`**: Strongly-typed identifiers (`ClassId`, `RoomId`, ...) and
//!   arena indices (`ClassIndex`, `CandidateIndex`, ...) to prevent logical
//!   indexing errors.
//! * **`time`**: The `TimeLocation` primitive with day-bitmask and slot-range
//!   overlap tests.
//! * **`placement`**: The immutable candidate placement (time + rooms +
//!   local objective value + hard/valid flags).
//! * **`model`**: The `TimetableModel` (immutable, arena-addressed, built via
//!   `TimetableModelBuilder`) with conflict computation and criteria.
//! * **`assignment`**: The `AssignmentState` store, the single mutable
//!   resource a suggestion search works on.
//!
//! ## Design Philosophy
//!
//! 1.  **Type Safety**: Indices are distinct types. You cannot accidentally
//!     use a `ClassIndex` to access a constraint.
//! 2.  **Immutability**: The model never changes after `build()`; every query
//!     takes the assignment state by reference, so the same model can serve
//!     concurrent read-only consumers.
//! 3.  **Fail-Fast**: The builder validates all cross-references eagerly so
//!     the search engine never encounters a dangling index.

pub mod assignment;
pub mod err;
pub mod index;
pub mod model;
pub mod placement;
pub mod time;
