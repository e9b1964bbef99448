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

//! Errors reported at the suggestion service boundary.

use lectern_model::index::ClassId;

/// Why a pinned selection could not be resolved against the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionProblem {
    /// The selection names a class the model does not contain.
    UnknownClass,
    /// No candidate placement of the class matches the selection's time and
    /// rooms.
    NoMatchingPlacement,
    /// A matching candidate exists but is not structurally usable.
    NotAvailable,
    /// The class belongs to the committed timetable and cannot be moved.
    Committed,
}

impl std::fmt::Display for SelectionProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionProblem::UnknownClass => write!(f, "unknown class"),
            SelectionProblem::NoMatchingPlacement => {
                write!(f, "no matching placement")
            }
            SelectionProblem::NotAvailable => {
                write!(f, "room or instructor not available")
            }
            SelectionProblem::Committed => {
                write!(f, "class is committed and cannot be reassigned")
            }
        }
    }
}

/// A pinned selection that could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSelectionError {
    class: ClassId,
    problem: SelectionProblem,
}

impl InvalidSelectionError {
    /// Creates a new invalid-selection error.
    #[inline]
    pub const fn new(class: ClassId, problem: SelectionProblem) -> Self {
        Self { class, problem }
    }

    /// Returns the class the selection named.
    #[inline]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    /// Returns what went wrong.
    #[inline]
    pub const fn problem(&self) -> SelectionProblem {
        self.problem
    }
}

impl std::fmt::Display for InvalidSelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid selection for {}: {}", self.class, self.problem)
    }
}

impl std::error::Error for InvalidSelectionError {}

/// An error raised by the suggestion service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionError {
    /// No timetable has been loaded yet.
    SolverNotReady,
    /// Another suggestion request is currently running.
    SolverBusy,
    /// A pinned selection could not be resolved.
    InvalidSelection(InvalidSelectionError),
}

impl std::fmt::Display for SuggestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionError::SolverNotReady => write!(f, "solver is not ready"),
            SuggestionError::SolverBusy => write!(f, "solver is busy"),
            SuggestionError::InvalidSelection(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SuggestionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SuggestionError::InvalidSelection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidSelectionError> for SuggestionError {
    #[inline]
    fn from(err: InvalidSelectionError) -> Self {
        SuggestionError::InvalidSelection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_selection() {
        let err = SuggestionError::from(InvalidSelectionError::new(
            ClassId::new(42),
            SelectionProblem::NotAvailable,
        ));
        assert_eq!(
            err.to_string(),
            "invalid selection for ClassId(42): room or instructor not available"
        );
    }

    #[test]
    fn test_display_busy_and_not_ready() {
        assert_eq!(SuggestionError::SolverBusy.to_string(), "solver is busy");
        assert_eq!(
            SuggestionError::SolverNotReady.to_string(),
            "solver is not ready"
        );
    }
}
