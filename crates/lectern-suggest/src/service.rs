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

//! The service boundary around the suggestion search.
//!
//! A [`SuggestionService`] owns one timetable (model plus working
//! assignment) and serializes access to it. Requests arriving before a
//! timetable is loaded are rejected with
//! [`SuggestionError::SolverNotReady`]; a request arriving while another
//! one holds the busy flag is rejected with
//! [`SuggestionError::SolverBusy`]. The flag is advisory: callers that
//! share the service behind a lock already get exclusivity from the lock,
//! and the flag lets them answer "is a search running" without blocking.

use std::sync::atomic::{AtomicBool, Ordering};

use lectern_model::assignment::AssignmentState;
use lectern_model::model::TimetableModel;

use crate::engine::SuggestionSearch;
use crate::err::SuggestionError;
use crate::request::ComputeSuggestionsRequest;
use crate::result::SuggestionsResult;

struct LoadedTimetable {
    model: TimetableModel,
    state: AssignmentState,
}

/// Owns a timetable and answers suggestion requests against it.
pub struct SuggestionService {
    loaded: Option<LoadedTimetable>,
    busy: AtomicBool,
}

/// Clears the busy flag when the request finishes, error paths included.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SuggestionService {
    /// Creates an empty service with no timetable loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaded: None,
            busy: AtomicBool::new(false),
        }
    }

    /// Loads a timetable, replacing any previously loaded one.
    ///
    /// # Panics
    ///
    /// In debug builds, panics when the assignment state does not cover the
    /// model's classes.
    pub fn load(&mut self, model: TimetableModel, state: AssignmentState) {
        debug_assert!(
            state.num_classes() == model.num_classes(),
            "called `load` with a mismatched assignment: the model has {} classes but the state covers {}",
            model.num_classes(),
            state.num_classes()
        );
        self.loaded = Some(LoadedTimetable { model, state });
    }

    /// Unloads the timetable. Subsequent requests are rejected as not ready.
    pub fn unload(&mut self) {
        self.loaded = None;
    }

    /// Whether a timetable is loaded.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    /// Whether a request currently holds the busy flag.
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Read access to the loaded model, if any.
    #[inline]
    #[must_use]
    pub fn model(&self) -> Option<&TimetableModel> {
        self.loaded.as_ref().map(|loaded| &loaded.model)
    }

    /// Read access to the working assignment, if any.
    #[inline]
    #[must_use]
    pub fn assignment(&self) -> Option<&AssignmentState> {
        self.loaded.as_ref().map(|loaded| &loaded.state)
    }

    /// Computes suggestions for the given request.
    ///
    /// The working assignment is mutated during the search and restored
    /// before this returns, on every path the search can take.
    pub fn compute_suggestions(
        &mut self,
        request: ComputeSuggestionsRequest,
    ) -> Result<SuggestionsResult, SuggestionError> {
        let Some(loaded) = self.loaded.as_mut() else {
            return Err(SuggestionError::SolverNotReady);
        };
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(SuggestionError::SolverBusy);
        }
        let _guard = BusyGuard(&self.busy);
        SuggestionSearch::new(&loaded.model, &mut loaded.state, request).run()
    }
}

impl Default for SuggestionService {
    fn default() -> Self {
        Self::new()
    }
}
