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

//! Lectern‑Suggest: interactive timetable suggestions
//!
//! Depth‑bounded branch‑and‑bound over a `lectern_model::TimetableModel`:
//! given one class (and optional pinned placements), explore the chains of
//! reassignments that give that class a usable slot, and report the best
//! few as diffs against the current timetable.
//!
//! Core flow
//! - Load a `TimetableModel` and its working `AssignmentState` into a
//!   `service::SuggestionService`.
//! - Send it a `request::ComputeSuggestionsRequest`.
//! - Read the ranked `suggestion::Suggestion` diffs off the
//!   `result::SuggestionsResult`.
//!
//! Design highlights
//! - One mutable timetable: the search works in place on the live
//!   assignment and restores it exactly via per‑trial frames; there is no
//!   cloning of the timetable anywhere on the hot path.
//! - Deterministic: conflicted classes are visited in ascending arena
//!   order, candidates ascending by `(value, placement id)`, and ranking
//!   ties break on the suggestion's canonical diff key.
//! - Bounded everything: results per request (`limit`), recursion depth
//!   (`depth`), wall time (`time_limit_ms`, sticky once tripped).
//!
//! Assumptions and guarantees
//! - The branch bound is admissible (cheapest usable candidate per
//!   conflicted class); pruning never discards an improving leaf.
//! - After `run` returns, the assignment equals its pre‑search snapshot on
//!   every path, timeouts and rejected selections included.
//!
//! Module map
//! - `engine`: the search session itself.
//! - `trail`: conflict set, resolution trail, install/rollback frames.
//! - `collector`: bounded best‑K collection with deterministic ties.
//! - `builder`: suggestion diffs and their conflict annotations.
//! - `resolver`: pinned‑selection to candidate resolution.
//! - `request` / `result` / `suggestion`: the serialized boundary DTOs.
//! - `service`: ownership, ready/busy gating.
//! - `stats`: search counters/timing.
//! - `err`: boundary errors.

pub mod builder;
pub mod collector;
pub mod engine;
pub mod err;
pub mod request;
pub mod resolver;
pub mod result;
pub mod service;
pub mod stats;
pub mod suggestion;
mod trail;
