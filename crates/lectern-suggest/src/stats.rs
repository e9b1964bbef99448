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

use std::time::Duration;

/// Statistics collected during one suggestion search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchStatistics {
    /// Total recursive calls entered (one per combination considered).
    pub combinations_considered: u64,
    /// Total leaf assignments offered to the collector.
    pub solutions_found: u64,
    /// Pruned because the admissible branch bound could not beat the worst
    /// kept suggestion.
    pub prunings_bound: u64,
    /// Branches abandoned because the depth budget was exhausted.
    pub prunings_depth: u64,
    /// The deepest eviction chain resolved.
    pub max_depth: u64,
    /// Total time spent in the search.
    pub time_total: Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn on_combination(&mut self) {
        self.combinations_considered = self.combinations_considered.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_depth(&mut self) {
        self.prunings_depth = self.prunings_depth.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Suggestion Search Statistics:")?;
        writeln!(f, "  Combinations considered: {}", self.combinations_considered)?;
        writeln!(f, "  Solutions found:         {}", self.solutions_found)?;
        writeln!(f, "  Prunings (bound):        {}", self.prunings_bound)?;
        writeln!(f, "  Prunings (depth):        {}", self.prunings_depth)?;
        writeln!(f, "  Max depth reached:       {}", self.max_depth)?;
        writeln!(f, "  Total time:              {:.2?}", self.time_total)?;
        Ok(())
    }
}
