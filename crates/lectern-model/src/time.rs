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

//! Time primitives for candidate placements.
//!
//! A `TimeLocation` describes one recurring meeting pattern: a bitmask of
//! weekdays, a starting slot, a length in slots, and the time/date pattern
//! identifiers the pattern was generated from. Slots are abstract; the model
//! never interprets them as wall-clock times.

/// One recurring meeting time of a class: weekday bitmask, starting slot,
/// length in slots, the generating time/date pattern ids, and the (soft)
/// time preference of this pattern.
///
/// Two `TimeLocation`s overlap when they share at least one weekday, the same
/// date pattern, and their slot ranges intersect.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TimeLocation {
    day_code: u32,
    start_slot: u32,
    length: u32,
    time_pattern_id: u64,
    date_pattern_id: u64,
    preference: f64,
}

impl TimeLocation {
    /// Creates a new `TimeLocation`.
    #[inline]
    pub const fn new(
        day_code: u32,
        start_slot: u32,
        length: u32,
        time_pattern_id: u64,
        date_pattern_id: u64,
        preference: f64,
    ) -> Self {
        Self {
            day_code,
            start_slot,
            length,
            time_pattern_id,
            date_pattern_id,
            preference,
        }
    }

    /// Returns the weekday bitmask (bit 0 = Monday).
    #[inline]
    pub const fn day_code(&self) -> u32 {
        self.day_code
    }

    /// Returns the first occupied slot.
    #[inline]
    pub const fn start_slot(&self) -> u32 {
        self.start_slot
    }

    /// Returns the length in slots.
    #[inline]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Returns the first slot after the meeting ends.
    #[inline]
    pub const fn end_slot(&self) -> u32 {
        self.start_slot + self.length
    }

    /// Returns the identifier of the generating time pattern.
    #[inline]
    pub const fn time_pattern_id(&self) -> u64 {
        self.time_pattern_id
    }

    /// Returns the identifier of the generating date pattern.
    #[inline]
    pub const fn date_pattern_id(&self) -> u64 {
        self.date_pattern_id
    }

    /// Returns the soft time preference of this pattern (lower is better).
    #[inline]
    pub const fn preference(&self) -> f64 {
        self.preference
    }

    /// Returns true if both locations meet on at least one common weekday.
    #[inline]
    pub const fn shares_days(&self, other: &TimeLocation) -> bool {
        self.day_code & other.day_code != 0
    }

    /// Returns true if the slot ranges of both locations intersect.
    #[inline]
    pub const fn shares_hours(&self, other: &TimeLocation) -> bool {
        self.start_slot < other.end_slot() && other.start_slot < self.end_slot()
    }

    /// Returns true if both locations occupy at least one common slot on a
    /// common weekday of a common date pattern.
    #[inline]
    pub const fn overlaps(&self, other: &TimeLocation) -> bool {
        self.date_pattern_id == other.date_pattern_id
            && self.shares_days(other)
            && self.shares_hours(other)
    }

    /// Returns true if both locations describe the same meeting time
    /// (days, start, length, and date pattern all equal).
    #[inline]
    pub const fn same_time(&self, other: &TimeLocation) -> bool {
        self.day_code == other.day_code
            && self.start_slot == other.start_slot
            && self.length == other.length
            && self.date_pattern_id == other.date_pattern_id
    }
}

impl std::fmt::Display for TimeLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimeLocation(days: {:#09b}, slots: {}..{})",
            self.day_code,
            self.start_slot,
            self.end_slot()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(day_code: u32, start_slot: u32, length: u32) -> TimeLocation {
        TimeLocation::new(day_code, start_slot, length, 1, 1, 0.0)
    }

    #[test]
    fn test_end_slot() {
        let t = time(0b101, 10, 6);
        assert_eq!(t.end_slot(), 16);
    }

    #[test]
    fn test_overlap_requires_common_day() {
        let a = time(0b001, 10, 6);
        let b = time(0b010, 10, 6);
        assert!(!a.overlaps(&b));
        let c = time(0b011, 10, 6);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_overlap_requires_intersecting_slots() {
        let a = time(0b1, 10, 6);
        let b = time(0b1, 16, 6);
        // Half-open ranges: [10, 16) and [16, 22) do not intersect.
        assert!(!a.overlaps(&b));
        let c = time(0b1, 15, 6);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_overlap_requires_same_date_pattern() {
        let a = TimeLocation::new(0b1, 10, 6, 1, 1, 0.0);
        let b = TimeLocation::new(0b1, 10, 6, 1, 2, 0.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_same_time_ignores_time_pattern() {
        let a = TimeLocation::new(0b101, 10, 6, 1, 1, 0.0);
        let b = TimeLocation::new(0b101, 10, 6, 2, 1, 4.0);
        assert!(a.same_time(&b));
        let c = TimeLocation::new(0b101, 12, 6, 1, 1, 0.0);
        assert!(!a.same_time(&c));
    }
}
