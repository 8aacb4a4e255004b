// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Nearest-neighbour candidate generation for numeric descent.
//!
//! Version-like digit runs rarely match the catalogue exactly: the
//! catalogue knows Chrome 50 and 52, the subject says Chrome 51. Numeric
//! descent bridges the gap, but only between values of comparable
//! magnitude. Five fixed buckets ([0,10), [10,100), [100,1000),
//! [1000,10000), [10000,32767]) partition the value space, and a
//! candidate is only eligible when it shares the subject value's bucket.
//! A subject value of 9999 never approximates to a two-digit version, no
//! matter how close the arithmetic difference looks.
//!
//! `NumericCandidates` walks outward from the insertion point of the
//! subject value in the sorted numeric children, yielding the remaining
//! in-bucket candidate with the smaller absolute difference first and
//! preferring the lower value on a tie. It is pulled lazily: the caller
//! stops consuming as soon as a recursive match succeeds, so candidates
//! that would never be charged are never produced.

use crate::node::index::NumericIndex;

/// Largest value a numeric edge can carry (the index stores `i16`).
pub const MAX_NUMERIC_VALUE: i64 = 32767;

/// Half-open magnitude bucket bounds; the final bucket's upper bound is
/// `MAX_NUMERIC_VALUE + 1`, making it inclusive of 32767.
const BUCKETS: [(i64, i64); 5] = [
    (0, 10),
    (10, 100),
    (100, 1000),
    (1000, 10000),
    (10000, MAX_NUMERIC_VALUE + 1),
];

/// The magnitude bucket containing `value`, or `None` when the value is
/// negative or beyond the representable range.
fn bucket_of(value: i64) -> Option<(i64, i64)> {
    BUCKETS
        .iter()
        .copied()
        .find(|&(low, high)| value >= low && value < high)
}

/// Extract the digit run ending at `position` in the subject.
///
/// Scans leftward from `position` while bytes are ASCII digits and
/// returns the run's value, or -1 when the byte at `position` is not a
/// digit (or `position` is outside the subject). Digits accumulate into
/// an `i64`, so a pathological run cannot overflow; anything above
/// `MAX_NUMERIC_VALUE` simply falls outside every bucket.
pub(crate) fn digit_run_value(target: &[u8], position: i32) -> i64 {
    if position < 0 || position as usize >= target.len() {
        return -1;
    }
    let end = position as usize;
    let mut start = end;
    loop {
        if !target[start].is_ascii_digit() {
            // No digit at `position` at all.
            if start == end {
                return -1;
            }
            start += 1;
            break;
        }
        if start == 0 {
            break;
        }
        start -= 1;
    }
    let mut value: i64 = 0;
    for &b in &target[start..=end] {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    value
}

/// Pull-based nearest-neighbour walk over sorted numeric children.
///
/// Non-restartable and finite: each side of the walk stops as soon as it
/// leaves the subject value's bucket (the array is sorted, so once out of
/// bucket a side never comes back in).
pub(crate) struct NumericCandidates<'a> {
    children: &'a [NumericIndex],
    target: i64,
    bucket: (i64, i64),
    low: isize,
    high: isize,
    low_in_range: bool,
    high_in_range: bool,
}

impl<'a> NumericCandidates<'a> {
    /// Position the walk around `target`'s insertion point. Returns
    /// `None` when the target has no bucket or there are no children.
    pub(crate) fn new(children: &'a [NumericIndex], target: i64) -> Option<Self> {
        if children.is_empty() {
            return None;
        }
        let bucket = bucket_of(target)?;
        // On an exact hit the low side starts at the equal value itself,
        // a zero-difference candidate.
        let low = match children.binary_search_by(|c| i64::from(c.value()).cmp(&target)) {
            Ok(index) => index as isize,
            Err(insertion) => insertion as isize - 1,
        };
        let high = low + 1;
        let mut walk = Self {
            children,
            target,
            bucket,
            low,
            high,
            low_in_range: false,
            high_in_range: false,
        };
        walk.low_in_range = walk.in_range(low);
        walk.high_in_range = walk.in_range(high);
        Some(walk)
    }

    fn in_range(&self, index: isize) -> bool {
        if index < 0 || index as usize >= self.children.len() {
            return false;
        }
        let value = i64::from(self.children[index as usize].value());
        value >= self.bucket.0 && value < self.bucket.1
    }
}

impl<'a> Iterator for NumericCandidates<'a> {
    type Item = &'a NumericIndex;

    fn next(&mut self) -> Option<&'a NumericIndex> {
        let take_low = if self.low_in_range && self.high_in_range {
            let low_diff = self.target - i64::from(self.children[self.low as usize].value());
            let high_diff = i64::from(self.children[self.high as usize].value()) - self.target;
            // Tie on absolute difference goes to the lower value.
            low_diff <= high_diff
        } else if self.low_in_range {
            true
        } else if self.high_in_range {
            false
        } else {
            return None;
        };

        if take_low {
            let item = &self.children[self.low as usize];
            self.low -= 1;
            self.low_in_range = self.in_range(self.low);
            Some(item)
        } else {
            let item = &self.children[self.high as usize];
            self.high += 1;
            self.high_in_range = self.in_range(self.high);
            Some(item)
        }
    }
}
