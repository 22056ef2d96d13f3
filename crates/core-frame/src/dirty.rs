//! Dirty byte range tracking.
//!
//! Mutations record the byte interval whose layout changed, in offsets valid
//! after the mutation. An insertion shifts everything behind it, so it marks
//! through the end of the content; a deletion at the tail leaves an empty
//! range at the new end so the presenter still erases what was there.
//!
//! Invariants:
//! * `take` returns ranges sorted by start, clipped to the content length,
//!   with overlapping or touching ranges merged.
//! * After `take`, internal storage is cleared (one-shot consumption).

use std::ops::Range;

#[derive(Debug, Default)]
pub struct DirtyRanges {
    ranges: Vec<Range<usize>>,
}

impl DirtyRanges {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn mark(&mut self, range: Range<usize>) {
        if range.start > range.end {
            return;
        }
        self.ranges.push(range);
    }

    /// Mark the whole content, e.g. after a resize.
    pub fn mark_all(&mut self, len: usize) {
        self.ranges.clear();
        self.ranges.push(0..len);
    }

    /// Consume the marked ranges for content of length `len`.
    pub fn take(&mut self, len: usize) -> Vec<Range<usize>> {
        let mut v: Vec<Range<usize>> = self
            .ranges
            .drain(..)
            .map(|r| r.start.min(len)..r.end.min(len))
            .collect();
        v.sort_unstable_by_key(|r| (r.start, r.end));
        let mut out: Vec<Range<usize>> = Vec::with_capacity(v.len());
        for r in v {
            match out.last_mut() {
                Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
                _ => out.push(r),
            }
        }
        out
    }

    /// True if nothing has been marked since last consumption.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}
