//! Box store: the frame's byte buffer as an ordered list of small chunks.
//!
//! Box 0 is a reserved empty box standing in front of the first byte; every
//! other box is non-empty once a public operation returns. Each box caches
//! its laid-out width and whether it contains a newline. The caches are
//! private and refreshed by the same call that mutates the bytes, so they
//! are never observed stale.
//!
//! Offsets are byte offsets into the concatenation of all boxes.

use crate::error::BoxError;
use crate::metrics::Measure;
use std::fmt;
use tracing::trace;

/// Box slots reserved up front by `BoxStore::new`.
pub const DEFAULT_BOX_SLOTS: usize = 25;
/// Bytes a box grows to before insertion spills into a fresh box.
pub const DEFAULT_BOX_CAPACITY: usize = 25;

/// One chunk of the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBox {
    data: Vec<u8>,
    width: i32,
    newline: bool,
}

impl TextBox {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            width: 0,
            newline: false,
        }
    }

    fn refresh(&mut self, measure: &Measure) {
        self.width = measure(&self.data);
        self.newline = self.data.contains(&b'\n');
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.data.capacity()
    }

    /// Laid-out pixel width of the whole box.
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn has_newline(&self) -> bool {
        self.newline
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

pub struct BoxStore {
    boxes: Vec<TextBox>,
    measure: Measure,
    capacity: usize,
}

impl fmt::Debug for BoxStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxStore")
            .field("boxes", &self.boxes)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl BoxStore {
    pub fn new(measure: Measure) -> Self {
        Self::with_capacity(measure, DEFAULT_BOX_SLOTS, DEFAULT_BOX_CAPACITY)
    }

    /// Create an empty store with `slots` box slots pre-allocated and boxes
    /// that hold `capacity` bytes before spilling.
    pub fn with_capacity(measure: Measure, slots: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut boxes = Vec::with_capacity(slots.max(1));
        boxes.push(TextBox::with_capacity(0));
        Self {
            boxes,
            measure,
            capacity,
        }
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn box_capacity(&self) -> usize {
        self.capacity
    }

    /// Total content length in bytes.
    pub fn len(&self) -> usize {
        self.boxes.iter().map(TextBox::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.iter().all(TextBox::is_empty)
    }

    pub fn get(&self, n: usize) -> Option<&TextBox> {
        self.boxes.get(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextBox> {
        self.boxes.iter()
    }

    /// Flat copy of the content.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for b in &self.boxes {
            out.extend_from_slice(&b.data);
        }
        out
    }

    fn check_index(&self, index: usize) -> Result<(), BoxError> {
        if index >= self.boxes.len() {
            return Err(BoxError::BoxIndex {
                index,
                count: self.boxes.len(),
            });
        }
        Ok(())
    }

    fn check_content_index(&self, index: usize) -> Result<(), BoxError> {
        self.check_index(index)?;
        if index == 0 {
            return Err(BoxError::ReservedBox);
        }
        Ok(())
    }

    /// Insert `bytes` so that they begin at `offset`.
    ///
    /// The bytes are appended to the box ending at `offset` (split out of a
    /// larger box when needed) until it reaches the box capacity; the rest is
    /// placed in new boxes directly after it.
    pub fn insert(&mut self, bytes: &[u8], offset: usize) -> Result<(), BoxError> {
        let len = self.len();
        if offset > len {
            return Err(BoxError::OutOfRange { offset, len });
        }
        if bytes.is_empty() {
            return Ok(());
        }
        let n = self.find(0, 0, offset)?;
        let mut rest = bytes;
        if n > 1 {
            let tail = &mut self.boxes[n - 1];
            let take = self.capacity.saturating_sub(tail.len()).min(rest.len());
            if take > 0 {
                tail.data.extend_from_slice(&rest[..take]);
                tail.refresh(&self.measure);
                rest = &rest[take..];
            }
        }
        let mut at = n;
        for chunk in rest.chunks(self.capacity) {
            let mut fresh = TextBox::with_capacity(self.capacity);
            fresh.data.extend_from_slice(chunk);
            fresh.refresh(&self.measure);
            self.boxes.insert(at, fresh);
            at += 1;
        }
        trace!(target: "text.boxes", offset, size_bytes = bytes.len(), boxes = self.boxes.len(), "insert");
        Ok(())
    }

    /// Scan from box `n`, which begins at offset `i`, to offset `j`, splitting
    /// the box that straddles `j`. Returns the index of the box starting at
    /// `j`, or `box_count()` when `j` is the end of the content.
    pub fn find(&mut self, n: usize, i: usize, j: usize) -> Result<usize, BoxError> {
        if j < i {
            return Err(BoxError::FindBeforeStart {
                start: i,
                target: j,
            });
        }
        if n > self.boxes.len() {
            return Err(BoxError::BoxIndex {
                index: n,
                count: self.boxes.len(),
            });
        }
        let (mut n, mut i) = (n, i);
        while n < self.boxes.len() {
            let w = self.boxes[n].len();
            if i + w > j {
                break;
            }
            i += w;
            n += 1;
        }
        if i == j {
            return Ok(n);
        }
        if n == self.boxes.len() {
            return Err(BoxError::OutOfRange { offset: j, len: i });
        }
        trace!(target: "text.boxes", box_index = n, at = j - i, "find_split");
        self.split(n, j - i)?;
        Ok(n + 1)
    }

    /// Split box `n` into its first `at` bytes and the remainder.
    pub fn split(&mut self, n: usize, at: usize) -> Result<(), BoxError> {
        self.check_content_index(n)?;
        let len = self.boxes[n].len();
        if at == 0 || at >= len {
            return Err(BoxError::SplitPoint { index: n, len, at });
        }
        self.dup(n)?;
        self.truncate(n, at)?;
        self.chop(n + 1, at)
    }

    /// Insert a copy of box `n` right after it.
    pub fn dup(&mut self, n: usize) -> Result<(), BoxError> {
        self.check_content_index(n)?;
        let copy = self.boxes[n].clone();
        self.boxes.insert(n + 1, copy);
        Ok(())
    }

    /// Keep only the first `k` bytes of box `n`. A content box must keep at
    /// least one byte.
    pub fn truncate(&mut self, n: usize, k: usize) -> Result<(), BoxError> {
        self.check_index(n)?;
        let tb = &mut self.boxes[n];
        if k > tb.len() || (n > 0 && k == 0) {
            return Err(BoxError::ByteCount {
                index: n,
                len: tb.len(),
                count: k,
            });
        }
        tb.data.truncate(k);
        tb.refresh(&self.measure);
        Ok(())
    }

    /// Drop the first `k` bytes of box `n`. A content box must keep at least
    /// one byte.
    pub fn chop(&mut self, n: usize, k: usize) -> Result<(), BoxError> {
        self.check_index(n)?;
        let tb = &mut self.boxes[n];
        if k > tb.len() || (n > 0 && k == tb.len()) {
            return Err(BoxError::ByteCount {
                index: n,
                len: tb.len(),
                count: k,
            });
        }
        tb.data.drain(..k);
        tb.refresh(&self.measure);
        Ok(())
    }

    /// Append box `n + 1` to box `n` and remove it.
    pub fn merge(&mut self, n: usize) -> Result<(), BoxError> {
        self.check_content_index(n)?;
        self.check_index(n + 1)?;
        let next = self.boxes.remove(n + 1);
        let tb = &mut self.boxes[n];
        tb.data.extend_from_slice(&next.data);
        tb.refresh(&self.measure);
        trace!(target: "text.boxes", box_index = n, len = tb.len(), "merge");
        Ok(())
    }

    /// Remove boxes `[n0, n1)`.
    pub fn delete(&mut self, n0: usize, n1: usize) -> Result<(), BoxError> {
        if n0 > n1 || n1 > self.boxes.len() {
            return Err(BoxError::BoxIndex {
                index: n1.max(n0),
                count: self.boxes.len(),
            });
        }
        if n0 == n1 {
            return Ok(());
        }
        if n0 == 0 {
            return Err(BoxError::ReservedBox);
        }
        self.boxes.drain(n0..n1);
        trace!(target: "text.boxes", n0, n1, boxes = self.boxes.len(), "delete");
        Ok(())
    }

    /// Remove the bytes in `[i, j)`.
    pub fn delete_range(&mut self, i: usize, j: usize) -> Result<(), BoxError> {
        if j < i {
            return Err(BoxError::FindBeforeStart {
                start: i,
                target: j,
            });
        }
        let len = self.len();
        if j > len {
            return Err(BoxError::OutOfRange { offset: j, len });
        }
        if i == j {
            return Ok(());
        }
        let n0 = self.find(0, 0, i)?;
        let n1 = self.find(n0, i, j)?;
        self.delete(n0, n1)
    }

    /// Box index and offset within it for the byte at `offset`, without
    /// splitting. `offset == len()` yields `(box_count(), 0)`.
    pub fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (n, tb) in self.boxes.iter().enumerate() {
            if offset < start + tb.len() {
                return Some((n, offset - start));
            }
            start += tb.len();
        }
        (offset == start).then_some((self.boxes.len(), 0))
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        let (n, inner) = self.locate(offset)?;
        self.boxes.get(n).map(|tb| tb.data[inner])
    }

    /// Copy bytes starting at `offset` into `buf`.
    ///
    /// Running out of content before `buf` is full is an error; the bytes
    /// that were available have still been copied.
    pub fn read_at(&self, buf: &mut [u8], offset: usize) -> Result<usize, BoxError> {
        let len = self.len();
        let Some((mut n, mut inner)) = self.locate(offset) else {
            return Err(BoxError::OutOfRange { offset, len });
        };
        let mut read = 0;
        while read < buf.len() && n < self.boxes.len() {
            let src = &self.boxes[n].data[inner..];
            let k = src.len().min(buf.len() - read);
            buf[read..read + k].copy_from_slice(&src[..k]);
            read += k;
            n += 1;
            inner = 0;
        }
        if read < buf.len() {
            return Err(BoxError::ShortRead {
                read,
                wanted: buf.len(),
            });
        }
        Ok(read)
    }
}
