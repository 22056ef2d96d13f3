//! The committed caret or selection of a frame.
//!
//! `p0..p1` is what editing operations act on. The pen is the live sweep;
//! it only becomes the tick on [`Tick::commit`], and [`Tick::cancel`] throws
//! an uncommitted sweep away.

use core_geom::{Point, Rect};
use core_select::{Resolver, Selection};
use smallvec::SmallVec;

#[derive(Debug, Clone)]
pub struct Tick {
    p0: usize,
    p1: usize,
    pen: Selection,
}

impl Tick {
    pub fn new(size: Point) -> Self {
        Self {
            p0: 0,
            p1: 0,
            pen: Selection::new(size),
        }
    }

    /// Collapse to a caret at `offset` and start a new sweep there.
    pub fn open<R: Resolver + ?Sized>(&mut self, offset: usize, res: &R) {
        self.p0 = offset;
        self.p1 = offset;
        self.pen.open(offset, res);
    }

    pub fn sweep<R: Resolver + ?Sized>(&mut self, offset: usize, res: &R) {
        self.pen.sweep(offset, res);
    }

    /// Adopt the pen's range.
    pub fn commit(&mut self) {
        let r = self.pen.range();
        self.p0 = r.start;
        self.p1 = r.end;
    }

    /// Put the pen back on the committed range.
    pub fn cancel<R: Resolver + ?Sized>(&mut self, res: &R) {
        self.pen.open(self.p0, res);
        self.pen.sweep(self.p1, res);
    }

    /// Committed range, ordered.
    pub fn addr(&self) -> (usize, usize) {
        (self.p0, self.p1)
    }

    /// True when the committed range is not a bare caret.
    pub fn selected(&self) -> bool {
        self.p0 != self.p1
    }

    pub fn rects(&self) -> SmallVec<[Rect; 3]> {
        self.pen.rects()
    }

    /// Whether `pt` falls inside the highlighted area.
    pub fn contains(&self, pt: Point) -> bool {
        self.pen.rects().iter().any(|r| r.contains(pt))
    }

    pub fn pen(&self) -> &Selection {
        &self.pen
    }

    pub fn resize<R: Resolver + ?Sized>(&mut self, size: Point, res: &R) {
        self.pen.resize(size, res);
    }

    /// Shift the committed range past `n` bytes inserted at `at`.
    pub(crate) fn shift_insert(&mut self, at: usize, n: usize) {
        let shift = |p: usize| if p >= at { p + n } else { p };
        self.p0 = shift(self.p0);
        self.p1 = shift(self.p1);
    }

    /// Pull the committed range in over the deleted bytes `i..j`.
    pub(crate) fn shift_delete(&mut self, i: usize, j: usize) {
        let shift = |p: usize| {
            if p >= j {
                p - (j - i)
            } else if p > i {
                i
            } else {
                p
            }
        };
        self.p0 = shift(self.p0);
        self.p1 = shift(self.p1);
    }

    /// Rebuild the pen from the committed range after the content moved.
    pub(crate) fn resync<R: Resolver + ?Sized>(&mut self, res: &R) {
        self.cancel(res);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{BoxStore, FixedMetrics, Layout, Mapper};
    use std::sync::Arc;

    fn fixture() -> (BoxStore, Layout) {
        let layout = Layout::new(Point::ZERO, 40, Arc::new(FixedMetrics::new(4, 10)));
        let mut boxes = BoxStore::new(layout.measure());
        boxes.insert(b"0123456789", 0).unwrap();
        (boxes, layout)
    }

    #[test]
    fn commit_orders_and_cancel_restores() {
        let (boxes, layout) = fixture();
        let m = Mapper::new(&boxes, &layout);
        let mut t = Tick::new(Point::new(40, 20));
        t.open(6, &m);
        t.sweep(2, &m);
        assert!(!t.selected());
        t.commit();
        assert_eq!(t.addr(), (2, 6));
        assert!(t.selected());
        t.sweep(9, &m);
        assert_eq!(t.addr(), (2, 6));
        t.cancel(&m);
        assert_eq!(t.pen().range(), 2..6);
        assert_eq!(t.rects().as_slice(), &[Rect::new(8, 0, 24, 10)]);
        assert!(t.contains(Point::new(10, 5)));
        assert!(!t.contains(Point::new(30, 5)));
    }

    #[test]
    fn shifts_follow_edits() {
        let mut t = Tick::new(Point::new(40, 20));
        t.p0 = 3;
        t.p1 = 7;
        t.shift_insert(5, 2);
        assert_eq!(t.addr(), (3, 9));
        t.shift_insert(3, 1);
        assert_eq!(t.addr(), (4, 10));
        t.shift_delete(0, 2);
        assert_eq!(t.addr(), (2, 8));
        t.shift_delete(4, 20);
        assert_eq!(t.addr(), (2, 4));
    }
}
