//! Selection geometry.
//!
//! A selection is an anchor offset fixed when the sweep starts and a point
//! offset that follows the pointer. On screen it is at most three rectangles:
//! the partial first line, a full-width block for the lines in between, and
//! the partial last line. Each rectangle lives in a fixed slot so that a
//! sweep only repaints the strip that changed in each slot.

pub mod mask;

pub use mask::HighlightMask;

use core_geom::{Point, Rect};
use core_text::Mapper;
use smallvec::{SmallVec, smallvec};
use std::ops::Range;
use tracing::{debug, trace};

/// Offset/point translation the selection needs from layout.
pub trait Resolver {
    fn point_of(&self, offset: usize) -> Point;
    fn index_of(&self, pt: Point) -> usize;
    fn line_height(&self) -> i32;
    fn origin(&self) -> Point;
}

impl Resolver for Mapper<'_> {
    fn point_of(&self, offset: usize) -> Point {
        Mapper::point_of(self, offset)
    }

    fn index_of(&self, pt: Point) -> usize {
        Mapper::index_of(self, pt)
    }

    fn line_height(&self) -> i32 {
        self.layout().line_height()
    }

    fn origin(&self) -> Point {
        self.layout().origin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fold {
    /// The slot grows; paint what was added.
    Extend,
    /// The slot shrinks; erase what was removed.
    Shrink,
}

#[derive(Debug, Clone)]
pub struct Selection {
    anchor: usize,
    point: usize,
    anchor_pt: Point,
    point_pt: Point,
    slots: [Rect; 3],
    mask: HighlightMask,
}

/// Rectangle from explicit corners, empty when the corners are inverted.
fn span(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
    Rect {
        min: Point::new(x0, y0),
        max: Point::new(x1, y1),
    }
    .canon()
}

impl Selection {
    pub fn new(size: Point) -> Self {
        Self {
            anchor: 0,
            point: 0,
            anchor_pt: Point::ZERO,
            point_pt: Point::ZERO,
            slots: [Rect::ZERO; 3],
            mask: HighlightMask::new(size),
        }
    }

    /// Start a new selection at `offset`, dropping the previous highlight.
    pub fn open<R: Resolver + ?Sized>(&mut self, offset: usize, res: &R) {
        let pt = res.point_of(offset);
        self.anchor = offset;
        self.point = offset;
        self.anchor_pt = pt;
        self.point_pt = pt;
        self.clear();
    }

    /// Reset to an empty selection at offset 0.
    pub fn close(&mut self) {
        self.anchor = 0;
        self.point = 0;
        self.anchor_pt = Point::ZERO;
        self.point_pt = Point::ZERO;
        self.clear();
    }

    /// Erase the highlight without moving the anchor or point.
    pub fn clear(&mut self) {
        self.mask.clear();
        self.slots = [Rect::ZERO; 3];
    }

    /// Move the point to `offset`, repainting only what changed.
    pub fn sweep<R: Resolver + ?Sized>(&mut self, offset: usize, res: &R) {
        let before = self.point;
        self.update(offset, res);
        trace!(target: "select", anchor = self.anchor, from = before, to = offset, "sweep");
    }

    pub fn update<R: Resolver + ?Sized>(&mut self, offset: usize, res: &R) {
        let (a, b, c) = (self.anchor, self.point, offset);
        if b == c {
            return;
        }
        let at = self.anchor_pt;
        let ct = res.point_of(c);
        let steps: SmallVec<[(Point, Point, Fold); 2]> = if a <= b && b < c {
            // down
            smallvec![(at, ct, Fold::Extend)]
        } else if a <= c && c < b {
            // down and up
            smallvec![(at, ct, Fold::Shrink)]
        } else if c < b && b <= a {
            // up
            smallvec![(ct, at, Fold::Extend)]
        } else if c < a && a <= b {
            // down and up over the anchor
            smallvec![(at, at, Fold::Shrink), (ct, at, Fold::Extend)]
        } else if b < c && c <= a {
            // up and down
            smallvec![(ct, at, Fold::Shrink)]
        } else {
            // up and down over the anchor
            smallvec![(at, at, Fold::Shrink), (at, ct, Fold::Extend)]
        };
        for (p, q, fold) in steps {
            self.fold(p, q, fold, res);
        }
        self.point = c;
        self.point_pt = ct;
    }

    fn fold<R: Resolver + ?Sized>(&mut self, p: Point, q: Point, fold: Fold, res: &R) {
        let next = self.layout_slots(p, q, res);
        let mut clears: SmallVec<[Rect; 3]> = SmallVec::new();
        let mut fills: SmallVec<[Rect; 3]> = SmallVec::new();
        for (slot, (&old, &new)) in self.slots.iter().zip(next.iter()).enumerate() {
            if old == new {
                continue;
            }
            match (fold, old.difference(new)) {
                (Fold::Extend, Ok(strip)) if new.contains_rect(old) => fills.push(strip),
                (Fold::Shrink, Ok(strip)) if old.contains_rect(new) => clears.push(strip),
                (_, diff) => {
                    if let Err(err) = diff {
                        debug!(target: "select", slot, %err, "slot replaced");
                    }
                    clears.push(old);
                    fills.push(new);
                }
            }
        }
        // clears first: a strip leaving one slot may be entering another
        for r in clears {
            self.mask.erase(r);
        }
        for r in fills {
            self.mask.fill(r);
        }
        self.slots = next;
    }

    /// Slot rectangles for the text between `p` and `q`, `p` first in
    /// reading order.
    fn layout_slots<R: Resolver + ?Sized>(&self, p: Point, q: Point, res: &R) -> [Rect; 3] {
        let h = res.line_height();
        let m = self.mask.size();
        let o = res.origin();
        if p.y == q.y {
            return [span(p.x, p.y, q.x, p.y + h), Rect::ZERO, Rect::ZERO];
        }
        let top = span(p.x, p.y, m.x, p.y + h);
        let below = p.y + h;
        let middle = if below != q.y {
            span(o.x, below, m.x, q.y)
        } else {
            Rect::ZERO
        };
        let bottom = span(o.x, q.y, q.x, q.y + h);
        [top, middle, bottom]
    }

    /// Recompute cached points after the content changed and repaint.
    pub fn refresh<R: Resolver + ?Sized>(&mut self, res: &R) {
        self.anchor_pt = res.point_of(self.anchor);
        self.point_pt = res.point_of(self.point);
        self.repaint(res);
    }

    fn repaint<R: Resolver + ?Sized>(&mut self, res: &R) {
        self.mask.clear();
        let (p, q) = if self.point < self.anchor {
            (self.point_pt, self.anchor_pt)
        } else {
            (self.anchor_pt, self.point_pt)
        };
        self.slots = self.layout_slots(p, q, res);
        for r in self.slots {
            self.mask.fill(r);
        }
    }

    /// Follow a frame resize; the highlight is repainted into the new mask.
    pub fn resize<R: Resolver + ?Sized>(&mut self, size: Point, res: &R) {
        if self.mask.resize(size) {
            debug!(target: "select", width = size.x, height = size.y, "mask resized");
            self.repaint(res);
        }
    }

    /// Non-empty rectangles in reading order.
    pub fn rects(&self) -> SmallVec<[Rect; 3]> {
        self.slots.iter().copied().filter(|r| !r.is_empty()).collect()
    }

    pub fn slots(&self) -> [Rect; 3] {
        self.slots
    }

    /// `(anchor, point)`, unordered.
    pub fn addr(&self) -> (usize, usize) {
        (self.anchor, self.point)
    }

    /// The selected byte range.
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.point)..self.anchor.max(self.point)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.point
    }

    pub fn anchor_point(&self) -> Point {
        self.anchor_pt
    }

    pub fn sweep_point(&self) -> Point {
        self.point_pt
    }

    pub fn mask(&self) -> &HighlightMask {
        &self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{BoxStore, FixedMetrics, Layout};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn fixture(text: &[u8]) -> (BoxStore, Layout) {
        let layout = Layout::new(Point::ZERO, 40, Arc::new(FixedMetrics::new(4, 10)));
        let mut boxes = BoxStore::new(layout.measure());
        boxes.insert(text, 0).unwrap();
        (boxes, layout)
    }

    #[test]
    fn sweep_on_one_line_is_one_rect() {
        let (boxes, layout) = fixture(b"supermink");
        let m = Mapper::new(&boxes, &layout);
        let mut s = Selection::new(Point::new(40, 40));
        s.open(0, &m);
        s.sweep(9, &m);
        assert_eq!(s.rects().as_slice(), &[Rect::new(0, 0, 36, 10)]);
        assert_eq!(s.mask().coverage(), 360);
        assert_eq!(s.range(), 0..9);
    }

    #[test]
    fn multi_line_selection_has_three_slots() {
        // 10 glyphs per line
        let (boxes, layout) = fixture(&[b'x'; 35]);
        let m = Mapper::new(&boxes, &layout);
        let mut s = Selection::new(Point::new(40, 40));
        s.open(3, &m);
        s.sweep(32, &m);
        assert_eq!(
            s.slots(),
            [
                Rect::new(12, 0, 40, 10),
                Rect::new(0, 10, 40, 30),
                Rect::new(0, 30, 8, 40),
            ]
        );
        assert_eq!(s.mask().coverage(), 28 * 10 + 40 * 20 + 8 * 10);
    }

    #[test]
    fn sweeping_back_over_anchor_flips_direction() {
        let (boxes, layout) = fixture(b"0123456789");
        let m = Mapper::new(&boxes, &layout);
        let mut s = Selection::new(Point::new(40, 20));
        s.open(5, &m);
        s.sweep(8, &m);
        s.sweep(2, &m);
        assert_eq!(s.rects().as_slice(), &[Rect::new(8, 0, 20, 10)]);
        assert_eq!(s.mask().coverage(), 120);
        s.sweep(9, &m);
        assert_eq!(s.rects().as_slice(), &[Rect::new(20, 0, 36, 10)]);
        assert_eq!(s.mask().coverage(), 160);
        assert_eq!(s.addr(), (5, 9));
    }

    #[test]
    fn returning_to_anchor_empties_selection() {
        let (boxes, layout) = fixture(b"0123456789");
        let m = Mapper::new(&boxes, &layout);
        let mut s = Selection::new(Point::new(40, 20));
        s.open(5, &m);
        s.sweep(2, &m);
        s.sweep(5, &m);
        assert!(s.rects().is_empty());
        assert_eq!(s.mask().coverage(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn resize_repaints() {
        let (boxes, layout) = fixture(b"0123456789");
        let m = Mapper::new(&boxes, &layout);
        let mut s = Selection::new(Point::new(40, 20));
        s.open(0, &m);
        s.sweep(4, &m);
        s.resize(Point::new(80, 40), &m);
        assert_eq!(s.mask().size(), Point::new(80, 40));
        assert_eq!(s.mask().coverage(), 160);
    }

    #[test]
    fn close_resets() {
        let (boxes, layout) = fixture(b"0123456789");
        let m = Mapper::new(&boxes, &layout);
        let mut s = Selection::new(Point::new(40, 20));
        s.open(3, &m);
        s.sweep(6, &m);
        s.close();
        assert_eq!(s.addr(), (0, 0));
        assert_eq!(s.mask().coverage(), 0);
        assert_eq!(s.slots(), [Rect::ZERO; 3]);
    }
}
