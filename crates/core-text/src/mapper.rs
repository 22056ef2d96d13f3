//! Offset/point mapping over a box store.

use crate::boxes::BoxStore;
use crate::dot::Dot;
use crate::metrics::{GlyphMetrics, Measure, measure_with};
use core_geom::Point;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

/// Where text is laid out and with which metrics.
#[derive(Clone)]
pub struct Layout {
    pub origin: Point,
    pub wrap: i32,
    metrics: Arc<dyn GlyphMetrics>,
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("origin", &self.origin)
            .field("wrap", &self.wrap)
            .field("line_height", &self.metrics.line_height())
            .finish()
    }
}

impl Layout {
    pub fn new(origin: Point, wrap: i32, metrics: Arc<dyn GlyphMetrics>) -> Self {
        Self {
            origin,
            wrap,
            metrics,
        }
    }

    pub fn metrics(&self) -> &dyn GlyphMetrics {
        self.metrics.as_ref()
    }

    pub fn line_height(&self) -> i32 {
        self.metrics.line_height()
    }

    /// Box width function matching this layout's metrics.
    pub fn measure(&self) -> Measure {
        measure_with(Arc::clone(&self.metrics))
    }

    /// Snap `pt.y` to the top of the line it falls on.
    pub fn align_y(&self, pt: Point) -> Point {
        let h = self.line_height();
        if h <= 0 {
            return pt;
        }
        let line = (pt.y - self.origin.y).div_euclid(h);
        Point::new(pt.x, self.origin.y + line * h)
    }

    fn dot_at(&self, at: Point) -> Dot<'_> {
        Dot::resume(self.origin, at, self.wrap, self.metrics())
    }
}

/// Last `(offset, point)` answered by `point_of`.
#[derive(Debug, Default)]
pub struct PointCache(Cell<Option<(usize, Point)>>);

impl PointCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<(usize, Point)> {
        self.0.get()
    }

    pub fn set(&self, offset: usize, pt: Point) {
        self.0.set(Some((offset, pt)));
    }

    pub fn invalidate(&self) {
        self.0.set(None);
    }
}

/// Read-only view answering offset/point queries for one store and layout.
pub struct Mapper<'a> {
    boxes: &'a BoxStore,
    layout: &'a Layout,
    cache: Option<&'a PointCache>,
}

impl<'a> Mapper<'a> {
    pub fn new(boxes: &'a BoxStore, layout: &'a Layout) -> Self {
        Self {
            boxes,
            layout,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: &'a PointCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }

    /// The dot position after laying out the first `offset` bytes. Offsets
    /// past the end are clamped.
    pub fn point_of(&self, offset: usize) -> Point {
        let offset = offset.min(self.boxes.len());
        let (start, from) = match self.cache.and_then(PointCache::get) {
            Some((at, pt)) if at == offset => return pt,
            Some((at, pt)) if at < offset => (at, pt),
            _ => (0, self.layout.origin),
        };
        let pt = self.walk_points(start, offset, from);
        if let Some(cache) = self.cache {
            cache.set(offset, pt);
        }
        pt
    }

    /// `point_of(end)` resumed from a known `(start, start_pt)` pair.
    pub fn point_walk(&self, start: usize, end: usize, start_pt: Point) -> Point {
        if start > end || start > self.boxes.len() {
            return self.point_of(end);
        }
        self.walk_points(start, end.min(self.boxes.len()), start_pt)
    }

    fn walk_points(&self, start: usize, end: usize, from: Point) -> Point {
        let mut dot = self.layout.dot_at(from);
        let Some((mut n, mut inner)) = self.boxes.locate(start) else {
            return from;
        };
        let mut at = start;
        while at < end {
            let Some(tb) = self.boxes.get(n) else { break };
            let bytes = &tb.bytes()[inner..];
            let remaining = end - at;
            if inner == 0
                && bytes.len() <= remaining
                && !tb.has_newline()
                && dot.fits_within(tb.width())
            {
                dot.insert_box(tb);
                at += bytes.len();
            } else {
                let take = bytes.len().min(remaining);
                for &b in &bytes[..take] {
                    dot.insert(b);
                }
                at += take;
            }
            n += 1;
            inner = 0;
        }
        dot.point()
    }

    /// Offset of the glyph under `pt`.
    ///
    /// On the query line the first glyph whose midpoint is at or past `pt.x`
    /// wins. Clicking past the end of a hard line yields the newline's offset,
    /// past the end of a wrapped line the offset that starts the next visual
    /// line. Above the text is 0, below it is the content length. A last line
    /// ending in a newline is the exception: past its end the scan runs off
    /// the content and yields the content length, after the newline.
    pub fn index_of(&self, pt: Point) -> usize {
        let q = self.layout.align_y(pt);
        self.scan_index(0, self.layout.origin, q)
    }

    /// `index_of(end_pt)` resumed from `start`, whose point is `start_pt`.
    pub fn index_walk(&self, start_pt: Point, end_pt: Point, start: usize) -> usize {
        let q = self.layout.align_y(end_pt);
        let s = self.layout.align_y(start_pt);
        if start > self.boxes.len() || q.precedes(s) {
            return self.index_of(end_pt);
        }
        self.scan_index(start, start_pt, q)
    }

    fn scan_index(&self, start: usize, from: Point, q: Point) -> usize {
        let mut dot = self.layout.dot_at(from);
        let Some((mut n, mut inner)) = self.boxes.locate(start) else {
            return self.boxes.len();
        };
        let mut prev = start.checked_sub(1).and_then(|i| self.boxes.byte_at(i));
        let mut at = start;
        while let Some(tb) = self.boxes.get(n) {
            if inner == 0
                && dot.point().y < q.y
                && !tb.has_newline()
                && dot.fits_within(tb.width())
            {
                // whole box stays on a line above the query
                dot.insert_box(tb);
                at += tb.len();
                if let Some(&last) = tb.bytes().last() {
                    prev = Some(last);
                }
            } else {
                for &b in &tb.bytes()[inner..] {
                    let g = dot.place(b);
                    if g.y == q.y && g.x + dot.advance(b) / 2 >= q.x {
                        return at;
                    }
                    if g.y > q.y {
                        return match prev {
                            None => 0,
                            Some(b'\n') => at - 1,
                            Some(_) => at,
                        };
                    }
                    dot.insert(b);
                    prev = Some(b);
                    at += 1;
                }
            }
            n += 1;
            inner = 0;
        }
        at
    }
}
