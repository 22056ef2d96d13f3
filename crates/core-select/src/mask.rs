//! Highlight alpha mask.

use core_geom::{Point, Rect};

const OPAQUE: u8 = 0xff;

/// One alpha byte per pixel, row major, sized to the frame.
#[derive(Clone, PartialEq, Eq)]
pub struct HighlightMask {
    size: Point,
    alpha: Vec<u8>,
}

impl std::fmt::Debug for HighlightMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightMask")
            .field("size", &self.size)
            .field("coverage", &self.coverage())
            .finish()
    }
}

impl HighlightMask {
    pub fn new(size: Point) -> Self {
        let size = Point::new(size.x.max(0), size.y.max(0));
        Self {
            size,
            alpha: vec![0; size.x as usize * size.y as usize],
        }
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(Point::ZERO, self.size)
    }

    pub fn fill(&mut self, r: Rect) {
        self.paint(r, OPAQUE);
    }

    pub fn erase(&mut self, r: Rect) {
        self.paint(r, 0);
    }

    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    fn paint(&mut self, r: Rect, value: u8) {
        let r = r.intersect(self.bounds());
        if r.is_empty() {
            return;
        }
        let w = self.size.x as usize;
        let (x0, x1) = (r.min.x as usize, r.max.x as usize);
        for y in r.min.y..r.max.y {
            let row = y as usize * w;
            self.alpha[row + x0..row + x1].fill(value);
        }
    }

    pub fn is_set(&self, pt: Point) -> bool {
        self.bounds().contains(pt)
            && self.alpha[pt.y as usize * self.size.x as usize + pt.x as usize] != 0
    }

    /// Number of highlighted pixels.
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|&&a| a != 0).count()
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Reallocate for a new frame size. Returns false when the size is
    /// unchanged; otherwise the mask comes back cleared.
    pub fn resize(&mut self, size: Point) -> bool {
        let size = Point::new(size.x.max(0), size.y.max(0));
        if size == self.size {
            return false;
        }
        *self = Self::new(size);
        true
    }
}
