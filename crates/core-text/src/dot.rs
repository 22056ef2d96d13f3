//! Layout cursor.
//!
//! A `Dot` walks content left to right, turning bytes into pixel
//! displacement. Lines wrap *before* a glyph that would cross the wrap width,
//! so the horizontal offset from the line origin stays within the wrap width
//! except for a lone glyph wider than the whole line.

use crate::boxes::TextBox;
use crate::metrics::{GlyphMetrics, glyph_advance};
use core_geom::Point;

pub struct Dot<'m> {
    pt: Point,
    origin: Point,
    max_width: i32,
    metrics: &'m dyn GlyphMetrics,
}

impl<'m> Dot<'m> {
    /// Start at the origin of the first line.
    pub fn new(origin: Point, max_width: i32, metrics: &'m dyn GlyphMetrics) -> Self {
        Self::resume(origin, origin, max_width, metrics)
    }

    /// Continue from `at`, a point previously produced by a dot with the same
    /// `origin` and wrap width.
    pub fn resume(origin: Point, at: Point, max_width: i32, metrics: &'m dyn GlyphMetrics) -> Self {
        Self {
            pt: at,
            origin: Point::new(origin.x, at.y),
            max_width,
            metrics,
        }
    }

    pub fn point(&self) -> Point {
        self.pt
    }

    /// Displacement from the start of the current line.
    pub fn width(&self) -> i32 {
        self.pt.x - self.origin.x
    }

    pub fn height(&self) -> i32 {
        self.metrics.line_height()
    }

    pub fn advance(&self, byte: u8) -> i32 {
        glyph_advance(self.metrics, byte)
    }

    pub fn visible(byte: u8) -> bool {
        !matches!(byte, b'\t' | b'\n')
    }

    /// A glyph fits when the line is empty or the advance keeps the line
    /// within the wrap width.
    pub fn fits(&self, adv: i32) -> bool {
        self.width() == 0 || self.fits_within(adv)
    }

    pub fn fits_within(&self, adv: i32) -> bool {
        self.width() + adv <= self.max_width
    }

    pub fn newline(&mut self) -> Point {
        self.origin.y += self.height();
        self.pt = self.origin;
        self.pt
    }

    /// Wrap if `byte` would not fit and return where its glyph is drawn. The
    /// advance is not applied.
    pub fn place(&mut self, byte: u8) -> Point {
        if byte != b'\n' && !self.fits(self.advance(byte)) {
            self.newline();
        }
        self.pt
    }

    /// Lay out one byte and return the point after it. A glyph that does not
    /// fit wraps first and its advance is then added on the new line, so a
    /// wrapped glyph always occupies its full width.
    pub fn insert(&mut self, byte: u8) -> Point {
        if byte == b'\n' {
            return self.newline();
        }
        self.place(byte);
        self.pt.x += self.advance(byte);
        self.pt
    }

    /// Lay out a whole box using its cached width. A box that does not fit on
    /// the current line moves to the next one as a unit; boxes holding a
    /// newline, or wider than a whole line, are laid out byte by byte.
    pub fn insert_box(&mut self, tb: &TextBox) -> Point {
        if tb.has_newline() || tb.width() > self.max_width {
            for &b in tb.bytes() {
                self.insert(b);
            }
            return self.pt;
        }
        if !self.fits_within(tb.width()) {
            self.newline();
        }
        self.pt.x += tb.width();
        self.pt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FixedMetrics;

    const M: FixedMetrics = FixedMetrics::new(4, 10);

    #[test]
    fn wraps_before_glyph() {
        let mut d = Dot::new(Point::ZERO, 12, &M);
        assert_eq!(d.insert(b'a'), Point::new(4, 0));
        assert_eq!(d.insert(b'b'), Point::new(8, 0));
        assert_eq!(d.insert(b'c'), Point::new(12, 0));
        // the fourth glyph starts the next line and is advanced there
        assert_eq!(d.place(b'd'), Point::new(0, 10));
        assert_eq!(d.insert(b'd'), Point::new(4, 10));
    }

    #[test]
    fn newline_and_tab() {
        let mut d = Dot::new(Point::new(5, 7), 100, &M);
        d.insert(b'x');
        assert_eq!(d.insert(b'\n'), Point::new(5, 17));
        assert_eq!(d.insert(b'\t'), Point::new(21, 17));
        assert!(!Dot::visible(b'\t'));
        assert!(!Dot::visible(b'\n'));
        assert!(Dot::visible(b'a'));
    }

    #[test]
    fn oversized_glyph_takes_its_own_line() {
        let mut d = Dot::new(Point::ZERO, 10, &M);
        assert_eq!(d.insert(b'\t'), Point::new(16, 0));
        assert_eq!(d.insert(b'a'), Point::new(4, 10));
    }

    #[test]
    fn resume_keeps_line_origin() {
        let mut d = Dot::resume(Point::new(2, 0), Point::new(10, 20), 12, &M);
        assert_eq!(d.width(), 8);
        d.insert(b'a');
        assert_eq!(d.insert(b'b'), Point::new(6, 30));
    }
}
