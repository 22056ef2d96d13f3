//! Glyph metrics seam.
//!
//! Layout never touches fonts directly; it asks a `GlyphMetrics` provider for
//! per-byte advances and the line height. `FixedMetrics` is the monospaced
//! provider used by headless callers and tests.

use std::sync::Arc;

/// A tab advances by this many space widths.
pub const TAB_SPACES: i32 = 4;

/// Width function cached into every box.
pub type Measure = Box<dyn Fn(&[u8]) -> i32 + Send + Sync>;

pub trait GlyphMetrics: Send + Sync {
    /// Horizontal advance of the glyph for `byte`, in pixels.
    fn advance(&self, byte: u8) -> i32;

    /// Distance between successive baselines, in pixels.
    fn line_height(&self) -> i32;

    /// Pair adjustment. Layout does not apply kerning so that box widths and
    /// byte-at-a-time advances always agree.
    fn kerning(&self, _prev: u8, _next: u8) -> i32 {
        0
    }
}

/// Advance of `byte` as laid out: tabs expand to `TAB_SPACES` spaces and a
/// newline occupies no width.
pub fn glyph_advance(metrics: &dyn GlyphMetrics, byte: u8) -> i32 {
    match byte {
        b'\t' => metrics.advance(b' ') * TAB_SPACES,
        b'\n' => 0,
        _ => metrics.advance(byte),
    }
}

pub fn measure(metrics: &dyn GlyphMetrics, bytes: &[u8]) -> i32 {
    bytes.iter().map(|&b| glyph_advance(metrics, b)).sum()
}

/// Build the box width function for a metrics provider.
pub fn measure_with(metrics: Arc<dyn GlyphMetrics>) -> Measure {
    Box::new(move |bytes| measure(metrics.as_ref(), bytes))
}

/// Every glyph has the same advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMetrics {
    advance: i32,
    line_height: i32,
}

impl FixedMetrics {
    pub const fn new(advance: i32, line_height: i32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl GlyphMetrics for FixedMetrics {
    fn advance(&self, _byte: u8) -> i32 {
        self.advance
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }
}
