//! Frame coordinator.
//!
//! A [`Frame`] owns the box store, its layout and the tick, and turns
//! gestures and keys into edits. Offsets handed in from outside are clamped
//! to the content; nothing a pointer or keyboard can produce is an error.

pub mod clipboard;
pub mod dirty;
pub mod expand;
pub mod tick;

pub use clipboard::Clipboard;
pub use dirty::DirtyRanges;
pub use expand::expand;
pub use tick::Tick;

use core_events::{GestureEvent, GestureKind, KeyCode, KeyEvent, Modifiers};
use core_geom::{Point, Rect};
use core_text::{
    BoxError, BoxStore, DEFAULT_BOX_CAPACITY, DEFAULT_BOX_SLOTS, FixedMetrics, GlyphMetrics,
    Layout, Mapper, PointCache,
};
use smallvec::SmallVec;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Construction parameters for a [`Frame`].
#[derive(Clone)]
pub struct FrameOptions {
    pub origin: Point,
    pub size: Point,
    pub wrap: i32,
    pub box_slots: usize,
    pub box_capacity: usize,
    pub metrics: Arc<dyn GlyphMetrics>,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            size: Point::new(640, 480),
            wrap: 600,
            box_slots: DEFAULT_BOX_SLOTS,
            box_capacity: DEFAULT_BOX_CAPACITY,
            metrics: Arc::new(FixedMetrics::new(8, 16)),
        }
    }
}

/// Largest frame width or height; matches the config limit.
pub const MAX_FRAME_DIMENSION: i32 = 16_384;

fn clamp_size(size: Point) -> Point {
    let clamped = Point::new(
        size.x.clamp(0, MAX_FRAME_DIMENSION),
        size.y.clamp(0, MAX_FRAME_DIMENSION),
    );
    if clamped != size {
        info!(target: "frame", raw = %size, clamped = %clamped, "frame_size_clamped");
    }
    clamped
}

fn mapper<'a>(boxes: &'a BoxStore, layout: &'a Layout, cache: &'a PointCache) -> Mapper<'a> {
    Mapper::new(boxes, layout).with_cache(cache)
}

#[derive(Debug)]
pub struct Frame {
    boxes: BoxStore,
    layout: Layout,
    cache: PointCache,
    size: Point,
    tick: Tick,
    dirty: DirtyRanges,
    clipboard: Clipboard,
    /// A snarf or insert happened during the current sweep.
    chorded: bool,
    /// The current sweep was replaced by a double-click expansion.
    expanded: bool,
}

impl Frame {
    pub fn new(opts: FrameOptions) -> Self {
        let layout = Layout::new(opts.origin, opts.wrap, opts.metrics);
        let boxes = BoxStore::with_capacity(layout.measure(), opts.box_slots, opts.box_capacity);
        let size = clamp_size(opts.size);
        Self {
            boxes,
            layout,
            cache: PointCache::new(),
            size,
            tick: Tick::new(size),
            dirty: DirtyRanges::new(),
            clipboard: Clipboard::new(),
            chorded: false,
            expanded: false,
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The whole content.
    pub fn bytes(&self) -> Vec<u8> {
        self.boxes.to_vec()
    }

    pub fn read_at(&self, buf: &mut [u8], offset: usize) -> Result<usize, BoxError> {
        self.boxes.read_at(buf, offset)
    }

    pub fn boxes(&self) -> &BoxStore {
        &self.boxes
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn tick(&self) -> &Tick {
        &self.tick
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    pub fn index_of(&self, pt: Point) -> usize {
        mapper(&self.boxes, &self.layout, &self.cache).index_of(pt)
    }

    pub fn point_of(&self, offset: usize) -> Point {
        mapper(&self.boxes, &self.layout, &self.cache).point_of(offset)
    }

    /// Insert `bytes` at `offset` (clamped). Returns the offset used.
    pub fn insert(&mut self, bytes: &[u8], offset: usize) -> Result<usize, BoxError> {
        let at = offset.min(self.boxes.len());
        if bytes.is_empty() {
            return Ok(at);
        }
        self.boxes.insert(bytes, at)?;
        self.cache.invalidate();
        self.dirty.mark(at..self.boxes.len());
        self.tick.shift_insert(at, bytes.len());
        let m = mapper(&self.boxes, &self.layout, &self.cache);
        self.tick.resync(&m);
        trace!(target: "frame", at, size_bytes = bytes.len(), len = self.boxes.len(), "insert");
        Ok(at)
    }

    /// Delete the bytes between `i` and `j`, in either order, clamped.
    pub fn delete(&mut self, i: usize, j: usize) -> Result<Range<usize>, BoxError> {
        let len = self.boxes.len();
        let (i, j) = (i.min(j).min(len), i.max(j).min(len));
        if i == j {
            return Ok(i..j);
        }
        self.boxes.delete_range(i, j)?;
        self.cache.invalidate();
        self.dirty.mark(i..self.boxes.len());
        self.tick.shift_delete(i, j);
        let m = mapper(&self.boxes, &self.layout, &self.cache);
        self.tick.resync(&m);
        trace!(target: "frame", i, j, len = self.boxes.len(), "delete");
        Ok(i..j)
    }

    pub fn open(&mut self, offset: usize) {
        let offset = offset.min(self.boxes.len());
        let m = mapper(&self.boxes, &self.layout, &self.cache);
        self.tick.open(offset, &m);
    }

    pub fn sweep(&mut self, offset: usize) {
        let offset = offset.min(self.boxes.len());
        let m = mapper(&self.boxes, &self.layout, &self.cache);
        self.tick.sweep(offset, &m);
    }

    pub fn commit(&mut self) {
        self.tick.commit();
    }

    pub fn cancel(&mut self) {
        let m = mapper(&self.boxes, &self.layout, &self.cache);
        self.tick.cancel(&m);
    }

    pub fn rects(&self) -> SmallVec<[Rect; 3]> {
        self.tick.rects()
    }

    pub fn selected(&self) -> bool {
        self.tick.selected()
    }

    pub fn addr(&self) -> (usize, usize) {
        self.tick.addr()
    }

    /// Bytes of the committed selection.
    pub fn selected_bytes(&self) -> Result<Vec<u8>, BoxError> {
        let (p0, p1) = self.tick.addr();
        let mut buf = vec![0; p1 - p0];
        self.boxes.read_at(&mut buf, p0)?;
        Ok(buf)
    }

    /// Replace the committed selection with `bytes`, leaving a caret after
    /// them.
    pub fn replace_selection(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        let (p0, _) = self.tick.addr();
        if self.tick.selected() {
            self.delete_selection()?;
        }
        let at = self.insert(bytes, p0)?;
        self.open(at + bytes.len());
        Ok(())
    }

    /// Delete the committed selection, or the byte before a caret.
    pub fn delete_selection(&mut self) -> Result<(), BoxError> {
        let (p0, p1) = self.tick.addr();
        if p0 == p1 {
            if p0 == 0 {
                return Ok(());
            }
            self.delete(p0 - 1, p0)?;
            self.open(p0 - 1);
            return Ok(());
        }
        self.delete(p0, p1)?;
        self.open(p0);
        Ok(())
    }

    /// Select the next occurrence of the selected text, searching forward
    /// from the end of the selection and wrapping to the start.
    pub fn find_next(&mut self) -> Result<Option<usize>, BoxError> {
        let needle = self.selected_bytes()?;
        if needle.is_empty() {
            return Ok(None);
        }
        let text = self.boxes.to_vec();
        let (_, p1) = self.tick.addr();
        let find = |from: usize, to: usize| {
            text.get(from..to)?
                .windows(needle.len())
                .position(|w| w == needle.as_slice())
                .map(|k| from + k)
        };
        let Some(at) = find(p1, text.len()).or_else(|| find(0, p1)) else {
            return Ok(None);
        };
        self.open(at);
        self.sweep(at + needle.len());
        self.commit();
        debug!(target: "frame", at, size_bytes = needle.len(), "find_next");
        Ok(Some(at))
    }

    /// Double-click expansion around `offset`.
    pub fn expand_at(&self, offset: usize) -> Option<Range<usize>> {
        expand(&self.boxes.to_vec(), offset)
    }

    fn select_range(&mut self, r: Range<usize>) {
        self.open(r.start);
        self.sweep(r.end);
        self.commit();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), BoxError> {
        let extend = key.modifiers.contains(Modifiers::SHIFT);
        let (p0, p1) = self.tick.addr();
        let (_, point) = self.tick.pen().addr();
        match key.code {
            KeyCode::Left if extend => {
                self.sweep(point.saturating_sub(1));
                self.commit();
            }
            KeyCode::Left if self.tick.selected() => self.open(p0),
            KeyCode::Left => self.open(p0.saturating_sub(1)),
            KeyCode::Right if extend => {
                self.sweep(point + 1);
                self.commit();
            }
            KeyCode::Right if self.tick.selected() => self.open(p1),
            KeyCode::Right => self.open(p1 + 1),
            KeyCode::Up | KeyCode::Down => {
                let h = self.layout.line_height();
                let (from, dy) = if key.code == KeyCode::Up {
                    (p0, -h)
                } else {
                    (p1, h)
                };
                let pt = self.point_of(from);
                let to = self.index_of(Point::new(pt.x, pt.y + dy));
                self.open(to);
            }
            KeyCode::Backspace => self.delete_selection()?,
            KeyCode::Enter => self.replace_selection(b"\n")?,
            KeyCode::Tab => self.replace_selection(b"\t")?,
            KeyCode::Escape => self.cancel(),
            KeyCode::Rune => {
                let Some(c) = key.rune else {
                    return Ok(());
                };
                if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META) {
                    debug!(target: "frame", key = %key, "chorded key ignored");
                    return Ok(());
                }
                let mut buf = [0u8; 4];
                self.replace_selection(c.encode_utf8(&mut buf).as_bytes())?;
            }
        }
        trace!(target: "frame", key = %key, p0 = self.tick.addr().0, p1 = self.tick.addr().1, "key");
        Ok(())
    }

    pub fn handle_gesture(&mut self, ev: GestureEvent) -> Result<(), BoxError> {
        debug!(target: "frame", kind = ?ev.kind, x = ev.point.x, y = ev.point.y, double = ev.double, "gesture");
        match ev.kind {
            GestureKind::SelectStart => {
                self.chorded = false;
                self.expanded = false;
                let at = self.index_of(ev.point);
                match ev.double.then(|| self.expand_at(at)).flatten() {
                    Some(r) => {
                        self.select_range(r);
                        self.expanded = true;
                    }
                    None => self.open(at),
                }
            }
            GestureKind::Sweep => {
                if !self.expanded {
                    let at = self.index_of(ev.point);
                    self.sweep(at);
                }
            }
            GestureKind::Snarf => {
                self.chorded = true;
                self.commit();
                if self.tick.selected() {
                    let bytes = self.selected_bytes()?;
                    self.clipboard.set(&bytes);
                    self.delete_selection()?;
                }
            }
            GestureKind::Insert => {
                self.chorded = true;
                self.commit();
                let bytes = self.clipboard.bytes().to_vec();
                let (p0, _) = self.tick.addr();
                if self.tick.selected() {
                    self.delete_selection()?;
                }
                if !bytes.is_empty() {
                    let at = self.insert(&bytes, p0)?;
                    self.select_range(at..at + bytes.len());
                }
            }
            GestureKind::Commit => {
                if !self.chorded && !self.expanded {
                    let at = self.index_of(ev.point);
                    self.sweep(at);
                }
                self.commit();
                self.chorded = false;
                self.expanded = false;
            }
        }
        Ok(())
    }

    /// Follow a window resize; everything needs redrawing. Each dimension is
    /// clamped to `0..=MAX_FRAME_DIMENSION`.
    pub fn resize(&mut self, size: Point) {
        let size = clamp_size(size);
        self.size = size;
        self.cache.invalidate();
        let m = mapper(&self.boxes, &self.layout, &self.cache);
        self.tick.resize(size, &m);
        self.dirty.mark_all(self.boxes.len());
        debug!(target: "frame", width = size.x, height = size.y, "resize");
    }

    /// Byte ranges whose layout changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<Range<usize>> {
        self.dirty.take(self.boxes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{Button, PointerEvent};
    use pretty_assertions::assert_eq;

    fn frame(text: &[u8]) -> Frame {
        let mut f = Frame::new(FrameOptions {
            origin: Point::ZERO,
            size: Point::new(40, 40),
            wrap: 40,
            box_slots: 8,
            box_capacity: 4,
            metrics: Arc::new(FixedMetrics::new(4, 10)),
        });
        f.insert(text, 0).unwrap();
        f.take_dirty();
        f
    }

    fn gesture(kind: GestureKind, pt: Point) -> GestureEvent {
        GestureEvent::from_pointer(kind, &PointerEvent::press(Button::Primary, pt))
    }

    #[test]
    fn insert_and_delete_clamp() {
        let mut f = frame(b"super");
        assert_eq!(f.insert(b"mink", 99).unwrap(), 5);
        assert_eq!(f.bytes(), b"supermink");
        assert_eq!(f.delete(99, 5).unwrap(), 5..9);
        assert_eq!(f.bytes(), b"super");
        assert_eq!(f.delete(3, 3).unwrap(), 3..3);
    }

    #[test]
    fn dirty_ranges_follow_edits() {
        let mut f = frame(b"0123456789");
        f.insert(b"ab", 4).unwrap();
        assert_eq!(f.take_dirty(), vec![4..12]);
        f.delete(10, 12).unwrap();
        assert_eq!(f.take_dirty(), vec![10..10]);
        assert!(f.take_dirty().is_empty());
    }

    #[test]
    fn tick_moves_with_edits_before_it() {
        let mut f = frame(b"0123456789");
        f.open(4);
        f.sweep(6);
        f.commit();
        f.insert(b"xx", 0).unwrap();
        assert_eq!(f.addr(), (6, 8));
        assert_eq!(f.selected_bytes().unwrap(), b"45");
        assert_eq!(f.rects().as_slice(), &[Rect::new(24, 0, 32, 10)]);
    }

    #[test]
    fn replace_and_backspace() {
        let mut f = frame(b"hello world");
        f.open(6);
        f.sweep(11);
        f.commit();
        f.replace_selection(b"mink").unwrap();
        assert_eq!(f.bytes(), b"hello mink");
        assert_eq!(f.addr(), (10, 10));
        f.delete_selection().unwrap();
        assert_eq!(f.bytes(), b"hello min");
        assert_eq!(f.addr(), (9, 9));
        f.open(0);
        f.delete_selection().unwrap();
        assert_eq!(f.bytes(), b"hello min");
    }

    #[test]
    fn find_next_wraps() {
        let mut f = frame(b"ab cd ab ef");
        f.open(6);
        f.sweep(8);
        f.commit();
        assert_eq!(f.find_next().unwrap(), Some(0));
        assert_eq!(f.addr(), (0, 2));
        assert_eq!(f.find_next().unwrap(), Some(6));
        f.open(3);
        assert_eq!(f.find_next().unwrap(), None);
    }

    #[test]
    fn keys_edit_and_move() {
        let mut f = frame(b"");
        for c in "héllo".chars() {
            f.handle_key(KeyEvent::rune(c)).unwrap();
        }
        assert_eq!(f.bytes(), "héllo".as_bytes());
        assert_eq!(f.addr(), (6, 6));
        f.handle_key(KeyEvent::new(KeyCode::Left)).unwrap();
        f.handle_key(KeyEvent::new(KeyCode::Left).with_modifiers(Modifiers::SHIFT)).unwrap();
        assert_eq!(f.addr(), (4, 5));
        f.handle_key(KeyEvent::new(KeyCode::Enter)).unwrap();
        assert_eq!(f.bytes(), "hél\no".as_bytes());
        f.handle_key(KeyEvent::rune('x').with_modifiers(Modifiers::CTRL)).unwrap();
        assert_eq!(f.len(), 6);
        f.handle_key(KeyEvent::new(KeyCode::Right)).unwrap();
        f.handle_key(KeyEvent::new(KeyCode::Right)).unwrap();
        assert_eq!(f.addr(), (6, 6));
        f.handle_key(KeyEvent::new(KeyCode::Up)).unwrap();
        assert_eq!(f.addr(), (1, 1));
        f.handle_key(KeyEvent::new(KeyCode::Backspace)).unwrap();
        assert_eq!(f.bytes(), "él\no".as_bytes());
    }

    #[test]
    fn click_sweep_commit() {
        let mut f = frame(b"supermink");
        f.handle_gesture(gesture(GestureKind::SelectStart, Point::new(0, 0))).unwrap();
        f.handle_gesture(gesture(GestureKind::Sweep, Point::new(20, 0))).unwrap();
        f.handle_gesture(gesture(GestureKind::Commit, Point::new(36, 0))).unwrap();
        assert_eq!(f.addr(), (0, 9));
        let r = f.rects();
        assert_eq!(r.len(), 1);
        assert_eq!((r[0].dx(), r[0].dy()), (36, 10));
    }

    #[test]
    fn double_click_expands_word() {
        let mut f = frame(b"the mink ran");
        let mut g = gesture(GestureKind::SelectStart, Point::new(22, 0));
        g.double = true;
        f.handle_gesture(g).unwrap();
        f.handle_gesture(gesture(GestureKind::Commit, Point::new(22, 0))).unwrap();
        assert_eq!(f.addr(), (4, 8));
    }

    #[test]
    fn snarf_then_insert_pastes_and_selects() {
        let mut f = frame(b"supermink");
        f.handle_gesture(gesture(GestureKind::SelectStart, Point::new(0, 0))).unwrap();
        f.handle_gesture(gesture(GestureKind::Sweep, Point::new(20, 0))).unwrap();
        f.handle_gesture(gesture(GestureKind::Snarf, Point::new(20, 0))).unwrap();
        assert_eq!(f.clipboard().bytes(), b"super");
        assert_eq!(f.bytes(), b"mink");
        assert_eq!(f.addr(), (0, 0));
        f.handle_gesture(gesture(GestureKind::Insert, Point::new(20, 0))).unwrap();
        assert_eq!(f.bytes(), b"supermink");
        assert_eq!(f.addr(), (0, 5));
        f.handle_gesture(gesture(GestureKind::Commit, Point::new(36, 0))).unwrap();
        assert_eq!(f.addr(), (0, 5));
    }

    #[test]
    fn resize_marks_everything() {
        let mut f = frame(b"0123456789");
        f.resize(Point::new(80, 80));
        assert_eq!(f.size(), Point::new(80, 80));
        assert_eq!(f.take_dirty(), vec![0..10]);
        assert_eq!(f.tick().pen().mask().size(), Point::new(80, 80));
    }

    #[test]
    fn resize_clamps_to_max_dimension() {
        let mut f = frame(b"0123456789");
        f.resize(Point::new(40_000, 20));
        let want = Point::new(MAX_FRAME_DIMENSION, 20);
        assert_eq!(f.size(), want);
        assert_eq!(f.tick().pen().mask().size(), want);
        assert_eq!(f.tick().pen().mask().alpha().len(), 16_384 * 20);
        f.resize(Point::new(-5, 30));
        assert_eq!(f.size(), Point::new(0, 30));
        assert!(f.tick().pen().mask().alpha().is_empty());
    }
}
