//! Pointer, key and gesture event types plus the delivery seam between the
//! gesture machine and whoever consumes gestures.

use core_geom::Point;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Pointer events flow into the gesture task over a bounded channel; producers await on a full
// channel so no motion is lost. Gesture delivery out of the task is fire-and-forget: `try_send`
// never blocks the machine, and a full or closed consumer channel drops the gesture and bumps
// `GESTURES_DROPPED`.
// -------------------------------------------------------------------------------------------------
pub const POINTER_CHANNEL_CAP: usize = 1024;
pub const GESTURE_CHANNEL_CAP: usize = 256;

pub static GESTURES_DELIVERED: AtomicU64 = AtomicU64::new(0);
pub static GESTURES_DROPPED: AtomicU64 = AtomicU64::new(0);
pub static POINTER_EVENTS_TOTAL: AtomicU64 = AtomicU64::new(0);
// Gesture task lifecycle
pub static GESTURE_TASK_STARTS: AtomicU64 = AtomicU64::new(0);
pub static GESTURE_TASK_STOP_SIGNAL: AtomicU64 = AtomicU64::new(0);
pub static GESTURE_TASK_STOP_CHANNEL: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    None,
    Primary,
    Middle,
    Secondary,
}

/// What the button did. `None` is a plain motion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    None,
    Press,
    Release,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
        const ALT   = 0b0000_0100;
        const META  = 0b0000_1000;
    }
}

/// Raw pointer report from the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub button: Button,
    pub direction: Direction,
    pub point: Point,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl PointerEvent {
    pub fn new(button: Button, direction: Direction, point: Point) -> Self {
        Self {
            button,
            direction,
            point,
            modifiers: Modifiers::empty(),
            timestamp: Instant::now(),
        }
    }

    pub fn press(button: Button, point: Point) -> Self {
        Self::new(button, Direction::Press, point)
    }

    pub fn release(button: Button, point: Point) -> Self {
        Self::new(button, Direction::Release, point)
    }

    pub fn motion(point: Point) -> Self {
        Self::new(Button::None, Direction::None, point)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the timestamp (scripted replay and tests).
    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_press(&self, button: Button) -> bool {
        self.direction == Direction::Press && self.button == button
    }

    pub fn is_release(&self, button: Button) -> bool {
        self.direction == Direction::Release && self.button == button
    }

    pub fn is_motion(&self) -> bool {
        self.direction == Direction::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Printable input; the character is in `KeyEvent::rune`.
    Rune,
    Enter,
    Backspace,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub rune: Option<char>,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            rune: None,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn rune(c: char) -> Self {
        Self {
            code: KeyCode::Rune,
            rune: Some(c),
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rune {
            Some(c) => write!(f, "{c:?}{:?}", self.modifiers),
            None => write!(f, "{:?}{:?}", self.code, self.modifiers),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    SelectStart,
    Sweep,
    Snarf,
    Insert,
    Commit,
}

/// High level editing gesture, carrying the pointer report that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub point: Point,
    pub button: Button,
    pub modifiers: Modifiers,
    /// Set on a select-start that completes a double click.
    pub double: bool,
}

impl GestureEvent {
    pub fn from_pointer(kind: GestureKind, ev: &PointerEvent) -> Self {
        Self {
            kind,
            point: ev.point,
            button: ev.button,
            modifiers: ev.modifiers,
            double: false,
        }
    }
}

/// Everything the frame consumes, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Resize(Point),
}

/// Receives gestures from the machine. Delivery must not block.
pub trait GestureListener {
    fn deliver(&mut self, ev: GestureEvent);
}

impl GestureListener for Vec<GestureEvent> {
    fn deliver(&mut self, ev: GestureEvent) {
        self.push(ev);
    }
}

impl GestureListener for Sender<GestureEvent> {
    fn deliver(&mut self, ev: GestureEvent) {
        match self.try_send(ev) {
            Ok(()) => {
                GESTURES_DELIVERED.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(ev)) => {
                GESTURES_DROPPED.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(target: "input.gesture", kind = ?ev.kind, "gesture channel full; dropped");
            }
            Err(TrySendError::Closed(ev)) => {
                GESTURES_DROPPED.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(target: "input.gesture", kind = ?ev.kind, "gesture consumer gone; dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn pointer_predicates() {
        let p = PointerEvent::press(Button::Primary, Point::new(3, 4));
        assert!(p.is_press(Button::Primary));
        assert!(!p.is_release(Button::Primary));
        assert!(PointerEvent::motion(Point::ZERO).is_motion());
        let r = PointerEvent::release(Button::Middle, Point::ZERO).with_modifiers(Modifiers::SHIFT);
        assert!(r.is_release(Button::Middle));
        assert_eq!(r.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn key_event_display() {
        let k = KeyEvent::rune('x').with_modifiers(Modifiers::CTRL);
        assert!(format!("{k}").contains("'x'"));
        let e = KeyEvent::new(KeyCode::Enter);
        assert!(format!("{e}").contains("Enter"));
    }

    #[test]
    fn gesture_copies_pointer_fields() {
        let p = PointerEvent::press(Button::Secondary, Point::new(7, 9)).with_modifiers(Modifiers::ALT);
        let g = GestureEvent::from_pointer(GestureKind::Insert, &p);
        assert_eq!(g.point, Point::new(7, 9));
        assert_eq!(g.button, Button::Secondary);
        assert_eq!(g.modifiers, Modifiers::ALT);
        assert!(!g.double);
    }

    #[tokio::test]
    async fn sender_listener_drops_when_full() {
        let (mut tx, mut rx) = mpsc::channel::<GestureEvent>(1);
        let p = PointerEvent::motion(Point::ZERO);
        let dropped_before = GESTURES_DROPPED.load(Ordering::Relaxed);
        tx.deliver(GestureEvent::from_pointer(GestureKind::Sweep, &p));
        tx.deliver(GestureEvent::from_pointer(GestureKind::Commit, &p));
        assert!(GESTURES_DROPPED.load(Ordering::Relaxed) > dropped_before);
        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, GestureKind::Sweep);
        drop(rx);
        tx.deliver(GestureEvent::from_pointer(GestureKind::Commit, &p));
    }
}
