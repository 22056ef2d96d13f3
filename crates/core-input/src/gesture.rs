//! Pointer chord state machine.
//!
//! Primary press starts a selection; dragging sweeps it; while the primary
//! button is held, middle presses snarf (cut) and secondary presses insert
//! (paste). Releasing the primary button commits and returns to `Idle`.

use crate::click::ClickHistory;
use core_events::{Button, GestureEvent, GestureKind, GestureListener, PointerEvent};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Selecting,
    Sweeping,
    Snarfing,
    Inserting,
}

/// One step of the machine. Triggers a state does not list leave it
/// unchanged and emit nothing.
pub fn transition(state: GestureState, ev: &PointerEvent) -> (GestureState, Option<GestureKind>) {
    use GestureKind as K;
    use GestureState as S;

    let primary_release = ev.is_release(Button::Primary);
    match state {
        S::Idle if ev.is_press(Button::Primary) => (S::Selecting, Some(K::SelectStart)),
        S::Idle => (S::Idle, None),

        S::Selecting if ev.is_press(Button::Primary) => (S::Selecting, Some(K::SelectStart)),
        S::Selecting if primary_release => (S::Idle, Some(K::Commit)),
        S::Selecting => (S::Sweeping, None),

        S::Sweeping if ev.is_motion() => (S::Sweeping, Some(K::Sweep)),
        S::Sweeping if primary_release => (S::Idle, Some(K::Commit)),
        S::Sweeping if ev.is_press(Button::Middle) => (S::Snarfing, None),
        S::Sweeping if ev.is_press(Button::Secondary) => (S::Inserting, None),
        S::Sweeping => (S::Sweeping, None),

        S::Snarfing if ev.is_press(Button::Middle) => (S::Snarfing, Some(K::Snarf)),
        S::Snarfing if ev.is_press(Button::Secondary) => (S::Inserting, None),
        S::Snarfing if primary_release => (S::Idle, Some(K::Commit)),
        S::Snarfing => (S::Snarfing, None),

        S::Inserting if ev.is_press(Button::Middle) => (S::Snarfing, None),
        S::Inserting if ev.is_press(Button::Secondary) => (S::Inserting, Some(K::Insert)),
        S::Inserting if primary_release => (S::Idle, Some(K::Commit)),
        S::Inserting => (S::Inserting, None),
    }
}

/// Sequential driver around [`transition`] that stamps gestures with the
/// originating pointer report and double-click state.
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
    clicks: ClickHistory,
}

impl GestureMachine {
    pub fn new(double_click: Duration) -> Self {
        Self {
            state: GestureState::Idle,
            clicks: ClickHistory::new(double_click),
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn process(&mut self, ev: &PointerEvent) -> Option<GestureEvent> {
        let double = ev.direction == core_events::Direction::Press
            && self.clicks.record(ev.button, ev.point, ev.timestamp);
        let (next, kind) = transition(self.state, ev);
        if next != self.state {
            trace!(target: "input.gesture", from = ?self.state, to = ?next, "transition");
        }
        self.state = next;
        let kind = kind?;
        let mut out = GestureEvent::from_pointer(kind, ev);
        out.double = double && kind == GestureKind::SelectStart;
        Some(out)
    }

    /// Process `ev` and hand any resulting gesture to `listener`.
    pub fn feed<L: GestureListener + ?Sized>(&mut self, ev: &PointerEvent, listener: &mut L) {
        if let Some(g) = self.process(ev) {
            listener.deliver(g);
        }
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.clicks.clear();
    }
}
