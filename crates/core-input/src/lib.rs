//! Pointer gesture recognition.
//!
//! [`gesture::transition`] is the pure state machine; [`GestureMachine`]
//! drives it with double-click detection; [`spawn_gesture_task`] runs a
//! machine on a tokio task fed by a pointer channel.

mod async_service;
pub mod click;
pub mod gesture;

pub use async_service::GestureShutdown;
pub use click::{ClickHistory, DEFAULT_DOUBLE_CLICK};
pub use gesture::{GestureMachine, GestureState, transition};

use core_events::{GestureListener, PointerEvent};
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

/// Spawn a gesture task with the default double-click delay.
///
/// Returns the `JoinHandle` (yielding the listener and machine once the task
/// stops)
/// alongside a shutdown handle that can be used to request termination.
pub fn spawn_gesture_task<L>(
    rx: Receiver<PointerEvent>,
    listener: L,
) -> (JoinHandle<(L, GestureMachine)>, GestureShutdown)
where
    L: GestureListener + Send + 'static,
{
    async_service::spawn_gesture_task_with(rx, listener, GestureMachine::default())
}

/// Spawn a gesture task driving a preconfigured machine.
pub fn spawn_gesture_task_with<L>(
    rx: Receiver<PointerEvent>,
    listener: L,
    machine: GestureMachine,
) -> (JoinHandle<(L, GestureMachine)>, GestureShutdown)
where
    L: GestureListener + Send + 'static,
{
    async_service::spawn_gesture_task_with(rx, listener, machine)
}
