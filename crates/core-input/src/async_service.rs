use crate::gesture::GestureMachine;
use core_events::{
    GESTURE_TASK_STARTS, GESTURE_TASK_STOP_CHANNEL, GESTURE_TASK_STOP_SIGNAL, GestureListener,
    POINTER_EVENTS_TOTAL, PointerEvent,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;
use tokio::sync::mpsc::Receiver;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct GestureShutdown {
    notify: Arc<Notify>,
}

impl GestureShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (GestureShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            GestureShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Running,
    ShutdownSignal,
    ChannelClosed,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Running => "running",
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
        }
    }
}

/// Spawn the sequential gesture consumer. The task feeds every pointer event
/// from `rx` through `machine` and delivers gestures to `listener`; it stops
/// when the pointer channel closes or the shutdown handle is signalled, and
/// hands the listener and the machine back through the join handle.
pub(crate) fn spawn_gesture_task_with<L>(
    rx: Receiver<PointerEvent>,
    listener: L,
    machine: GestureMachine,
) -> (JoinHandle<(L, GestureMachine)>, GestureShutdown)
where
    L: GestureListener + Send + 'static,
{
    let (shutdown, waiter) = ShutdownListener::new_pair();
    let handle = task::spawn(GestureTask::new(rx, listener, machine, waiter).run());
    (handle, shutdown)
}

struct GestureTask<L> {
    rx: Receiver<PointerEvent>,
    listener: L,
    machine: GestureMachine,
    shutdown: ShutdownListener,
    exit_reason: ExitReason,
}

impl<L: GestureListener> GestureTask<L> {
    fn new(
        rx: Receiver<PointerEvent>,
        listener: L,
        machine: GestureMachine,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            rx,
            listener,
            machine,
            shutdown,
            exit_reason: ExitReason::Running,
        }
    }

    async fn run(mut self) -> (L, GestureMachine) {
        info!(target: "input.gesture", "gesture_task_started");
        GESTURE_TASK_STARTS.fetch_add(1, Ordering::Relaxed);
        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    self.exit_reason = ExitReason::ShutdownSignal;
                    break;
                }
                ev = self.rx.recv() => ev,
            };
            let Some(ev) = next else {
                self.exit_reason = ExitReason::ChannelClosed;
                break;
            };
            POINTER_EVENTS_TOTAL.fetch_add(1, Ordering::Relaxed);
            self.machine.feed(&ev, &mut self.listener);
        }

        match self.exit_reason {
            ExitReason::ShutdownSignal => {
                GESTURE_TASK_STOP_SIGNAL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::ChannelClosed => {
                GESTURE_TASK_STOP_CHANNEL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::Running => {}
        }
        debug!(target: "input.gesture", state = ?self.machine.state(), "machine state at exit");
        info!(target: "input.gesture", reason = self.exit_reason.as_str(), "gesture_task_stopped");
        (self.listener, self.machine)
    }
}
