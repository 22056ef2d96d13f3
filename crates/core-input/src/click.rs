//! Press history for double-click detection.

use core_events::Button;
use core_geom::Point;
use std::time::{Duration, Instant};

pub const DEFAULT_DOUBLE_CLICK: Duration = Duration::from_millis(333);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Click {
    button: Button,
    at: Point,
    time: Instant,
}

/// The two most recent presses. A press is a double click when it repeats
/// the previous press's button within the delay. The press that completes a
/// double click cannot start another one, so a triple click reports a single
/// double.
#[derive(Debug, Clone)]
pub struct ClickHistory {
    delay: Duration,
    last: [Option<Click>; 2],
    consumed: Option<Instant>,
}

impl Default for ClickHistory {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK)
    }
}

impl ClickHistory {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: [None, None],
            consumed: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a press and report whether it completes a double click.
    pub fn record(&mut self, button: Button, at: Point, time: Instant) -> bool {
        self.last = [Some(Click { button, at, time }), self.last[0]];
        let [Some(a), Some(b)] = self.last else {
            return false;
        };
        if a.button == Button::None || a.button != b.button {
            return false;
        }
        if self.consumed == Some(b.time) {
            return false;
        }
        if a.time.saturating_duration_since(b.time) <= self.delay {
            self.consumed = Some(a.time);
            return true;
        }
        false
    }

    /// Where the most recent press happened.
    pub fn last_point(&self) -> Option<Point> {
        self.last[0].map(|c| c.at)
    }

    pub fn clear(&mut self) {
        self.last = [None, None];
        self.consumed = None;
    }
}
