//! Property tests for the gesture transition table.

use core_events::{Button, Direction, GestureKind, PointerEvent};
use core_geom::Point;
use core_input::{GestureMachine, GestureState, transition};
use proptest::prelude::*;

fn pointer() -> impl Strategy<Value = PointerEvent> {
    let button = prop_oneof![
        Just(Button::None),
        Just(Button::Primary),
        Just(Button::Middle),
        Just(Button::Secondary),
    ];
    let direction = prop_oneof![Just(Direction::None), Just(Direction::Press), Just(Direction::Release)];
    (button, direction, -20i32..200, -20i32..200)
        .prop_map(|(b, d, x, y)| PointerEvent::new(b, d, Point::new(x, y)))
}

fn state() -> impl Strategy<Value = GestureState> {
    prop_oneof![
        Just(GestureState::Idle),
        Just(GestureState::Selecting),
        Just(GestureState::Sweeping),
        Just(GestureState::Snarfing),
        Just(GestureState::Inserting),
    ]
}

proptest! {
    #[test]
    fn primary_release_always_returns_to_idle(s in state(), x in 0i32..100, y in 0i32..100) {
        let (next, _) = transition(s, &PointerEvent::release(Button::Primary, Point::new(x, y)));
        prop_assert_eq!(next, GestureState::Idle);
    }

    #[test]
    fn commit_only_on_primary_release(events in prop::collection::vec(pointer(), 0..60)) {
        let mut m = GestureMachine::default();
        for ev in &events {
            let before = m.state();
            let out = m.process(ev);
            if ev.is_release(Button::Primary) {
                prop_assert_eq!(m.state(), GestureState::Idle);
                let committed = out.map(|g| g.kind) == Some(GestureKind::Commit);
                prop_assert_eq!(committed, before != GestureState::Idle);
            } else {
                prop_assert!(out.map(|g| g.kind) != Some(GestureKind::Commit));
            }
            if let Some(g) = out {
                prop_assert_eq!(g.point, ev.point);
                prop_assert_eq!(g.button, ev.button);
            }
        }
    }
}
