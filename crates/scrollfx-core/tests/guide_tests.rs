// Host-side tests for the guided interaction state machine.

use scrollfx_core::guide::{GuideEvent, GuideState};

#[test]
fn starts_with_only_the_entry_revealed() {
    let g = GuideState::new(3);
    assert_eq!(g.step_index(), -1);
    assert!(g.is_revealed(-1));
    assert!(!g.is_revealed(0));
    assert!(!g.is_complete());
}

#[test]
fn correct_order_hovers_advance_one_each() {
    for total in 1..6 {
        let mut g = GuideState::new(total);
        for n in 0..total as i32 {
            let from = g.step_index();
            let ev = g.hover(from);
            assert_eq!(g.step_index(), from + 1);
            if n + 1 == total as i32 {
                // The walk starts at -1, so the last step lands on total - 1
                // and is not yet the finale.
                assert_eq!(ev, GuideEvent::Advanced { from, to: from + 1 });
            }
        }
        assert_eq!(g.step_index(), total as i32 - 1);
    }
}

#[test]
fn full_walk_ends_in_finale() {
    let mut g = GuideState::new(3);
    assert_eq!(g.hover(-1), GuideEvent::Advanced { from: -1, to: 0 });
    assert_eq!(g.hover(0), GuideEvent::Advanced { from: 0, to: 1 });
    assert_eq!(g.hover(1), GuideEvent::Advanced { from: 1, to: 2 });
    assert_eq!(g.hover(2), GuideEvent::FinaleStarted { from: 2 });
    assert!(g.is_complete());
    assert!(g.finale_fired());
    assert_eq!(g.hover(2), GuideEvent::AlreadyComplete);
    assert_eq!(g.step_index(), 3);
}

#[test]
fn out_of_order_hovers_are_no_ops() {
    let mut g = GuideState::new(4);
    g.hover(-1);
    for wrong in [-1, 1, 2, 3, 7, -5] {
        assert_eq!(g.hover(wrong), GuideEvent::Ignored);
        assert_eq!(g.step_index(), 0);
    }
    assert_eq!(g.hover(0), GuideEvent::Advanced { from: 0, to: 1 });
}

#[test]
fn step_index_never_decreases() {
    let mut g = GuideState::new(5);
    let seq = [-1, 3, 0, 0, -1, 1, 4, 2, 2, 1, 3, 4, 4, 0];
    let mut last = g.step_index();
    for k in seq {
        g.hover(k);
        assert!(g.step_index() >= last);
        last = g.step_index();
    }
    assert!(g.is_complete());
}

#[test]
fn finale_trigger_is_idempotent() {
    let mut g = GuideState::new(2);
    assert!(g.trigger_finale());
    let once = g.clone();
    assert!(!g.trigger_finale());
    assert_eq!(g, once);
}

#[test]
fn only_explicit_reset_rewinds() {
    let mut g = GuideState::new(2);
    g.hover(-1);
    g.hover(0);
    g.hover(1);
    assert!(g.is_complete());
    g.reset();
    assert_eq!(g.step_index(), -1);
    assert!(!g.finale_fired());
    assert_eq!(g.hover(-1), GuideEvent::Advanced { from: -1, to: 0 });
}
