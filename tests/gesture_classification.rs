//! End-to-end gesture classification against default timing settings.

mod common;

use std::time::Instant;

use common::{default_engine, expect_single_gesture, gestures, ms, tap};
use keyecho::gesture::{EngineEvent, GestureEngine, GestureKind};
use keyecho::input::PhysicalInput;
use keyecho::settings::{GestureProfile, GestureSettings, WaitWindow};

#[test]
fn test_single_tap_resolves_after_wait_window() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    assert!(tap(&mut engine, &key, t0, 20).is_empty());

    // Nothing fires before the 350ms window closes.
    assert!(engine.advance(t0 + ms(300)).is_empty());
    let g = expect_single_gesture(engine.advance(t0 + ms(20) + ms(350)), GestureKind::Single);
    assert_eq!(g.input, key);
    assert!(g.hold.is_none());
}

#[test]
fn test_two_taps_inside_window_resolve_double() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    // Tap at t=0, second tap 100ms later: well inside the 350ms window.
    tap(&mut engine, &key, t0, 20);
    tap(&mut engine, &key, t0 + ms(100), 20);

    // Window restarts at the second release (t=120); resolution at t=470.
    assert!(engine.advance(t0 + ms(460)).is_empty());
    let g = expect_single_gesture(engine.advance(t0 + ms(470)), GestureKind::Double);
    assert_eq!(g.at, t0 + ms(470));
}

#[test]
fn test_two_taps_outside_window_resolve_two_singles() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    tap(&mut engine, &key, t0, 20);
    let first = engine.advance(t0 + ms(20) + ms(350));
    expect_single_gesture(first, GestureKind::Single);

    // Second tap lands after the first already resolved.
    tap(&mut engine, &key, t0 + ms(500), 20);
    expect_single_gesture(
        engine.advance(t0 + ms(520) + ms(350)),
        GestureKind::Single,
    );
}

#[test]
fn test_triple_tap() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    tap(&mut engine, &key, t0, 20);
    tap(&mut engine, &key, t0 + ms(100), 20);
    tap(&mut engine, &key, t0 + ms(200), 20);

    expect_single_gesture(engine.advance(t0 + ms(220) + ms(350)), GestureKind::Triple);
}

#[test]
fn test_long_press_resolves_immediately_on_release() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    // 100ms hold sits inside the [80, 140] long band: no wait window.
    let g = expect_single_gesture(tap(&mut engine, &key, t0, 100), GestureKind::Long);
    assert_eq!(g.hold, Some(ms(100)));
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_long_band_edges_inclusive() {
    let t0 = Instant::now();
    let mut engine = default_engine();

    let low = PhysicalInput::plain("a");
    expect_single_gesture(tap(&mut engine, &low, t0, 80), GestureKind::Long);

    let high = PhysicalInput::plain("b");
    expect_single_gesture(tap(&mut engine, &high, t0, 140), GestureKind::Long);
}

#[test]
fn test_tap_then_long_resolves_double_long() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    tap(&mut engine, &key, t0, 20);
    // Second press held into the long band resolves immediately.
    let g = expect_single_gesture(
        tap(&mut engine, &key, t0 + ms(100), 110),
        GestureKind::DoubleLong,
    );
    assert_eq!(g.hold, Some(ms(110)));
}

#[test]
fn test_quadruple_long() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    for i in 0..3 {
        tap(&mut engine, &key, t0 + ms(i * 100), 20);
    }
    expect_single_gesture(
        tap(&mut engine, &key, t0 + ms(300), 100),
        GestureKind::QuadrupleLong,
    );
}

#[test]
fn test_four_short_taps_fall_back_to_triple() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    for i in 0..4 {
        tap(&mut engine, &key, t0 + ms(i * 100), 20);
    }
    expect_single_gesture(engine.advance(t0 + ms(320) + ms(350)), GestureKind::Triple);
}

#[test]
fn test_super_long_press() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    let g = expect_single_gesture(tap(&mut engine, &key, t0, 800), GestureKind::SuperLong);
    assert_eq!(g.hold, Some(ms(800)));
}

#[test]
fn test_dead_band_hold_reports_attempted() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    // 300ms lies between the long band (<=140) and the super band (>=600).
    engine.on_press(&key, t0);
    let events = engine.on_release(&key, t0 + ms(300));
    assert_eq!(events.len(), 1);
    match &events[0] {
        EngineEvent::Attempted { input, held } => {
            assert_eq!(input, &key);
            assert_eq!(*held, ms(300));
        }
        other => panic!("expected attempted, got {:?}", other),
    }
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_cancel_fires_while_still_held() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    engine.on_press(&key, t0);
    assert!(engine.advance(t0 + ms(2900)).is_empty());

    // Cancel resolves from the deadline, without waiting for the release.
    let g = expect_single_gesture(engine.advance(t0 + ms(3000)), GestureKind::Cancel);
    assert_eq!(g.input, key);

    // The eventual release is a stale no-op.
    assert!(engine.on_release(&key, t0 + ms(3200)).is_empty());
}

#[test]
fn test_debounced_press_does_not_extend_sequence() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    tap(&mut engine, &key, t0, 20);
    // Bounce 5ms after the release: below the 15ms debounce floor.
    engine.on_press(&key, t0 + ms(25));
    engine.on_release(&key, t0 + ms(30));

    // Still classified from one real tap.
    expect_single_gesture(engine.advance(t0 + ms(20) + ms(350)), GestureKind::Single);
}

#[test]
fn test_charge_profile_emits_percentage() {
    let t0 = Instant::now();
    let settings = GestureSettings {
        profile: GestureProfile::Charge,
        ..Default::default()
    };
    let mut engine = GestureEngine::new(settings.into_shared());
    let key = PhysicalInput::plain("1");

    // 525ms is the midpoint of the [150, 900] charge band.
    let g = expect_single_gesture(tap(&mut engine, &key, t0, 525), GestureKind::ChargeRelease);
    assert_eq!(g.charge_pct, Some(50));
}

#[test]
fn test_charge_profile_short_tap_still_multi_tap() {
    let t0 = Instant::now();
    let settings = GestureSettings {
        profile: GestureProfile::Charge,
        ..Default::default()
    };
    let mut engine = GestureEngine::new(settings.into_shared());
    let key = PhysicalInput::plain("1");

    // 20ms is below the charge band; the multi-tap rules apply.
    tap(&mut engine, &key, t0, 20);
    expect_single_gesture(engine.advance(t0 + ms(20) + ms(350)), GestureKind::Single);
}

#[test]
fn test_dynamic_wait_window_widens_per_tap() {
    let t0 = Instant::now();
    let settings = GestureSettings {
        wait_window: WaitWindow::Dynamic {
            base_ms: 250,
            increment_ms: 100,
        },
        ..Default::default()
    };
    let mut engine = GestureEngine::new(settings.into_shared());
    let key = PhysicalInput::plain("1");

    tap(&mut engine, &key, t0, 20);
    tap(&mut engine, &key, t0 + ms(220), 20);
    // 330ms between the second release (t=240) and the third press: wider
    // than the 250ms base, allowed because the second tap's window is
    // 250 + 100 = 350ms.
    assert!(engine.advance(t0 + ms(540)).is_empty());
    tap(&mut engine, &key, t0 + ms(570), 20);

    let events = engine.advance(t0 + ms(590) + ms(450));
    let gs = gestures(events);
    assert_eq!(gs.len(), 1);
    assert_eq!(gs[0].kind, GestureKind::Triple);
}

#[test]
fn test_gesture_resolution_frees_the_machine() {
    let t0 = Instant::now();
    let mut engine = default_engine();
    let key = PhysicalInput::plain("1");

    tap(&mut engine, &key, t0, 100);
    assert_eq!(engine.active_count(), 0);
    assert!(engine.next_deadline().is_none());
}
