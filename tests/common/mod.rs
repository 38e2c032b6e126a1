//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use keyecho::binding::{MacroBinding, SequenceStep};
use keyecho::gesture::{EngineEvent, GestureEngine, GestureEvent, GestureKind};
use keyecho::inject::{InjectError, InjectionBackend};
use keyecho::input::{ModifierContext, PhysicalInput};
use keyecho::settings::GestureSettings;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn default_engine() -> GestureEngine {
    GestureEngine::new(GestureSettings::default().into_shared())
}

/// Press at `at`, release after `hold_ms`. Returns whatever the release
/// emitted (hold gestures resolve immediately).
pub fn tap(
    engine: &mut GestureEngine,
    key: &PhysicalInput,
    at: Instant,
    hold_ms: u64,
) -> Vec<EngineEvent> {
    engine.on_press(key, at);
    engine.on_release(key, at + ms(hold_ms))
}

/// Extract the gesture events, panicking on anything else.
pub fn gestures(events: Vec<EngineEvent>) -> Vec<GestureEvent> {
    events
        .into_iter()
        .map(|e| match e {
            EngineEvent::Gesture(g) => g,
            other => panic!("expected gesture, got {:?}", other),
        })
        .collect()
}

/// Expect exactly one gesture of the given kind.
pub fn expect_single_gesture(events: Vec<EngineEvent>, kind: GestureKind) -> GestureEvent {
    let mut gs = gestures(events);
    assert_eq!(gs.len(), 1, "expected exactly one gesture");
    let g = gs.pop().unwrap();
    assert_eq!(g.kind, kind);
    g
}

/// A valid one-step binding for tests.
pub fn simple_binding(trigger: &str, gesture: GestureKind, target: &str) -> MacroBinding {
    MacroBinding {
        trigger_key: trigger.to_string(),
        trigger_context: ModifierContext::Normal,
        trigger_gesture: gesture,
        sequence: vec![SequenceStep::new(target, 25, 29, 1)],
        enabled: true,
    }
}

/// Backend that records every key sent, shareable with the test body.
pub struct RecordingBackend {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingBackend {
    pub fn new() -> (Box<dyn InjectionBackend>, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (Box::new(RecordingBackend { sent: sent.clone() }), sent)
    }
}

impl InjectionBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn send_key(&mut self, key: &str) -> Result<(), InjectError> {
        self.sent.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
