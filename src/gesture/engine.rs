//! Gesture engine: owns every live per-key machine
//!
//! The engine is the only owner of gesture state. Machines are created
//! lazily on first press and dropped the moment they emit, so idle keys
//! cost nothing. All methods take an explicit `now` so behavior is
//! deterministic under test; the runtime passes `Instant::now()`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::gesture::event::{EngineEvent, HoldTier};
use crate::gesture::machine::KeyMachine;
use crate::input::PhysicalInput;
use crate::settings::GestureSettings;

pub struct GestureEngine {
    settings: Arc<GestureSettings>,
    machines: HashMap<PhysicalInput, KeyMachine>,
    /// Release instants of recently torn-down machines, kept so debounce
    /// still applies to a press that arrives right after a resolution.
    recent_releases: HashMap<PhysicalInput, Instant>,
}

impl GestureEngine {
    pub fn new(settings: Arc<GestureSettings>) -> Self {
        Self {
            settings,
            machines: HashMap::new(),
            recent_releases: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Arc<GestureSettings> {
        &self.settings
    }

    /// Number of live machines (interactions currently in flight).
    pub fn active_count(&self) -> usize {
        self.machines.len()
    }

    /// Feed a press-down for one input.
    pub fn on_press(&mut self, input: &PhysicalInput, now: Instant) {
        let machine = self.machines.entry(input.clone()).or_insert_with(|| {
            KeyMachine::new(
                input.clone(),
                Arc::clone(&self.settings),
                self.recent_releases.get(input).copied(),
            )
        });
        machine.on_press(now);
    }

    /// Feed a release for one input. A release with no live machine is a
    /// no-op (duplicate release, or release after a cancel teardown).
    pub fn on_release(&mut self, input: &PhysicalInput, now: Instant) -> Vec<EngineEvent> {
        let Some(machine) = self.machines.get_mut(input) else {
            return Vec::new();
        };
        let event = machine.on_release(now);
        self.reap(input);
        event.into_iter().collect()
    }

    /// Fire every deadline due at `now` across all machines. Call whenever
    /// [`GestureEngine::next_deadline`] has passed.
    pub fn advance(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let due: Vec<PhysicalInput> = self
            .machines
            .iter()
            .filter(|(_, m)| m.next_deadline().is_some_and(|d| now >= d))
            .map(|(input, _)| input.clone())
            .collect();
        for input in due {
            if let Some(machine) = self.machines.get_mut(&input) {
                if let Some(event) = machine.poll(now) {
                    events.push(event);
                }
                self.reap(&input);
            }
        }
        events
    }

    /// Earliest pending deadline across all machines, for the runtime's
    /// wakeup computation. `None` when every key is idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.machines.values().filter_map(|m| m.next_deadline()).min()
    }

    /// Live charge percentage for an input, if it is currently held.
    pub fn charge_level(&self, input: &PhysicalInput, now: Instant) -> Option<u8> {
        self.machines.get(input)?.charge_level(now)
    }

    /// Current hold tier for an input. `HoldTier::None` when idle.
    pub fn hold_tier(&self, input: &PhysicalInput) -> HoldTier {
        self.machines
            .get(input)
            .map(|m| m.hold_tier())
            .unwrap_or_default()
    }

    /// Drop the machine if it resolved, remembering its last release for
    /// cross-interaction debounce.
    fn reap(&mut self, input: &PhysicalInput) {
        let done = self.machines.get(input).is_some_and(|m| m.is_done());
        if done {
            if let Some(machine) = self.machines.remove(input) {
                if let Some(at) = machine.last_release() {
                    self.recent_releases.insert(input.clone(), at);
                }
            }
        }
    }
}
