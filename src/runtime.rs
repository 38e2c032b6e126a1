//! Agent runtime: wires capture → engine → profile → scheduler
//!
//! Single-threaded and event-driven: raw press/release events arrive over
//! an mpsc channel (the capture hook is the only producer), and the loop
//! sleeps until either the next event or the earliest pending deadline.
//! Nothing spins while idle, and engine/scheduler state is never touched
//! from another thread.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::gesture::{EngineEvent, GestureEngine, GestureKind};
use crate::inject::InjectionBackend;
use crate::input::PhysicalInput;
use crate::profile::MacroProfile;
use crate::scheduler::{MacroExecutionEvent, MacroScheduler};
use crate::settings::GestureSettings;

/// One raw event from the capture collaborator.
#[derive(Clone, Debug)]
pub enum RawInputEvent {
    Press { input: PhysicalInput, at: Instant },
    Release { input: PhysicalInput, at: Instant },
}

/// Everything the agent reports outward (UI telemetry, logs, tests).
#[derive(Clone, Debug)]
pub enum AgentEvent {
    Gesture(EngineEvent),
    Macro(MacroExecutionEvent),
}

pub struct Agent {
    engine: GestureEngine,
    scheduler: MacroScheduler,
    profile: MacroProfile,
}

impl Agent {
    pub fn new(
        settings: Arc<GestureSettings>,
        profile: MacroProfile,
        backend: Box<dyn InjectionBackend>,
    ) -> Self {
        Self {
            engine: GestureEngine::new(settings),
            scheduler: MacroScheduler::new(backend),
            profile,
        }
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    /// Feed one raw event through gesture detection and dispatch whatever
    /// resolves.
    pub fn handle_raw(&mut self, event: RawInputEvent) -> Vec<AgentEvent> {
        let engine_events = match event {
            RawInputEvent::Press { input, at } => {
                self.engine.on_press(&input, at);
                Vec::new()
            }
            RawInputEvent::Release { input, at } => self.engine.on_release(&input, at),
        };
        self.dispatch(engine_events)
    }

    /// Fire due gesture deadlines and advance macro playback.
    pub fn pump(&mut self, now: Instant) -> Vec<AgentEvent> {
        let engine_events = self.engine.advance(now);
        let mut out = self.dispatch(engine_events);
        if !self.scheduler.is_idle() {
            out.extend(self.scheduler.tick(now).into_iter().map(AgentEvent::Macro));
        }
        out
    }

    /// Earliest instant anything needs attention, for the loop's sleep.
    pub fn next_wakeup(&self) -> Option<Instant> {
        match (self.engine.next_deadline(), self.scheduler.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Abort everything queued for one input (emergency stop from a UI).
    /// Shares the teardown path with the cancel gesture.
    pub fn cancel_key(&mut self, input: &PhysicalInput, now: Instant) -> Vec<AgentEvent> {
        self.scheduler
            .cancel(input, now)
            .into_iter()
            .map(AgentEvent::Macro)
            .collect()
    }

    /// Route resolved gestures: cancels tear down the key's queue, other
    /// kinds go through the binding lookup.
    fn dispatch(&mut self, engine_events: Vec<EngineEvent>) -> Vec<AgentEvent> {
        let mut out = Vec::new();
        for event in engine_events {
            if let EngineEvent::Gesture(gesture) = &event {
                let now = gesture.at;
                if gesture.kind == GestureKind::Cancel {
                    out.extend(
                        self.scheduler
                            .cancel(&gesture.input, now)
                            .into_iter()
                            .map(AgentEvent::Macro),
                    );
                } else if let Some(binding) = self.profile.lookup(&gesture.input, gesture.kind) {
                    let binding = binding.clone();
                    self.scheduler.dispatch(&binding, now);
                } else {
                    tracing::trace!(input = %gesture.input, gesture = %gesture.kind, "no binding");
                }
            }
            out.push(AgentEvent::Gesture(event));
        }
        out
    }

    /// Run until the capture side hangs up. Blocks the calling thread.
    pub fn run(mut self, events: Receiver<RawInputEvent>) {
        tracing::info!(bindings = self.profile.len(), "agent loop started");
        loop {
            let now = Instant::now();
            let received = match self.next_wakeup() {
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(now);
                    match events.recv_timeout(timeout) {
                        Ok(event) => Some(event),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                // Fully idle: block until the next raw event. The long
                // timeout only bounds shutdown latency.
                None => match events.recv_timeout(Duration::from_secs(60)) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
            };

            if let Some(event) = received {
                for out in self.handle_raw(event) {
                    log_event(&out);
                }
            }
            for out in self.pump(Instant::now()) {
                log_event(&out);
            }
        }
        tracing::info!("agent loop stopped: capture channel closed");
    }
}

fn log_event(event: &AgentEvent) {
    match event {
        AgentEvent::Gesture(EngineEvent::Gesture(g)) => {
            tracing::info!(input = %g.input, gesture = %g.kind, charge = g.charge_pct, "gesture");
        }
        AgentEvent::Gesture(EngineEvent::Attempted { input, held }) => {
            tracing::info!(input = %input, held_ms = held.as_millis() as u64, "attempted gesture");
        }
        AgentEvent::Macro(m) => match m {
            MacroExecutionEvent::Started { input, .. } => {
                tracing::debug!(input = %input, "macro started");
            }
            MacroExecutionEvent::Step {
                input,
                key,
                echo_index,
                ..
            } => {
                tracing::trace!(input = %input, key = %key, echo = echo_index, "macro step");
            }
            MacroExecutionEvent::Completed { input, .. } => {
                tracing::debug!(input = %input, "macro completed");
            }
            MacroExecutionEvent::Cancelled { input, .. } => {
                tracing::debug!(input = %input, "macro cancelled");
            }
            MacroExecutionEvent::Error {
                input,
                key,
                step_index,
                reason,
                ..
            } => {
                tracing::warn!(input = %input, key = %key, step = step_index, reason = %reason, "macro error");
            }
        },
    }
}
