//! Macro scheduler: per-key FIFO queues of timed executions
//!
//! Each [`PhysicalInput`] owns one FIFO queue; queues never block one
//! another. [`MacroScheduler::tick`] sends at most one keystroke per queue
//! per call, so playback pace is governed entirely by the per-keystroke
//! due times, each jittered uniformly within the step's delay range. The
//! scheduler is passive between ticks: when every queue is empty
//! ([`MacroScheduler::is_idle`]) the runtime stops driving it until the
//! next dispatch.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::binding::{MacroBinding, SequenceStep};
use crate::inject::InjectionBackend;
use crate::input::PhysicalInput;

/// Execution telemetry, one event per observable transition.
#[derive(Clone, Debug)]
pub enum MacroExecutionEvent {
    /// First keystroke of an execution went out.
    Started { input: PhysicalInput, at: Instant },
    /// One synthetic keystroke went out.
    Step {
        input: PhysicalInput,
        key: String,
        step_index: usize,
        echo_index: u32,
        at: Instant,
    },
    /// Execution played its final keystroke.
    Completed { input: PhysicalInput, at: Instant },
    /// Execution was cancelled before completing.
    Cancelled { input: PhysicalInput, at: Instant },
    /// The backend rejected a keystroke; the execution is aborted (never
    /// retried) and the queue proceeds to its next entry.
    Error {
        input: PhysicalInput,
        key: String,
        step_index: usize,
        reason: String,
        at: Instant,
    },
}

/// A live instance of a binding being played out.
struct MacroExecution {
    steps: Arc<Vec<SequenceStep>>,
    step_index: usize,
    echo_index: u32,
    next_due: Instant,
    cancelled: bool,
    started: bool,
}

impl MacroExecution {
    fn current_step(&self) -> Option<&SequenceStep> {
        self.steps.get(self.step_index)
    }
}

pub struct MacroScheduler {
    backend: Box<dyn InjectionBackend>,
    queues: HashMap<PhysicalInput, VecDeque<MacroExecution>>,
}

impl MacroScheduler {
    pub fn new(backend: Box<dyn InjectionBackend>) -> Self {
        Self {
            backend,
            queues: HashMap::new(),
        }
    }

    /// Queue a validated binding for playback. Returns false (and queues
    /// nothing) when the binding is disabled or has no steps.
    pub fn dispatch(&mut self, binding: &MacroBinding, now: Instant) -> bool {
        if !binding.enabled || binding.sequence.is_empty() {
            tracing::debug!(trigger = %binding.trigger_input(), "dispatch skipped: binding disabled or empty");
            return false;
        }
        let input = binding.trigger_input();
        tracing::debug!(trigger = %input, steps = binding.sequence.len(), "macro dispatched");
        self.queues
            .entry(input)
            .or_default()
            .push_back(MacroExecution {
                steps: Arc::new(binding.sequence.clone()),
                step_index: 0,
                echo_index: 0,
                next_due: now,
                cancelled: false,
                started: false,
            });
        true
    }

    /// Cancel everything queued for one input. Other inputs' queues are
    /// untouched. Shares the teardown path with timeout cancellation: each
    /// execution is flagged, then drained with a `Cancelled` event.
    pub fn cancel(&mut self, input: &PhysicalInput, now: Instant) -> Vec<MacroExecutionEvent> {
        let Some(queue) = self.queues.get_mut(input) else {
            return Vec::new();
        };
        for execution in queue.iter_mut() {
            execution.cancelled = true;
        }
        let mut events = Vec::new();
        Self::drain_queue(input, queue, &mut events, now);
        if queue.is_empty() {
            self.queues.remove(input);
        }
        events
    }

    /// True when no executions are queued anywhere.
    pub fn is_idle(&self) -> bool {
        self.queues.is_empty()
    }

    /// Earliest pending due time across all queue heads, for the runtime's
    /// wakeup computation.
    pub fn next_due(&self) -> Option<Instant> {
        self.queues
            .values()
            .filter_map(|q| q.front())
            .map(|e| e.next_due)
            .min()
    }

    /// Advance every queue's head execution once. Call when
    /// [`MacroScheduler::next_due`] has passed (or on a fixed tick).
    pub fn tick(&mut self, now: Instant) -> Vec<MacroExecutionEvent> {
        let mut events = Vec::new();

        let inputs: Vec<PhysicalInput> = self.queues.keys().cloned().collect();
        for input in inputs {
            let Some(queue) = self.queues.get_mut(&input) else {
                continue;
            };

            loop {
                Self::drain_queue(&input, queue, &mut events, now);
                let Some(head) = queue.front_mut() else {
                    break;
                };
                if now < head.next_due {
                    break;
                }
                let Some(step) = head.current_step().cloned() else {
                    // Exhausted steps are popped by drain_queue; reaching
                    // here means the indices were corrupted.
                    debug_assert!(false, "execution survived step exhaustion");
                    queue.pop_front();
                    continue;
                };

                match self.backend.send_key(&step.key) {
                    Ok(()) => {
                        if !head.started {
                            head.started = true;
                            events.push(MacroExecutionEvent::Started {
                                input: input.clone(),
                                at: now,
                            });
                        }
                        events.push(MacroExecutionEvent::Step {
                            input: input.clone(),
                            key: step.key.clone(),
                            step_index: head.step_index,
                            echo_index: head.echo_index,
                            at: now,
                        });

                        head.echo_index += 1;
                        if head.echo_index >= step.echo_hits {
                            head.step_index += 1;
                            head.echo_index = 0;
                        }

                        if let Some(upcoming) = head.current_step() {
                            // Each gap uses the jitter range of the
                            // keystroke it precedes; the final keystroke
                            // schedules nothing.
                            head.next_due = now + jittered_delay(upcoming);
                        } else {
                            events.push(MacroExecutionEvent::Completed {
                                input: input.clone(),
                                at: now,
                            });
                            queue.pop_front();
                            continue;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(input = %input, key = %step.key, error = %err, "macro aborted on backend failure");
                        events.push(MacroExecutionEvent::Error {
                            input: input.clone(),
                            key: step.key.clone(),
                            step_index: head.step_index,
                            reason: err.to_string(),
                            at: now,
                        });
                        queue.pop_front();
                        continue;
                    }
                }
                break;
            }

            if queue.is_empty() {
                self.queues.remove(&input);
            }
        }

        events
    }

    /// Pop cancelled executions off the front of a queue.
    fn drain_queue(
        input: &PhysicalInput,
        queue: &mut VecDeque<MacroExecution>,
        events: &mut Vec<MacroExecutionEvent>,
        now: Instant,
    ) {
        while queue.front().is_some_and(|e| e.cancelled) {
            queue.pop_front();
            events.push(MacroExecutionEvent::Cancelled {
                input: input.clone(),
                at: now,
            });
        }
    }
}

/// Uniform draw from the step's `[min_delay, max_delay]` for one keystroke.
/// Every keystroke gets a fresh draw, so repeated runs of the same macro
/// never produce identical timing.
fn jittered_delay(step: &SequenceStep) -> Duration {
    let ms = rand::thread_rng().gen_range(step.min_delay..=step.max_delay);
    Duration::from_millis(ms)
}
