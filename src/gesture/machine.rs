//! Per-key gesture state machine
//!
//! One `KeyMachine` exists per active [`PhysicalInput`], created lazily on
//! the first press and destroyed by the engine once it resolves or cancels.
//! Nothing here sleeps or spawns timers: the machine stores deadlines as
//! plain `Instant`s and the engine polls [`KeyMachine::poll`] when one is
//! due. `clear_deadlines` is the single authoritative "cancel all timers
//! for this key" operation and runs at the start of every transition, so a
//! stale deadline can never fire against a newer state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::gesture::event::{EngineEvent, GestureEvent, GestureKind, HoldTier};
use crate::input::PhysicalInput;
use crate::settings::{GestureProfile, GestureSettings};

/// One press/release pair in the current interaction.
#[derive(Clone, Copy, Debug)]
struct PressRecord {
    pressed_at: Instant,
    hold: Option<Duration>,
}

/// Pending deadlines, armed as a group and cleared as a group.
#[derive(Clone, Copy, Debug, Default)]
struct Deadlines {
    /// Multi-press wait window after a short tap.
    wait: Option<Instant>,
    /// Hold-tier promotions while held.
    long_tier: Option<Instant>,
    super_tier: Option<Instant>,
    /// Whole-interaction abort while held.
    cancel: Option<Instant>,
}

pub(crate) struct KeyMachine {
    input: PhysicalInput,
    settings: Arc<GestureSettings>,
    presses: Vec<PressRecord>,
    press_count: u8,
    /// Start of the press currently held, if any.
    held_since: Option<Instant>,
    last_release: Option<Instant>,
    deadlines: Deadlines,
    hold_tier: HoldTier,
    done: bool,
}

impl KeyMachine {
    /// `previous_release` carries the release instant of the prior
    /// interaction on this input so debounce works across teardown.
    pub(crate) fn new(
        input: PhysicalInput,
        settings: Arc<GestureSettings>,
        previous_release: Option<Instant>,
    ) -> Self {
        Self {
            input,
            settings,
            presses: Vec::with_capacity(4),
            press_count: 0,
            held_since: None,
            last_release: previous_release,
            deadlines: Deadlines::default(),
            hold_tier: HoldTier::None,
            done: false,
        }
    }

    /// True once a gesture (or cancel) has been emitted; the engine removes
    /// the machine immediately after.
    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn last_release(&self) -> Option<Instant> {
        self.last_release
    }

    /// Current hold tier for telemetry. Only meaningful while held.
    pub(crate) fn hold_tier(&self) -> HoldTier {
        self.hold_tier
    }

    /// Live charge percentage while held: 0 below the charge band, 100 at
    /// its top, linear in between.
    pub(crate) fn charge_level(&self, now: Instant) -> Option<u8> {
        let since = self.held_since?;
        let held = now.saturating_duration_since(since);
        let min = self.settings.charge_min_hold();
        let max = self.settings.charge_max_hold();
        if max <= min {
            return Some(0);
        }
        let span = (max - min).as_millis() as f64;
        let progress = held.saturating_sub(min).as_millis() as f64;
        Some((progress / span * 100.0).clamp(0.0, 100.0) as u8)
    }

    /// Earliest pending deadline, for the engine's wakeup computation.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        [
            self.deadlines.wait,
            self.deadlines.long_tier,
            self.deadlines.super_tier,
            self.deadlines.cancel,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn clear_deadlines(&mut self) {
        self.deadlines = Deadlines::default();
    }

    /// Handle a press-down. Returns nothing: presses only ever start or
    /// extend an interaction; events come from releases and deadlines.
    pub(crate) fn on_press(&mut self, now: Instant) {
        if self.held_since.is_some() {
            // OS auto-repeat while held
            return;
        }
        if let Some(last) = self.last_release {
            if now.saturating_duration_since(last) < self.settings.debounce() {
                tracing::trace!(input = %self.input, "press dropped by debounce");
                return;
            }
        }

        self.clear_deadlines();
        self.held_since = Some(now);
        self.hold_tier = HoldTier::None;
        if self.press_count < 4 {
            self.press_count += 1;
        }
        self.presses.push(PressRecord {
            pressed_at: now,
            hold: None,
        });

        self.deadlines.long_tier = Some(now + self.settings.long_press_min());
        self.deadlines.super_tier = Some(now + self.settings.super_long_min());
        self.deadlines.cancel = Some(now + self.settings.cancel_threshold());
    }

    /// Handle a release. A release with no matching press (duplicate, or
    /// arriving after teardown) is a no-op.
    pub(crate) fn on_release(&mut self, now: Instant) -> Option<EngineEvent> {
        let pressed_at = self.held_since.take()?;
        let held = now.saturating_duration_since(pressed_at);
        self.last_release = Some(now);
        self.hold_tier = HoldTier::None;
        if let Some(record) = self.presses.last_mut() {
            record.hold = Some(held);
        }
        self.clear_deadlines();

        if self.settings.profile == GestureProfile::Charge
            && held >= self.settings.charge_min_hold()
            && held <= self.settings.charge_max_hold()
        {
            let pct = charge_pct(held, &self.settings);
            return Some(self.resolve_with(GestureKind::ChargeRelease, now, Some(held), Some(pct)));
        }

        if held >= self.settings.long_press_min() && held <= self.settings.long_press_max() {
            // A long hold is unambiguous the instant it ends: resolve now,
            // whether it was the first press or the end of a tap sequence.
            let kind = GestureKind::from_taps(self.press_count, true);
            return Some(self.resolve_with(kind, now, Some(held), None));
        }

        if held > self.settings.long_press_max() {
            if held >= self.settings.cancel_threshold() {
                // Normally the cancel deadline fires while still held; this
                // path only runs if the caller never polled in between.
                return Some(self.cancel(now));
            }
            if held >= self.settings.super_long_min() && held <= self.settings.super_long_max() {
                return Some(self.resolve_with(GestureKind::SuperLong, now, Some(held), None));
            }
            // Too long for a gesture, too short for super-long: the whole
            // interaction is a failed attempt.
            tracing::debug!(input = %self.input, held_ms = held.as_millis() as u64, "attempted gesture discarded");
            self.done = true;
            return Some(EngineEvent::Attempted {
                input: self.input.clone(),
                held,
            });
        }

        // Short tap: wait for a possible follow-up press.
        self.deadlines.wait = Some(now + self.settings.wait_window.after_press(self.press_count));
        None
    }

    /// Fire whatever deadlines are due at `now`. At most one emitted event:
    /// tier promotions are silent, and wait/cancel both end the machine.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<EngineEvent> {
        if let Some(due) = self.deadlines.cancel {
            if now >= due {
                self.clear_deadlines();
                return Some(self.cancel(now));
            }
        }
        if let Some(due) = self.deadlines.long_tier {
            if now >= due {
                self.deadlines.long_tier = None;
                self.hold_tier = HoldTier::Long;
            }
        }
        if let Some(due) = self.deadlines.super_tier {
            if now >= due {
                self.deadlines.super_tier = None;
                self.hold_tier = HoldTier::SuperLong;
            }
        }
        if let Some(due) = self.deadlines.wait {
            if now >= due {
                self.clear_deadlines();
                let kind = GestureKind::from_taps(self.press_count, false);
                return Some(self.resolve_with(kind, now, None, None));
            }
        }
        None
    }

    fn cancel(&mut self, now: Instant) -> EngineEvent {
        tracing::debug!(input = %self.input, "interaction cancelled");
        self.resolve_with(GestureKind::Cancel, now, None, None)
    }

    fn resolve_with(
        &mut self,
        kind: GestureKind,
        now: Instant,
        hold: Option<Duration>,
        charge_pct: Option<u8>,
    ) -> EngineEvent {
        debug_assert!(!self.done, "machine resolved twice");
        self.done = true;
        tracing::debug!(input = %self.input, gesture = %kind, presses = self.press_count, "gesture resolved");
        EngineEvent::Gesture(GestureEvent {
            input: self.input.clone(),
            kind,
            at: now,
            hold,
            charge_pct,
        })
    }
}

fn charge_pct(held: Duration, settings: &GestureSettings) -> u8 {
    let min = settings.charge_min_hold();
    let max = settings.charge_max_hold();
    if max <= min {
        return 0;
    }
    let span = (max - min).as_millis() as f64;
    let progress = held.saturating_sub(min).as_millis() as f64;
    (progress / span * 100.0).clamp(0.0, 100.0) as u8
}
