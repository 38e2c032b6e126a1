//! Macro bindings: trigger → timed key sequence, with validation
//!
//! A [`MacroBinding`] maps one (input, gesture) trigger to an ordered list
//! of [`SequenceStep`]s. Bindings come from profile JSON and are validated
//! wholesale before the scheduler ever sees them: a binding either passes
//! every constraint or is rejected with the full list of violations. There
//! is no partial acceptance.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gesture::GestureKind;
use crate::input::{ModifierContext, PhysicalInput};

/// Smallest allowed inter-press delay (ms). Anything faster reads as
/// machine-generated to most games' anti-automation heuristics.
pub const MIN_DELAY_MS: u64 = 25;
/// Required spread between min and max delay (ms), so jitter has room.
pub const MIN_VARIANCE_MS: u64 = 4;
/// Distinct target keys allowed in one sequence.
pub const MAX_UNIQUE_KEYS: usize = 4;
/// Steps allowed to reference the same target key.
pub const MAX_STEPS_PER_KEY: usize = 6;
/// Echo hits allowed on a single step.
pub const MAX_ECHO_HITS: u32 = 20;

/// One unit of a bound macro: press `key` `echo_hits` times, each press
/// separated by a delay drawn from `[min_delay_ms, max_delay_ms]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceStep {
    pub key: String,
    pub min_delay: u64,
    pub max_delay: u64,
    #[serde(default = "default_echo_hits")]
    pub echo_hits: u32,
}

fn default_echo_hits() -> u32 {
    1
}

impl SequenceStep {
    pub fn new(key: &str, min_delay: u64, max_delay: u64, echo_hits: u32) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            min_delay,
            max_delay,
            echo_hits,
        }
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay)
    }
}

/// A trigger plus its bound step sequence. Immutable once validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroBinding {
    pub trigger_key: String,
    #[serde(default)]
    pub trigger_context: ModifierContext,
    pub trigger_gesture: GestureKind,
    pub sequence: Vec<SequenceStep>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl MacroBinding {
    /// The input this binding listens on.
    pub fn trigger_input(&self) -> PhysicalInput {
        PhysicalInput::new(&self.trigger_key, self.trigger_context)
    }

    /// Check every constraint, collecting all violations rather than
    /// stopping at the first so a UI can show the complete list.
    pub fn validate(&self) -> Result<(), Vec<ConstraintViolation>> {
        let mut violations = Vec::new();

        if self.sequence.is_empty() {
            violations.push(ConstraintViolation::EmptySequence);
        }
        if self.trigger_gesture == GestureKind::Cancel {
            violations.push(ConstraintViolation::CancelTrigger);
        }

        let mut unique_keys: HashSet<&str> = HashSet::new();
        for (index, step) in self.sequence.iter().enumerate() {
            unique_keys.insert(step.key.as_str());

            if step.min_delay < MIN_DELAY_MS {
                violations.push(ConstraintViolation::DelayTooSmall {
                    step: index,
                    min_delay: step.min_delay,
                });
            }
            if step.max_delay < step.min_delay
                || step.max_delay - step.min_delay < MIN_VARIANCE_MS
            {
                violations.push(ConstraintViolation::InsufficientVariance {
                    step: index,
                    min_delay: step.min_delay,
                    max_delay: step.max_delay,
                });
            }
            if step.echo_hits < 1 || step.echo_hits > MAX_ECHO_HITS {
                violations.push(ConstraintViolation::EchoHitsOutOfRange {
                    step: index,
                    echo_hits: step.echo_hits,
                });
            }
        }

        if unique_keys.len() > MAX_UNIQUE_KEYS {
            violations.push(ConstraintViolation::TooManyUniqueKeys {
                count: unique_keys.len(),
            });
        }
        for key in unique_keys {
            let steps = self.sequence.iter().filter(|s| s.key == key).count();
            if steps > MAX_STEPS_PER_KEY {
                violations.push(ConstraintViolation::TooManyStepsForKey {
                    key: key.to_string(),
                    count: steps,
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// A single violated timing constraint, with enough detail to render an
/// actionable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintViolation {
    EmptySequence,
    CancelTrigger,
    DelayTooSmall { step: usize, min_delay: u64 },
    InsufficientVariance { step: usize, min_delay: u64, max_delay: u64 },
    TooManyUniqueKeys { count: usize },
    TooManyStepsForKey { key: String, count: usize },
    EchoHitsOutOfRange { step: usize, echo_hits: u32 },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::EmptySequence => write!(f, "sequence has no steps"),
            ConstraintViolation::CancelTrigger => {
                write!(f, "the cancel gesture cannot trigger a macro")
            }
            ConstraintViolation::DelayTooSmall { step, min_delay } => write!(
                f,
                "step {}: minimum delay {}ms is below the {}ms floor",
                step, min_delay, MIN_DELAY_MS
            ),
            ConstraintViolation::InsufficientVariance {
                step,
                min_delay,
                max_delay,
            } => write!(
                f,
                "step {}: delay range [{}, {}]ms needs at least {}ms of variance",
                step, min_delay, max_delay, MIN_VARIANCE_MS
            ),
            ConstraintViolation::TooManyUniqueKeys { count } => write!(
                f,
                "sequence references {} unique keys (limit {})",
                count, MAX_UNIQUE_KEYS
            ),
            ConstraintViolation::TooManyStepsForKey { key, count } => write!(
                f,
                "key \"{}\" appears in {} steps (limit {})",
                key, count, MAX_STEPS_PER_KEY
            ),
            ConstraintViolation::EchoHitsOutOfRange { step, echo_hits } => write!(
                f,
                "step {}: {} echo hits outside [1, {}]",
                step, echo_hits, MAX_ECHO_HITS
            ),
        }
    }
}

impl std::error::Error for ConstraintViolation {}
