//! Identity types for physical inputs: key name plus modifier context
//!
//! A `PhysicalInput` is the unit of isolation for the whole engine: gesture
//! machines, macro queues, and cancellation are all keyed by it. Two inputs
//! that differ only in modifier context are entirely independent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The modifier context a key was pressed under.
///
/// The engine never merges contexts: "1" pressed plain and "1" pressed with
/// Ctrl held are two unrelated inputs with their own state machines and
/// macro queues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierContext {
    #[default]
    Normal,
    Ctrl,
    Shift,
    Alt,
}

impl fmt::Display for ModifierContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierContext::Normal => write!(f, "normal"),
            ModifierContext::Ctrl => write!(f, "ctrl"),
            ModifierContext::Shift => write!(f, "shift"),
            ModifierContext::Alt => write!(f, "alt"),
        }
    }
}

/// One distinguishable input source: a key/button name plus the modifier
/// context it was pressed under.
///
/// Key names are lowercase logical names ("a", "1", "f5", "mouse4"); the
/// scan-code table resolves them for injection, but the engine itself treats
/// them as opaque identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalInput {
    pub key: String,
    #[serde(default)]
    pub context: ModifierContext,
}

impl PhysicalInput {
    /// Create an input in the given context. The key name is normalized to
    /// lowercase so profile files and hook callbacks agree on identity.
    pub fn new(key: &str, context: ModifierContext) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            context,
        }
    }

    /// Create an input in the normal (no-modifier) context.
    pub fn plain(key: &str) -> Self {
        Self::new(key, ModifierContext::Normal)
    }
}

impl fmt::Display for PhysicalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context == ModifierContext::Normal {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.context, self.key)
        }
    }
}
