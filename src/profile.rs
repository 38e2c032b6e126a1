//! Macro profile: the validated binding collection and its trigger index
//!
//! A profile file is a JSON list of bindings (the shape the mapping UI
//! writes). Loading validates every binding up front and rejects the whole
//! file on any violation, so the engine only ever sees clean data.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::binding::{ConstraintViolation, MacroBinding};
use crate::gesture::GestureKind;
use crate::input::PhysicalInput;

#[derive(Debug)]
pub enum ProfileError {
    Io(String),
    Parse(String),
    /// Validation failures, tagged with the index of the offending binding.
    Invalid(Vec<(usize, ConstraintViolation)>),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "IO error: {}", e),
            ProfileError::Parse(e) => write!(f, "Parse error: {}", e),
            ProfileError::Invalid(violations) => {
                write!(f, "profile rejected ({} violations):", violations.len())?;
                for (index, violation) in violations {
                    write!(f, "\n  binding {}: {}", index, violation)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ProfileError {}

/// An immutable, validated set of bindings with an `(input, gesture)`
/// lookup index.
pub struct MacroProfile {
    bindings: Vec<MacroBinding>,
    index: HashMap<(PhysicalInput, GestureKind), usize>,
}

impl MacroProfile {
    /// Validate and index a binding list. All-or-nothing: a single
    /// violation rejects the whole collection, with every violation listed.
    pub fn from_bindings(bindings: Vec<MacroBinding>) -> Result<Self, ProfileError> {
        let mut violations = Vec::new();
        for (i, binding) in bindings.iter().enumerate() {
            if let Err(errs) = binding.validate() {
                violations.extend(errs.into_iter().map(|v| (i, v)));
            }
        }
        if !violations.is_empty() {
            return Err(ProfileError::Invalid(violations));
        }

        let mut index = HashMap::new();
        for (i, binding) in bindings.iter().enumerate() {
            let key = (binding.trigger_input(), binding.trigger_gesture);
            if index.insert(key, i).is_some() {
                tracing::warn!(
                    trigger = %binding.trigger_input(),
                    gesture = %binding.trigger_gesture,
                    "duplicate trigger: later binding wins"
                );
            }
        }
        Ok(Self { bindings, index })
    }

    /// Parse a JSON binding list.
    pub fn parse_json(json: &str) -> Result<Self, ProfileError> {
        let bindings: Vec<MacroBinding> =
            serde_json::from_str(json).map_err(|e| ProfileError::Parse(e.to_string()))?;
        Self::from_bindings(bindings)
    }

    /// Load and validate a profile file.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ProfileError::Io(e.to_string()))?;
        let profile = Self::parse_json(&content)?;
        tracing::info!(
            path = %path.display(),
            bindings = profile.bindings.len(),
            "profile loaded"
        );
        Ok(profile)
    }

    /// An empty profile, for running without a file.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The binding lookup the dispatcher runs on every resolved gesture.
    /// Disabled bindings are found but not dispatched; the caller decides.
    pub fn lookup(&self, input: &PhysicalInput, gesture: GestureKind) -> Option<&MacroBinding> {
        let i = *self.index.get(&(input.clone(), gesture))?;
        self.bindings.get(i)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[MacroBinding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::SequenceStep;
    use crate::input::ModifierContext;

    fn valid_binding(trigger: &str, gesture: GestureKind) -> MacroBinding {
        MacroBinding {
            trigger_key: trigger.to_string(),
            trigger_context: ModifierContext::Normal,
            trigger_gesture: gesture,
            sequence: vec![SequenceStep::new("a", 25, 30, 2)],
            enabled: true,
        }
    }

    #[test]
    fn test_lookup_by_trigger() {
        let profile = MacroProfile::from_bindings(vec![
            valid_binding("1", GestureKind::Double),
            valid_binding("2", GestureKind::Long),
        ])
        .unwrap();

        assert!(profile
            .lookup(&PhysicalInput::plain("1"), GestureKind::Double)
            .is_some());
        assert!(profile
            .lookup(&PhysicalInput::plain("1"), GestureKind::Triple)
            .is_none());
        assert!(profile
            .lookup(&PhysicalInput::plain("3"), GestureKind::Double)
            .is_none());
    }

    #[test]
    fn test_one_bad_binding_rejects_whole_profile() {
        let mut bad = valid_binding("2", GestureKind::Long);
        bad.sequence[0].min_delay = 10;

        let result =
            MacroProfile::from_bindings(vec![valid_binding("1", GestureKind::Double), bad]);
        match result {
            Err(ProfileError::Invalid(violations)) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].0, 1);
            }
            other => panic!("expected Invalid, got {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_parse_json_list() {
        let json = r#"[
            {
                "triggerKey": "1",
                "triggerGesture": "double",
                "sequence": [{"key": "a", "minDelay": 25, "maxDelay": 29, "echoHits": 6}]
            }
        ]"#;
        let profile = MacroProfile::parse_json(json).unwrap();
        assert_eq!(profile.len(), 1);
        let b = profile
            .lookup(&PhysicalInput::plain("1"), GestureKind::Double)
            .unwrap();
        assert!(b.enabled);
        assert_eq!(b.sequence[0].echo_hits, 6);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            MacroProfile::parse_json("{not json"),
            Err(ProfileError::Parse(_))
        ));
    }
}
