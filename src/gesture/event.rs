//! Gesture event types emitted by the engine

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::input::PhysicalInput;

/// The fixed set of gesture classifications.
///
/// `Cancel` is part of the stream so a listener can tear down anything it
/// started for this key; it never matches a binding trigger. The charge
/// percentage for `ChargeRelease` travels on the [`GestureEvent`], not the
/// kind, so triggers can be matched by kind alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Single,
    Long,
    Double,
    DoubleLong,
    Triple,
    TripleLong,
    QuadrupleLong,
    SuperLong,
    ChargeRelease,
    Cancel,
}

impl GestureKind {
    /// Classification from tap count and whether the final press was long.
    ///
    /// Counts above 4 never occur (the machine caps accumulation), and a
    /// 4-tap sequence without a long final falls back to the 3-tap
    /// classification.
    pub fn from_taps(press_count: u8, final_press_long: bool) -> GestureKind {
        match (press_count, final_press_long) {
            (0..=1, false) => GestureKind::Single,
            (0..=1, true) => GestureKind::Long,
            (2, false) => GestureKind::Double,
            (2, true) => GestureKind::DoubleLong,
            (3, false) => GestureKind::Triple,
            (3, true) => GestureKind::TripleLong,
            (_, true) => GestureKind::QuadrupleLong,
            (_, false) => GestureKind::Triple,
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureKind::Single => "single",
            GestureKind::Long => "long",
            GestureKind::Double => "double",
            GestureKind::DoubleLong => "double_long",
            GestureKind::Triple => "triple",
            GestureKind::TripleLong => "triple_long",
            GestureKind::QuadrupleLong => "quadruple_long",
            GestureKind::SuperLong => "super_long",
            GestureKind::ChargeRelease => "charge_release",
            GestureKind::Cancel => "cancel",
        };
        write!(f, "{}", name)
    }
}

/// One resolved interaction. Emitted exactly once per recording cycle;
/// emitting it always tears down the machine that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureEvent {
    pub input: PhysicalInput,
    pub kind: GestureKind,
    pub at: Instant,
    /// Hold duration of the final press, when it was a recognized hold.
    pub hold: Option<Duration>,
    /// Charge percentage (0-100) for `ChargeRelease`.
    pub charge_pct: Option<u8>,
}

/// Hold-tier telemetry while a key is down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoldTier {
    #[default]
    None,
    Long,
    SuperLong,
}

/// Everything the gesture engine can report.
///
/// `Attempted` covers holds that outlived the long band but missed the
/// super-long band: the interaction is discarded, but a UI can still tell
/// the user something almost happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Gesture(GestureEvent),
    Attempted { input: PhysicalInput, held: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_classification() {
        assert_eq!(GestureKind::from_taps(1, false), GestureKind::Single);
        assert_eq!(GestureKind::from_taps(1, true), GestureKind::Long);
        assert_eq!(GestureKind::from_taps(2, false), GestureKind::Double);
        assert_eq!(GestureKind::from_taps(2, true), GestureKind::DoubleLong);
        assert_eq!(GestureKind::from_taps(3, false), GestureKind::Triple);
        assert_eq!(GestureKind::from_taps(3, true), GestureKind::TripleLong);
        assert_eq!(GestureKind::from_taps(4, true), GestureKind::QuadrupleLong);
    }

    #[test]
    fn test_four_short_taps_fall_back_to_triple() {
        assert_eq!(GestureKind::from_taps(4, false), GestureKind::Triple);
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&GestureKind::DoubleLong).unwrap();
        assert_eq!(json, "\"double_long\"");
        let back: GestureKind = serde_json::from_str("\"charge_release\"").unwrap();
        assert_eq!(back, GestureKind::ChargeRelease);
    }
}
