//! Gesture timing settings
//!
//! All thresholds the state machine classifies against, persisted as YAML in
//! `~/.config/keyecho/settings.yaml`. Live machines hold the `Arc` handle
//! they were created with, so reloading settings only affects interactions
//! that start afterwards; nothing in flight is torn down.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which gesture taxonomy the engine classifies with.
///
/// `MultiTap` is the tap-count taxonomy (single/double/triple plus the long
/// variants). `Charge` additionally turns holds inside the charge band into
/// a charge-release gesture carrying a 0-100 percentage; holds outside the
/// band fall through to the multi-tap rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureProfile {
    #[default]
    MultiTap,
    Charge,
}

/// How the multi-press wait window is sized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum WaitWindow {
    /// Same window after every tap.
    Fixed { window_ms: u64 },
    /// `base_ms + increment_ms * (press_count - 1)`: later taps get a wider
    /// window, trading latency for longer sequences.
    Dynamic { base_ms: u64, increment_ms: u64 },
}

impl WaitWindow {
    /// Window to wait after the tap that brought the count to `press_count`.
    pub fn after_press(&self, press_count: u8) -> Duration {
        let ms = match *self {
            WaitWindow::Fixed { window_ms } => window_ms,
            WaitWindow::Dynamic {
                base_ms,
                increment_ms,
            } => base_ms + increment_ms * (press_count.saturating_sub(1) as u64),
        };
        Duration::from_millis(ms)
    }
}

/// Thresholds and timeouts for gesture classification.
///
/// Bands are inclusive on both ends. The machine assumes
/// `long_press_min <= long_press_max < super_long_min <= super_long_max
/// < cancel_threshold`; [`GestureSettings::validate`] checks this when a
/// file is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Which taxonomy to classify with.
    pub profile: GestureProfile,
    /// Wait-window sizing for multi-press sequences.
    pub wait_window: WaitWindow,
    /// Presses arriving sooner than this after a release are hardware
    /// bounce and are dropped (ms).
    pub debounce_ms: u64,
    /// Long-press band (ms, inclusive).
    pub long_press_min_ms: u64,
    pub long_press_max_ms: u64,
    /// Super-long band (ms, inclusive).
    pub super_long_min_ms: u64,
    pub super_long_max_ms: u64,
    /// Holds reaching this abort the whole interaction (ms).
    pub cancel_threshold_ms: u64,
    /// Charge band for the `Charge` profile (ms, inclusive).
    pub charge_min_hold_ms: u64,
    pub charge_max_hold_ms: u64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            profile: GestureProfile::MultiTap,
            wait_window: WaitWindow::Fixed { window_ms: 350 },
            debounce_ms: 15,
            long_press_min_ms: 80,
            long_press_max_ms: 140,
            super_long_min_ms: 600,
            super_long_max_ms: 1200,
            cancel_threshold_ms: 3000,
            charge_min_hold_ms: 150,
            charge_max_hold_ms: 900,
        }
    }
}

impl GestureSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn long_press_min(&self) -> Duration {
        Duration::from_millis(self.long_press_min_ms)
    }

    pub fn long_press_max(&self) -> Duration {
        Duration::from_millis(self.long_press_max_ms)
    }

    pub fn super_long_min(&self) -> Duration {
        Duration::from_millis(self.super_long_min_ms)
    }

    pub fn super_long_max(&self) -> Duration {
        Duration::from_millis(self.super_long_max_ms)
    }

    pub fn cancel_threshold(&self) -> Duration {
        Duration::from_millis(self.cancel_threshold_ms)
    }

    pub fn charge_min_hold(&self) -> Duration {
        Duration::from_millis(self.charge_min_hold_ms)
    }

    pub fn charge_max_hold(&self) -> Duration {
        Duration::from_millis(self.charge_max_hold_ms)
    }

    /// Check band ordering. Returns the list of complaints, empty when the
    /// settings are usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.long_press_min_ms > self.long_press_max_ms {
            problems.push("long_press_min_ms exceeds long_press_max_ms".to_string());
        }
        if self.super_long_min_ms <= self.long_press_max_ms {
            problems.push("super_long band overlaps long-press band".to_string());
        }
        if self.super_long_min_ms > self.super_long_max_ms {
            problems.push("super_long_min_ms exceeds super_long_max_ms".to_string());
        }
        if self.cancel_threshold_ms <= self.super_long_max_ms {
            problems.push("cancel_threshold_ms must exceed super_long_max_ms".to_string());
        }
        if self.charge_min_hold_ms >= self.charge_max_hold_ms {
            problems.push("charge_min_hold_ms must be below charge_max_hold_ms".to_string());
        }
        problems
    }

    /// Wrap in the shared handle the engine and all machines read from.
    pub fn into_shared(self) -> Arc<GestureSettings> {
        Arc::new(self)
    }
}
