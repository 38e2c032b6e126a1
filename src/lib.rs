//! keyecho - gesture-triggered key macros
//!
//! This crate turns raw press/release events on physical inputs into
//! classified gestures (tap counts and hold tiers under tight timing
//! windows) and plays back the bound macro sequences as precisely-timed,
//! jittered synthetic keystrokes, one independent FIFO queue per key.

pub mod binding;
#[cfg(windows)]
pub mod capture;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod gesture;
pub mod inject;
pub mod input;
pub mod profile;
pub mod runtime;
pub mod scheduler;
pub mod settings;
pub mod tracing;

// Re-export commonly used types
pub use binding::{MacroBinding, SequenceStep};
pub use gesture::{GestureEngine, GestureEvent, GestureKind};
pub use input::PhysicalInput;
pub use profile::MacroProfile;
pub use runtime::Agent;
pub use scheduler::MacroScheduler;
pub use settings::GestureSettings;
