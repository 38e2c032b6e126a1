//! Gesture detection: per-key press/release classification
//!
//! Raw press/release timestamps go in, at most one [`GestureEvent`] per
//! interaction comes out. The flow is:
//!
//! ```text
//! on_press/on_release → KeyMachine (per input) → EngineEvent
//!                         ↑ poll() when next_deadline() passes
//! ```
//!
//! Classification depends only on timing: tap count (up to 4) and where the
//! final hold fell among the long / super-long / cancel bands, or the charge
//! band under the charge profile.

mod engine;
mod event;
mod machine;

pub use engine::GestureEngine;
pub use event::{EngineEvent, GestureEvent, GestureKind, HoldTier};
