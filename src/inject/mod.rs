//! Synthetic keystroke injection
//!
//! Every backend implements the same narrow contract: `send_key` performs a
//! full down → brief hold → up transition for one logical key, and
//! `is_available` probes usability without side effects. The selector walks
//! the preference order (driver-mediated, then SendInput, then no-op) and
//! always produces *something*: a probe failure is logged and absorbed,
//! never propagated.

mod scancode;

#[cfg(windows)]
mod interception;
#[cfg(windows)]
mod send_input;

use std::fmt;
use std::time::Duration;

#[cfg(windows)]
pub use interception::InterceptionBackend;
pub use scancode::{lookup as lookup_scancode, ScanCode};
#[cfg(windows)]
pub use send_input::SendInputBackend;

/// How long a synthetic key is held between its down and up transitions.
pub(crate) const KEY_HOLD: Duration = Duration::from_millis(12);

/// `dwExtraInfo` marker stamped on every event we inject, so the capture
/// hook can tell our own output apart from real hardware and never feed a
/// macro back into gesture detection.
pub const INJECTED_MARKER: usize = 0x4B45;

/// Injection failure. `UnknownKey` means the scan-code table has no entry;
/// `SendFailed` means the OS/driver rejected the event mid-sequence.
#[derive(Debug)]
pub enum InjectError {
    UnknownKey(String),
    SendFailed { key: String, reason: String },
}

impl fmt::Display for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectError::UnknownKey(key) => write!(f, "no scan code for key \"{}\"", key),
            InjectError::SendFailed { key, reason } => {
                write!(f, "failed to send key \"{}\": {}", key, reason)
            }
        }
    }
}

impl std::error::Error for InjectError {}

/// A mechanism for delivering one synthetic keystroke to the OS.
pub trait InjectionBackend: Send {
    fn name(&self) -> &'static str;

    /// Probe whether this backend can run here, without side effects.
    fn is_available(&self) -> bool;

    /// Full down → hold → up for a logical key name.
    fn send_key(&mut self, key: &str) -> Result<(), InjectError>;
}

/// Validates and logs intent without emitting any real input. Always
/// available; the selector's floor and the test suite's default.
#[derive(Debug, Default)]
pub struct NullBackend {
    sent: u64,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keystrokes accepted so far.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }
}

impl InjectionBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn send_key(&mut self, key: &str) -> Result<(), InjectError> {
        let code = scancode::lookup(key).ok_or_else(|| InjectError::UnknownKey(key.to_string()))?;
        self.sent += 1;
        tracing::debug!(key, code = code.code, extended = code.extended, "null backend: would send");
        Ok(())
    }
}

/// Which backend to construct, for the `--backend` CLI override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Interception,
    SendInput,
    Null,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Interception => write!(f, "interception"),
            BackendKind::SendInput => write!(f, "sendinput"),
            BackendKind::Null => write!(f, "null"),
        }
    }
}

/// Pick the best usable backend, honoring an explicit override.
///
/// Preference order: Interception driver (indistinguishable from hardware,
/// but needs the separately-installed driver), SendInput (works everywhere
/// on Windows, declares itself synthetic), null. Probe failures fall
/// through silently; this function cannot fail.
pub fn select_backend(force: Option<BackendKind>) -> Box<dyn InjectionBackend> {
    if let Some(kind) = force {
        if let Some(backend) = construct(kind) {
            tracing::info!(backend = %kind, "backend forced via CLI");
            return backend;
        }
        tracing::warn!(backend = %kind, "forced backend unavailable, falling back to null");
        return Box::new(NullBackend::new());
    }

    for kind in [
        BackendKind::Interception,
        BackendKind::SendInput,
        BackendKind::Null,
    ] {
        if let Some(backend) = construct(kind) {
            tracing::info!(backend = backend.name(), "injection backend selected");
            return backend;
        }
        tracing::debug!(backend = %kind, "backend unavailable, trying next");
    }

    // The null backend always constructs; this line is unreachable but
    // keeps the compiler honest.
    Box::new(NullBackend::new())
}

#[cfg(windows)]
fn construct(kind: BackendKind) -> Option<Box<dyn InjectionBackend>> {
    match kind {
        BackendKind::Interception => {
            InterceptionBackend::probe().map(|b| Box::new(b) as Box<dyn InjectionBackend>)
        }
        BackendKind::SendInput => {
            let backend = SendInputBackend::new();
            backend
                .is_available()
                .then(|| Box::new(backend) as Box<dyn InjectionBackend>)
        }
        BackendKind::Null => Some(Box::new(NullBackend::new())),
    }
}

/// Only the no-op backend exists off Windows; real capture/injection lives
/// behind the platform boundary.
#[cfg(not(windows))]
fn construct(kind: BackendKind) -> Option<Box<dyn InjectionBackend>> {
    match kind {
        BackendKind::Null => Some(Box::new(NullBackend::new())),
        _ => None,
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interception" | "driver" => Ok(BackendKind::Interception),
            "sendinput" | "send-input" => Ok(BackendKind::SendInput),
            "null" | "none" => Ok(BackendKind::Null),
            other => Err(format!("unknown backend \"{}\"", other)),
        }
    }
}
