//! High-level injection via `SendInput`
//!
//! Always available on Windows and needs no privileges, but events carry
//! the injected flag (`LLKHF_INJECTED`), so software that checks for it can
//! tell the output is synthetic. Scan codes are sent with
//! `KEYEVENTF_SCANCODE` rather than virtual keys so the active layout
//! cannot remap them.

use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP,
    KEYEVENTF_SCANCODE, VIRTUAL_KEY,
};

use super::scancode::{self, ScanCode};
use super::{InjectError, InjectionBackend, INJECTED_MARKER, KEY_HOLD};

pub struct SendInputBackend;

impl SendInputBackend {
    pub fn new() -> Self {
        SendInputBackend
    }

    fn send_transition(&self, key: &str, code: ScanCode, up: bool) -> Result<(), InjectError> {
        let mut flags = KEYEVENTF_SCANCODE;
        if code.extended {
            flags |= KEYEVENTF_EXTENDEDKEY;
        }
        if up {
            flags |= KEYEVENTF_KEYUP;
        }

        let input = INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(0),
                    wScan: code.code,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: INJECTED_MARKER,
                },
            },
        };

        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent == 0 {
            return Err(InjectError::SendFailed {
                key: key.to_string(),
                reason: "SendInput returned 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SendInputBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectionBackend for SendInputBackend {
    fn name(&self) -> &'static str {
        "sendinput"
    }

    fn is_available(&self) -> bool {
        // SendInput is part of user32; if we're running, it's there.
        true
    }

    fn send_key(&mut self, key: &str) -> Result<(), InjectError> {
        let code =
            scancode::lookup(key).ok_or_else(|| InjectError::UnknownKey(key.to_string()))?;

        self.send_transition(key, code, false)?;
        std::thread::sleep(KEY_HOLD);
        self.send_transition(key, code, true)?;

        tracing::trace!(key, code = code.code, "sendinput: key sent");
        Ok(())
    }
}
