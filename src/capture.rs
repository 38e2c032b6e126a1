//! Raw input capture: low-level keyboard hook (Windows)
//!
//! Installs a `WH_KEYBOARD_LL` hook on a dedicated thread and forwards
//! press/release events into the agent's channel. The hook observes and
//! passes through; it never suppresses. Events stamped with our own
//! injection marker are dropped here so macro output can never feed back
//! into gesture detection.

use std::sync::mpsc::Sender;
use std::sync::OnceLock;
use std::time::Instant;

use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, VK_CONTROL, VK_MENU, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, SetWindowsHookExW, TranslateMessage,
    HHOOK, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN,
    WM_SYSKEYUP,
};

use crate::inject::INJECTED_MARKER;
use crate::input::{ModifierContext, PhysicalInput};
use crate::runtime::RawInputEvent;

static EVENT_TX: OnceLock<Sender<RawInputEvent>> = OnceLock::new();

/// Spawn the hook thread. The returned handle lives for the process; the
/// hook is torn down when the process exits.
pub fn spawn(tx: Sender<RawInputEvent>) -> std::thread::JoinHandle<()> {
    EVENT_TX
        .set(tx)
        .unwrap_or_else(|_| panic!("capture hook installed twice"));

    std::thread::Builder::new()
        .name("keyecho-capture".to_string())
        .spawn(|| {
            let hook = unsafe {
                SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), HINSTANCE::default(), 0)
            };
            let _hook: HHOOK = match hook {
                Ok(h) => h,
                Err(e) => {
                    tracing::error!(error = %e, "failed to install keyboard hook");
                    return;
                }
            };
            tracing::info!("keyboard hook installed");

            // LL hooks are serviced through this thread's message loop.
            let mut msg = MSG::default();
            unsafe {
                while GetMessageW(&mut msg, None, 0, 0).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        })
        .unwrap_or_else(|e| panic!("failed to spawn capture thread: {}", e))
}

unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let kbd = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        if kbd.dwExtraInfo != INJECTED_MARKER {
            let pressed = matches!(wparam.0 as u32, WM_KEYDOWN | WM_SYSKEYDOWN);
            let released = matches!(wparam.0 as u32, WM_KEYUP | WM_SYSKEYUP);
            if pressed || released {
                if let Some(name) = vk_to_name(kbd.vkCode) {
                    let input = PhysicalInput::new(name, current_context());
                    let at = Instant::now();
                    let event = if pressed {
                        RawInputEvent::Press { input, at }
                    } else {
                        RawInputEvent::Release { input, at }
                    };
                    if let Some(tx) = EVENT_TX.get() {
                        // A closed channel means the agent is shutting
                        // down; nothing useful to do with the error.
                        let _ = tx.send(event);
                    }
                }
            }
        }
    }
    CallNextHookEx(HHOOK::default(), code, wparam, lparam)
}

fn key_down(vk: windows::Win32::UI::Input::KeyboardAndMouse::VIRTUAL_KEY) -> bool {
    (unsafe { GetAsyncKeyState(vk.0 as i32) } as u16) & 0x8000 != 0
}

/// Modifier context at event time. One context per event; ctrl wins over
/// shift wins over alt when several are held.
fn current_context() -> ModifierContext {
    if key_down(VK_CONTROL) {
        ModifierContext::Ctrl
    } else if key_down(VK_SHIFT) {
        ModifierContext::Shift
    } else if key_down(VK_MENU) {
        ModifierContext::Alt
    } else {
        ModifierContext::Normal
    }
}

/// Virtual-key → logical key name, for the keys the engine can bind.
fn vk_to_name(vk: u32) -> Option<&'static str> {
    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    const LETTERS: [&str; 26] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
        "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    const FKEYS: [&str; 12] = [
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    ];
    const NUMPAD: [&str; 10] = [
        "numpad0", "numpad1", "numpad2", "numpad3", "numpad4", "numpad5", "numpad6", "numpad7",
        "numpad8", "numpad9",
    ];

    match vk {
        0x30..=0x39 => Some(DIGITS[(vk - 0x30) as usize]),
        0x41..=0x5A => Some(LETTERS[(vk - 0x41) as usize]),
        0x70..=0x7B => Some(FKEYS[(vk - 0x70) as usize]),
        0x60..=0x69 => Some(NUMPAD[(vk - 0x60) as usize]),
        0x20 => Some("space"),
        0x0D => Some("enter"),
        0x09 => Some("tab"),
        0x08 => Some("backspace"),
        0x1B => Some("escape"),
        0x25 => Some("left"),
        0x26 => Some("up"),
        0x27 => Some("right"),
        0x28 => Some("down"),
        0x21 => Some("pageup"),
        0x22 => Some("pagedown"),
        0x23 => Some("end"),
        0x24 => Some("home"),
        0x2D => Some("insert"),
        0x2E => Some("delete"),
        0x6A => Some("numpad_multiply"),
        0x6B => Some("numpad_add"),
        0x6D => Some("numpad_subtract"),
        0x6E => Some("numpad_decimal"),
        0x6F => Some("numpad_divide"),
        _ => None,
    }
}
