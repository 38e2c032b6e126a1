//! Driver-mediated injection via the Interception driver
//!
//! Strokes sent through the driver are indistinguishable from a physical
//! keyboard, but the driver is a separately-installed, privileged
//! component. `interception.dll` is loaded dynamically at probe time so a
//! machine without it simply reports unavailable instead of failing to
//! start.

use std::ffi::c_void;
use std::time::Instant;

use windows::core::{s, w};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};

use super::scancode::{self, ScanCode};
use super::{InjectError, InjectionBackend, KEY_HOLD};

// Wire format of the driver's keyboard stroke.
#[repr(C)]
struct KeyStroke {
    code: u16,
    state: u16,
    information: u32,
}

const KEY_DOWN: u16 = 0x00;
const KEY_UP: u16 = 0x01;
const KEY_E0: u16 = 0x02;

/// Device id of the first keyboard in the driver's device table.
const KEYBOARD_DEVICE: i32 = 1;

type CreateContextFn = unsafe extern "C" fn() -> *mut c_void;
type DestroyContextFn = unsafe extern "C" fn(*mut c_void);
type SendFn = unsafe extern "C" fn(*mut c_void, i32, *const KeyStroke, u32) -> i32;

struct DriverApi {
    create_context: CreateContextFn,
    destroy_context: DestroyContextFn,
    send: SendFn,
}

impl DriverApi {
    /// Load `interception.dll` and resolve the three entry points we use.
    fn load() -> Option<DriverApi> {
        let module: HMODULE = unsafe { LoadLibraryW(w!("interception.dll")) }.ok()?;

        unsafe {
            let create = GetProcAddress(module, s!("interception_create_context"))?;
            let destroy = GetProcAddress(module, s!("interception_destroy_context"))?;
            let send = GetProcAddress(module, s!("interception_send"))?;

            Some(DriverApi {
                create_context: std::mem::transmute::<_, CreateContextFn>(create),
                destroy_context: std::mem::transmute::<_, DestroyContextFn>(destroy),
                send: std::mem::transmute::<_, SendFn>(send),
            })
        }
    }
}

pub struct InterceptionBackend {
    api: DriverApi,
    context: *mut c_void,
}

// The context is only ever used from the scheduler's thread; Send is needed
// to move the constructed backend there.
unsafe impl Send for InterceptionBackend {}

impl InterceptionBackend {
    /// Load the DLL and open a driver context. `None` when the driver is
    /// not installed or the context cannot be created.
    pub fn probe() -> Option<Self> {
        let api = DriverApi::load()?;
        let context = unsafe { (api.create_context)() };
        if context.is_null() {
            tracing::debug!("interception.dll present but context creation failed");
            return None;
        }
        Some(Self { api, context })
    }

    fn send_transition(&self, key: &str, code: ScanCode, up: bool) -> Result<(), InjectError> {
        let mut state = if up { KEY_UP } else { KEY_DOWN };
        if code.extended {
            state |= KEY_E0;
        }
        let stroke = KeyStroke {
            code: code.code,
            state,
            information: 0,
        };
        let sent = unsafe { (self.api.send)(self.context, KEYBOARD_DEVICE, &stroke, 1) };
        if sent != 1 {
            return Err(InjectError::SendFailed {
                key: key.to_string(),
                reason: format!("interception_send returned {}", sent),
            });
        }
        Ok(())
    }
}

impl Drop for InterceptionBackend {
    fn drop(&mut self) {
        unsafe { (self.api.destroy_context)(self.context) };
    }
}

impl InjectionBackend for InterceptionBackend {
    fn name(&self) -> &'static str {
        "interception"
    }

    fn is_available(&self) -> bool {
        !self.context.is_null()
    }

    fn send_key(&mut self, key: &str) -> Result<(), InjectError> {
        let code =
            scancode::lookup(key).ok_or_else(|| InjectError::UnknownKey(key.to_string()))?;

        self.send_transition(key, code, false)?;
        spin_hold();
        self.send_transition(key, code, true)?;

        tracing::trace!(key, code = code.code, "interception: key sent");
        Ok(())
    }
}

/// Bounded busy-wait for the down→up hold. The driver path exists for
/// sub-millisecond precision that a scheduler sleep cannot give; the spin
/// is capped by `KEY_HOLD` (≤15ms) so it can never run away.
fn spin_hold() {
    let start = Instant::now();
    while start.elapsed() < KEY_HOLD {
        std::hint::spin_loop();
    }
}
