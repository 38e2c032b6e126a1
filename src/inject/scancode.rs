//! Logical key name → hardware scan code lookup
//!
//! Set-1 make codes, the representation both SendInput (with
//! `KEYEVENTF_SCANCODE`) and the Interception driver expect. Keys on the
//! extended block (right-side modifiers, nav cluster, arrows, numpad
//! enter/divide) carry the extended flag. Pure data; layouts that need a
//! different table swap this module out.

/// A hardware-level scan code plus the extended-key flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanCode {
    pub code: u16,
    pub extended: bool,
}

const fn plain(code: u16) -> ScanCode {
    ScanCode {
        code,
        extended: false,
    }
}

const fn ext(code: u16) -> ScanCode {
    ScanCode {
        code,
        extended: true,
    }
}

/// Resolve a logical key name (case-insensitive) to its scan code.
pub fn lookup(name: &str) -> Option<ScanCode> {
    let normalized = name.to_ascii_lowercase();
    let code = match normalized.as_str() {
        "esc" | "escape" => plain(0x01),
        "1" => plain(0x02),
        "2" => plain(0x03),
        "3" => plain(0x04),
        "4" => plain(0x05),
        "5" => plain(0x06),
        "6" => plain(0x07),
        "7" => plain(0x08),
        "8" => plain(0x09),
        "9" => plain(0x0A),
        "0" => plain(0x0B),
        "minus" | "-" => plain(0x0C),
        "equals" | "=" => plain(0x0D),
        "backspace" => plain(0x0E),
        "tab" => plain(0x0F),
        "q" => plain(0x10),
        "w" => plain(0x11),
        "e" => plain(0x12),
        "r" => plain(0x13),
        "t" => plain(0x14),
        "y" => plain(0x15),
        "u" => plain(0x16),
        "i" => plain(0x17),
        "o" => plain(0x18),
        "p" => plain(0x19),
        "lbracket" | "[" => plain(0x1A),
        "rbracket" | "]" => plain(0x1B),
        "enter" | "return" => plain(0x1C),
        "lctrl" | "ctrl" => plain(0x1D),
        "a" => plain(0x1E),
        "s" => plain(0x1F),
        "d" => plain(0x20),
        "f" => plain(0x21),
        "g" => plain(0x22),
        "h" => plain(0x23),
        "j" => plain(0x24),
        "k" => plain(0x25),
        "l" => plain(0x26),
        "semicolon" | ";" => plain(0x27),
        "apostrophe" | "'" => plain(0x28),
        "grave" | "`" => plain(0x29),
        "lshift" | "shift" => plain(0x2A),
        "backslash" | "\\" => plain(0x2B),
        "z" => plain(0x2C),
        "x" => plain(0x2D),
        "c" => plain(0x2E),
        "v" => plain(0x2F),
        "b" => plain(0x30),
        "n" => plain(0x31),
        "m" => plain(0x32),
        "comma" | "," => plain(0x33),
        "period" | "." => plain(0x34),
        "slash" | "/" => plain(0x35),
        "rshift" => plain(0x36),
        "numpad_multiply" => plain(0x37),
        "lalt" | "alt" => plain(0x38),
        "space" => plain(0x39),
        "capslock" => plain(0x3A),
        "f1" => plain(0x3B),
        "f2" => plain(0x3C),
        "f3" => plain(0x3D),
        "f4" => plain(0x3E),
        "f5" => plain(0x3F),
        "f6" => plain(0x40),
        "f7" => plain(0x41),
        "f8" => plain(0x42),
        "f9" => plain(0x43),
        "f10" => plain(0x44),
        "f11" => plain(0x57),
        "f12" => plain(0x58),
        "numlock" => plain(0x45),
        "scrolllock" => plain(0x46),
        "numpad7" => plain(0x47),
        "numpad8" => plain(0x48),
        "numpad9" => plain(0x49),
        "numpad_subtract" => plain(0x4A),
        "numpad4" => plain(0x4B),
        "numpad5" => plain(0x4C),
        "numpad6" => plain(0x4D),
        "numpad_add" => plain(0x4E),
        "numpad1" => plain(0x4F),
        "numpad2" => plain(0x50),
        "numpad3" => plain(0x51),
        "numpad0" => plain(0x52),
        "numpad_decimal" => plain(0x53),

        // Extended block
        "rctrl" => ext(0x1D),
        "ralt" => ext(0x38),
        "numpad_divide" => ext(0x35),
        "numpad_enter" => ext(0x1C),
        "home" => ext(0x47),
        "up" => ext(0x48),
        "pageup" => ext(0x49),
        "left" => ext(0x4B),
        "right" => ext(0x4D),
        "end" => ext(0x4F),
        "down" => ext(0x50),
        "pagedown" => ext(0x51),
        "insert" => ext(0x52),
        "delete" => ext(0x53),
        "lwin" => ext(0x5B),
        "rwin" => ext(0x5C),
        "apps" | "menu" => ext(0x5D),
        _ => return None,
    };
    Some(code)
}
