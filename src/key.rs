//! Keys as read back from the console input buffer.

use std::fmt;

use bitflags::bitflags;

/// A virtual key code as reported by a console read.
///
/// Displays with the console key name where one exists (`NumPad1`, `A`, `D0`,
/// `Enter`, ...) and as a decimal number otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Shift.
    pub const SHIFT: KeyCode = KeyCode(0x10);
    /// Control.
    pub const CONTROL: KeyCode = KeyCode(0x11);
    /// Alt.
    pub const ALT: KeyCode = KeyCode(0x12);
    /// Caps lock.
    pub const CAPS_LOCK: KeyCode = KeyCode(0x14);
    /// Num lock.
    pub const NUM_LOCK: KeyCode = KeyCode(0x90);
    /// Scroll lock.
    pub const SCROLL_LOCK: KeyCode = KeyCode(0x91);
    /// Keypad `0`.
    pub const NUMPAD0: KeyCode = KeyCode(0x60);
    /// Keypad `1`.
    pub const NUMPAD1: KeyCode = KeyCode(0x61);
    /// Keypad `9`.
    pub const NUMPAD9: KeyCode = KeyCode(0x69);

    fn name(self) -> Option<String> {
        let name = match self.0 {
            0x08 => "Backspace",
            0x09 => "Tab",
            0x0c => "Clear",
            0x0d => "Enter",
            0x13 => "Pause",
            0x1b => "Escape",
            0x20 => "Spacebar",
            0x21 => "PageUp",
            0x22 => "PageDown",
            0x23 => "End",
            0x24 => "Home",
            0x25 => "LeftArrow",
            0x26 => "UpArrow",
            0x27 => "RightArrow",
            0x28 => "DownArrow",
            0x29 => "Select",
            0x2a => "Print",
            0x2b => "Execute",
            0x2c => "PrintScreen",
            0x2d => "Insert",
            0x2e => "Delete",
            0x2f => "Help",
            0x5b => "LeftWindows",
            0x5c => "RightWindows",
            0x5d => "Applications",
            0x5f => "Sleep",
            0x6a => "Multiply",
            0x6b => "Add",
            0x6c => "Separator",
            0x6d => "Subtract",
            0x6e => "Decimal",
            0x6f => "Divide",
            0xa6 => "BrowserBack",
            0xa7 => "BrowserForward",
            0xa8 => "BrowserRefresh",
            0xa9 => "BrowserStop",
            0xaa => "BrowserSearch",
            0xab => "BrowserFavorites",
            0xac => "BrowserHome",
            0xad => "VolumeMute",
            0xae => "VolumeDown",
            0xaf => "VolumeUp",
            0xb0 => "MediaNext",
            0xb1 => "MediaPrevious",
            0xb2 => "MediaStop",
            0xb3 => "MediaPlay",
            0xb4 => "LaunchMail",
            0xb5 => "LaunchMediaSelect",
            0xb6 => "LaunchApp1",
            0xb7 => "LaunchApp2",
            0xba => "Oem1",
            0xbb => "OemPlus",
            0xbc => "OemComma",
            0xbd => "OemMinus",
            0xbe => "OemPeriod",
            0xbf => "Oem2",
            0xc0 => "Oem3",
            0xdb => "Oem4",
            0xdc => "Oem5",
            0xdd => "Oem6",
            0xde => "Oem7",
            0xdf => "Oem8",
            0xe2 => "Oem102",
            0xe5 => "Process",
            0xe7 => "Packet",
            0xf6 => "Attention",
            0xf7 => "CrSel",
            0xf8 => "ExSel",
            0xf9 => "EraseEndOfFile",
            0xfa => "Play",
            0xfb => "Zoom",
            0xfc => "NoName",
            0xfd => "Pa1",
            0xfe => "OemClear",
            vk @ 0x30..=0x39 => return Some(format!("D{}", vk - 0x30)),
            vk @ 0x41..=0x5a => return Some(char::from(vk as u8).to_string()),
            vk @ 0x60..=0x69 => return Some(format!("NumPad{}", vk - 0x60)),
            vk @ 0x70..=0x87 => return Some(format!("F{}", vk - 0x6f)),
            _ => return None,
        };
        Some(name.to_string())
    }

    /// Keys on the numeric keypad that take part in Alt+numpad character
    /// composition when not flagged as enhanced.
    fn is_numpad(self, enhanced: bool) -> bool {
        if (KeyCode::NUMPAD0.0..=KeyCode::NUMPAD9.0).contains(&self.0) {
            return true;
        }
        !enhanced
            && matches!(
                self.0,
                0x0c | 0x21 | 0x22 | 0x23 | 0x24 | 0x25 | 0x26 | 0x27 | 0x28 | 0x2d
            )
    }

    fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::SHIFT
                | KeyCode::CONTROL
                | KeyCode::ALT
                | KeyCode::CAPS_LOCK
                | KeyCode::NUM_LOCK
                | KeyCode::SCROLL_LOCK
        )
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "{}", self.0),
        }
    }
}

bitflags! {
    /// Modifier keys active when a key was read.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Either Alt key.
        const ALT = 0b001;
        /// Either Shift key.
        const SHIFT = 0b010;
        /// Either Control key.
        const CONTROL = 0b100;
    }
}

impl Modifiers {
    /// Modifiers from a console control-key state bit mask.
    pub fn from_control_state(state: u32) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        if state & (control_state::LEFT_ALT | control_state::RIGHT_ALT) != 0 {
            modifiers |= Modifiers::ALT;
        }
        if state & control_state::SHIFT != 0 {
            modifiers |= Modifiers::SHIFT;
        }
        if state & (control_state::LEFT_CTRL | control_state::RIGHT_CTRL) != 0 {
            modifiers |= Modifiers::CONTROL;
        }
        modifiers
    }
}

impl fmt::Display for Modifiers {
    /// `Alt, Shift, Control` style, or `0` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }
        let names = [
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::CONTROL, "Control"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Bits of the console control-key state.
pub mod control_state {
    /// Right Alt is held.
    pub const RIGHT_ALT: u32 = 0x0001;
    /// Left Alt is held.
    pub const LEFT_ALT: u32 = 0x0002;
    /// Right Control is held.
    pub const RIGHT_CTRL: u32 = 0x0004;
    /// Left Control is held.
    pub const LEFT_CTRL: u32 = 0x0008;
    /// Either Shift is held.
    pub const SHIFT: u32 = 0x0010;
    /// The key is an enhanced (extended) key.
    pub const ENHANCED_KEY: u32 = 0x0100;
}

/// One key read from the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInfo {
    /// Which key.
    pub key: KeyCode,
    /// Modifiers active at the time.
    pub modifiers: Modifiers,
    /// The UTF-16 code unit the key produced, `0` if none.
    pub char_code: u16,
}

/// A raw key event record from the console input buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsoleKeyEvent {
    /// `true` for a press, `false` for a release.
    pub key_down: bool,
    /// Virtual key code.
    pub vk: u16,
    /// UTF-16 code unit, `0` if none.
    pub char_code: u16,
    /// Control-key state bit mask, see [`control_state`].
    pub control_state: u32,
}

impl ConsoleKeyEvent {
    /// Whether a console read should hand this event out as a key.
    ///
    /// Releases are skipped except for the Alt release that completes an
    /// Alt+numpad composition. Presses of bare modifier and lock keys are
    /// skipped, as are numpad presses while Alt (without Control) is held,
    /// since those are still part of a composition.
    pub fn is_read_key_event(&self) -> bool {
        let key = KeyCode(self.vk);
        if !self.key_down {
            return key == KeyCode::ALT && self.char_code != 0;
        }
        if key.is_modifier() {
            return false;
        }
        let enhanced = self.control_state & control_state::ENHANCED_KEY != 0;
        let alt = self.control_state & (control_state::LEFT_ALT | control_state::RIGHT_ALT) != 0;
        let ctrl = self.control_state & (control_state::LEFT_CTRL | control_state::RIGHT_CTRL) != 0;
        !(alt && !ctrl && key.is_numpad(enhanced))
    }

    /// The key a console read reports for this event.
    pub fn to_key_info(&self) -> KeyInfo {
        KeyInfo {
            key: KeyCode(self.vk),
            modifiers: Modifiers::from_control_state(self.control_state),
            char_code: self.char_code,
        }
    }
}
