//! Synthetic keyboard input: the event records handed to the system input
//! queue and the key chord they are built from.

use bitflags::bitflags;

bitflags! {
    /// Flags carried by a synthetic keyboard event.
    ///
    /// Values match the `KEYEVENTF_*` constants of the system input queue.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct InputFlags: u32 {
        /// The scan code is preceded by the 0xE0 prefix byte.
        const EXTENDED_KEY = 0x0001;
        /// The key is being released.
        const KEY_UP = 0x0002;
        /// The scan code field carries a UTF-16 code unit.
        const UNICODE = 0x0004;
        /// The virtual key code is ignored in favour of the scan code.
        const SCAN_CODE = 0x0008;
    }
}

/// A physical key, as a virtual key code and hardware scan code pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    /// Virtual key code.
    pub vk: u16,
    /// Hardware scan code.
    pub scan: u16,
}

impl Key {
    /// The (left) Alt key.
    pub const ALT: Key = Key::new(0x12, 0x38);
    /// The Shift key.
    pub const SHIFT: Key = Key::new(0x10, 0x2a);
    /// The Control key.
    pub const CONTROL: Key = Key::new(0x11, 0x1d);
    /// The `1` key on the numeric keypad.
    pub const NUMPAD1: Key = Key::new(0x61, 0x4f);

    /// A key from its virtual key code and scan code.
    pub const fn new(vk: u16, scan: u16) -> Key {
        Key { vk, scan }
    }

    fn event(self, flags: InputFlags) -> KeyInput {
        KeyInput {
            vk: self.vk,
            scan: self.scan,
            flags,
        }
    }
}

/// One keyboard event record for the system input queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    /// Virtual key code.
    pub vk: u16,
    /// Hardware scan code.
    pub scan: u16,
    /// Event flags.
    pub flags: InputFlags,
}

impl KeyInput {
    /// Whether this event releases its key.
    pub fn is_release(&self) -> bool {
        self.flags.contains(InputFlags::KEY_UP)
    }
}

/// A modifier held down while another key is pressed and released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyChord {
    /// The key held for the duration of the chord.
    pub modifier: Key,
    /// The key pressed and released while the modifier is held.
    pub key: Key,
}

impl KeyChord {
    /// A chord of `modifier` held around `key`.
    pub const fn new(modifier: Key, key: Key) -> KeyChord {
        KeyChord { modifier, key }
    }

    /// The four events of the chord: modifier down, key down, key up,
    /// modifier up.
    pub fn events(&self) -> [KeyInput; 4] {
        [
            self.modifier.event(InputFlags::empty()),
            self.key.event(InputFlags::empty()),
            self.key.event(InputFlags::KEY_UP),
            self.modifier.event(InputFlags::KEY_UP),
        ]
    }
}

impl Default for KeyChord {
    /// Alt + NumPad1.
    fn default() -> KeyChord {
        KeyChord::new(Key::ALT, Key::NUMPAD1)
    }
}

/// What the system input queue said about a submitted batch.
///
/// The count alone is not a success indicator; the last-error code has to be
/// looked at as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Injection {
    /// Number of events the queue accepted.
    pub sent: u32,
    /// The thread's last-error code right after the call.
    pub last_error: u32,
}
