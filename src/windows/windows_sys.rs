// Hand-maintained bindings for the handful of kernel32/user32 console and
// input APIs the host backend uses. Layouts follow the Win32 headers.

#![allow(dead_code, non_camel_case_types, non_snake_case, clippy::upper_case_acronyms)]

use core::ffi::c_void;

pub type BOOL = i32;
pub type HANDLE = *mut c_void;
pub type STD_HANDLE = u32;
pub type WIN32_ERROR = u32;

pub const STD_INPUT_HANDLE: STD_HANDLE = 4294967286u32;
pub const STD_OUTPUT_HANDLE: STD_HANDLE = 4294967285u32;
pub const STD_ERROR_HANDLE: STD_HANDLE = 4294967284u32;

pub const FILE_TYPE_CHAR: u32 = 2u32;

pub const INPUT_KEYBOARD: u32 = 1u32;
pub const KEY_EVENT: u16 = 1u16;

#[link(name = "kernel32")]
extern "system" {
    pub fn AllocConsole() -> BOOL;
    pub fn FreeConsole() -> BOOL;
    pub fn GetStdHandle(nstdhandle: STD_HANDLE) -> HANDLE;
    pub fn SetStdHandle(nstdhandle: STD_HANDLE, hhandle: HANDLE) -> BOOL;
    pub fn GetFileType(hfile: HANDLE) -> u32;
    pub fn GetConsoleMode(hconsolehandle: HANDLE, lpmode: *mut u32) -> BOOL;
    pub fn PeekConsoleInputW(
        hconsoleinput: HANDLE,
        lpbuffer: *mut INPUT_RECORD,
        nlength: u32,
        lpnumberofeventsread: *mut u32,
    ) -> BOOL;
    pub fn ReadConsoleInputW(
        hconsoleinput: HANDLE,
        lpbuffer: *mut INPUT_RECORD,
        nlength: u32,
        lpnumberofeventsread: *mut u32,
    ) -> BOOL;
    pub fn GetLastError() -> WIN32_ERROR;
    pub fn SetLastError(dwerrcode: WIN32_ERROR);
}

#[link(name = "user32")]
extern "system" {
    pub fn SendInput(cinputs: u32, pinputs: *const INPUT, cbsize: i32) -> u32;
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct INPUT {
    pub r#type: u32,
    pub Anonymous: INPUT_0,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union INPUT_0 {
    pub mi: MOUSEINPUT,
    pub ki: KEYBDINPUT,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct MOUSEINPUT {
    pub dx: i32,
    pub dy: i32,
    pub mouseData: u32,
    pub dwFlags: u32,
    pub time: u32,
    pub dwExtraInfo: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct KEYBDINPUT {
    pub wVk: u16,
    pub wScan: u16,
    pub dwFlags: u32,
    pub time: u32,
    pub dwExtraInfo: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct INPUT_RECORD {
    pub EventType: u16,
    pub Event: INPUT_RECORD_0,
}

// Only key events are inspected; the padding keeps the union as large as the
// biggest event record.
#[repr(C)]
#[derive(Clone, Copy)]
pub union INPUT_RECORD_0 {
    pub KeyEvent: KEY_EVENT_RECORD,
    pub Raw: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct KEY_EVENT_RECORD {
    pub bKeyDown: BOOL,
    pub wRepeatCount: u16,
    pub wVirtualKeyCode: u16,
    pub wVirtualScanCode: u16,
    pub uChar: KEY_EVENT_RECORD_0,
    pub dwControlKeyState: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union KEY_EVENT_RECORD_0 {
    pub UnicodeChar: u16,
    pub AsciiChar: i8,
}
