//! The real backend, talking to the Win32 console and input APIs.

mod windows_sys;

use std::{
    ffi::OsStr,
    io::{self, BufRead},
    mem,
    process::Child,
};

use self::windows_sys::{
    AllocConsole, FreeConsole, GetConsoleMode, GetFileType, GetLastError, GetStdHandle,
    PeekConsoleInputW, ReadConsoleInputW, SendInput, SetLastError, SetStdHandle, FILE_TYPE_CHAR,
    HANDLE, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_RECORD, KEYBDINPUT, KEY_EVENT, STD_ERROR_HANDLE,
    STD_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use crate::{
    console::{ConsoleHost, Handle, StdStream},
    input::{Injection, KeyInput},
    key::{ConsoleKeyEvent, KeyInfo},
    launch, Error,
};

fn std_id(stream: StdStream) -> STD_HANDLE {
    match stream {
        StdStream::Input => STD_INPUT_HANDLE,
        StdStream::Output => STD_OUTPUT_HANDLE,
        StdStream::Error => STD_ERROR_HANDLE,
    }
}

fn key_event(record: &INPUT_RECORD) -> Option<ConsoleKeyEvent> {
    if record.EventType != KEY_EVENT {
        return None;
    }
    // SAFETY: EventType says the union holds a key event.
    let k = unsafe { record.Event.KeyEvent };
    Some(ConsoleKeyEvent {
        key_down: k.bKeyDown != 0,
        vk: k.wVirtualKeyCode,
        char_code: unsafe { k.uChar.UnicodeChar },
        control_state: k.dwControlKeyState,
    })
}

fn is_read_key(record: &INPUT_RECORD) -> bool {
    key_event(record).map_or(false, |k| k.is_read_key_event())
}

/// [`ConsoleHost`] over the process's real console and standard handles.
///
/// Standard handles are looked up on every call, so the host always sees
/// the current bindings, including those installed by a reallocation.
#[derive(Debug, Default)]
pub struct WindowsHost {
    _priv: (),
}

impl WindowsHost {
    /// A host for the current process.
    pub fn new() -> WindowsHost {
        WindowsHost { _priv: () }
    }

    fn input() -> HANDLE {
        unsafe { GetStdHandle(STD_INPUT_HANDLE) }
    }

    /// Look at the head of the input buffer without consuming it.
    fn peek(input: HANDLE) -> io::Result<Option<INPUT_RECORD>> {
        // SAFETY: INPUT_RECORD is plain data; all-zero is a valid value.
        let mut record: INPUT_RECORD = unsafe { mem::zeroed() };
        let mut read = 0;
        if unsafe { PeekConsoleInputW(input, &mut record, 1, &mut read) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(if read == 0 { None } else { Some(record) })
    }

    /// Consume one record, blocking until there is one.
    fn read(input: HANDLE) -> io::Result<INPUT_RECORD> {
        // SAFETY: as in `peek`.
        let mut record: INPUT_RECORD = unsafe { mem::zeroed() };
        let mut read = 0;
        if unsafe { ReadConsoleInputW(input, &mut record, 1, &mut read) } == 0 || read == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(record)
    }
}

impl ConsoleHost for WindowsHost {
    type Process = Child;

    fn is_redirected(&mut self, stream: StdStream) -> bool {
        let handle = unsafe { GetStdHandle(std_id(stream)) };
        // Anything but a character device is redirected. A character device
        // that isn't a console (NUL, a serial port) is too.
        if unsafe { GetFileType(handle) } & FILE_TYPE_CHAR != FILE_TYPE_CHAR {
            return true;
        }
        let mut mode = 0;
        unsafe { GetConsoleMode(handle, &mut mode) == 0 }
    }

    fn detach_console(&mut self) -> bool {
        unsafe { FreeConsole() != 0 }
    }

    fn allocate_console(&mut self) -> bool {
        unsafe { AllocConsole() != 0 }
    }

    fn std_handle(&mut self, stream: StdStream) -> Handle {
        Handle(unsafe { GetStdHandle(std_id(stream)) } as isize)
    }

    fn set_std_handle(&mut self, stream: StdStream, handle: Handle) {
        if unsafe { SetStdHandle(std_id(stream), handle.0 as HANDLE) } == 0 {
            tracing::warn!(
                ?stream,
                ?handle,
                "SetStdHandle failed: {}",
                io::Error::last_os_error()
            );
        }
    }

    fn inject(&mut self, events: &[KeyInput]) -> Injection {
        let inputs: Vec<INPUT> = events
            .iter()
            .map(|e| INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: e.vk,
                        wScan: e.scan,
                        dwFlags: e.flags.bits(),
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            })
            .collect();

        // SendInput reports success for anything but bad arguments, so the
        // last error is the real signal. Clear it first so it belongs to
        // this call alone.
        unsafe {
            SetLastError(0);
            let sent = SendInput(
                inputs.len() as u32,
                inputs.as_ptr(),
                mem::size_of::<INPUT>() as i32,
            );
            Injection {
                sent,
                last_error: GetLastError(),
            }
        }
    }

    fn key_available(&mut self) -> bool {
        let input = Self::input();
        loop {
            let record = match Self::peek(input) {
                Ok(Some(record)) => record,
                Ok(None) => return false,
                Err(e) => {
                    tracing::debug!("PeekConsoleInput failed: {}", e);
                    return false;
                }
            };
            if is_read_key(&record) {
                return true;
            }
            // Not something a key read would return; drop it so the next
            // record comes to the head.
            if let Err(e) = Self::read(input) {
                tracing::debug!("ReadConsoleInput failed: {}", e);
                return false;
            }
        }
    }

    fn read_key_intercepted(&mut self) -> io::Result<KeyInfo> {
        let input = Self::input();
        loop {
            let record = Self::read(input)?;
            if let Some(event) = key_event(&record).filter(ConsoleKeyEvent::is_read_key_event) {
                return Ok(event.to_key_info());
            }
        }
    }

    fn read_line(&mut self) -> io::Result<()> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(drop)
    }

    fn spawn(&mut self, program: &OsStr, arg: &OsStr) -> Result<Child, Error> {
        launch::spawn(program, arg)
    }

    fn wait(&mut self, mut process: Child) -> Result<(), Error> {
        launch::wait_on_child(&mut process).map(drop)
    }
}
