//! Deterministic stand-ins for the console backend and the clock.
//!
//! [`FakeConsole`] models just enough of the console to exercise the probe:
//! three standard handle slots, an allocation that rebinds all of them, an
//! input queue that becomes readable after a scripted number of checks, and a
//! log of every call made against it.

use std::cell::Cell;
use std::ffi::{OsStr, OsString};
use std::io;
use std::time::Duration;

use crate::console::{ConsoleHost, Handle, StdStream};
use crate::input::{Injection, KeyInput};
use crate::key::{KeyCode, KeyInfo, Modifiers};
use crate::poll::Clock;
use crate::{Error, ErrorKind};

/// A call made against a [`FakeConsole`], in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// [`ConsoleHost::is_redirected`].
    IsRedirected(StdStream),
    /// [`ConsoleHost::detach_console`].
    DetachConsole,
    /// [`ConsoleHost::allocate_console`].
    AllocateConsole,
    /// [`ConsoleHost::std_handle`].
    GetStdHandle(StdStream),
    /// [`ConsoleHost::set_std_handle`].
    SetStdHandle(StdStream, Handle),
    /// [`ConsoleHost::inject`], with the submitted events.
    Inject(Vec<KeyInput>),
    /// [`ConsoleHost::key_available`].
    KeyAvailable,
    /// [`ConsoleHost::read_key_intercepted`].
    ReadKey,
    /// [`ConsoleHost::read_line`].
    ReadLine,
    /// [`ConsoleHost::spawn`].
    Spawn(OsString, OsString),
    /// [`ConsoleHost::wait`], with the id of the awaited process.
    Wait(u32),
}

/// A process "started" by a [`FakeConsole`].
#[derive(Debug, PartialEq, Eq)]
pub struct FakeProcess {
    /// Sequential id, starting at 1.
    pub id: u32,
}

/// In-memory [`ConsoleHost`].
#[derive(Debug)]
pub struct FakeConsole {
    handles: [Handle; 3],
    console: [Handle; 3],
    redirected: [bool; 3],
    detach_succeeds: bool,
    allocate_succeeds: bool,
    injection: Injection,
    key_after: Option<usize>,
    checks: usize,
    key: KeyInfo,
    read_error: bool,
    spawn_error: Option<ErrorKind>,
    spawned: u32,
    calls: Vec<Call>,
}

impl FakeConsole {
    /// A console with inherited handles, successful console calls, all four
    /// events accepted, and the Alt release carrying the composed `0x1` readable
    /// on the first check.
    pub fn new() -> FakeConsole {
        FakeConsole {
            handles: [Handle(0x10), Handle(0x14), Handle(0x18)],
            console: [Handle(0x100), Handle(0x104), Handle(0x108)],
            redirected: [false; 3],
            detach_succeeds: true,
            allocate_succeeds: true,
            injection: Injection {
                sent: 4,
                last_error: 0,
            },
            key_after: Some(1),
            checks: 0,
            key: KeyInfo {
                key: KeyCode::ALT,
                modifiers: Modifiers::empty(),
                char_code: 0x1,
            },
            read_error: false,
            spawn_error: None,
            spawned: 0,
            calls: Vec::new(),
        }
    }

    /// Mark `stream` as redirected (or not). A redirected stream starts out
    /// bound to a file handle instead of the original console.
    pub fn redirect(mut self, stream: StdStream, redirected: bool) -> FakeConsole {
        let i = stream.index();
        self.redirected[i] = redirected;
        self.handles[i] = if redirected {
            Handle(0x1000 + 4 * i as isize)
        } else {
            Handle(0x10 + 4 * i as isize)
        };
        self
    }

    /// Result of detaching.
    pub fn detach_succeeds(mut self, ok: bool) -> FakeConsole {
        self.detach_succeeds = ok;
        self
    }

    /// Result of allocating. A failed allocation leaves the handles alone.
    pub fn allocate_succeeds(mut self, ok: bool) -> FakeConsole {
        self.allocate_succeeds = ok;
        self
    }

    /// What the input queue reports for any submitted batch.
    pub fn injection(mut self, injection: Injection) -> FakeConsole {
        self.injection = injection;
        self
    }

    /// Make a key available starting at the `checks`-th availability check,
    /// or never with `None`.
    pub fn key_after(mut self, checks: Option<usize>) -> FakeConsole {
        self.key_after = checks;
        self
    }

    /// The key handed out by reads.
    pub fn key(mut self, key: KeyInfo) -> FakeConsole {
        self.key = key;
        self
    }

    /// Make key reads fail.
    pub fn read_error(mut self) -> FakeConsole {
        self.read_error = true;
        self
    }

    /// Make spawning fail with `kind`.
    pub fn spawn_error(mut self, kind: ErrorKind) -> FakeConsole {
        self.spawn_error = Some(kind);
        self
    }

    /// Current handle slots, input/output/error.
    pub fn handles(&self) -> [Handle; 3] {
        self.handles
    }

    /// The handle a successful allocation installs for `stream`.
    pub fn console_handle(&self, stream: StdStream) -> Handle {
        self.console[stream.index()]
    }

    /// Every call made so far.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Number of availability checks made so far.
    pub fn checks(&self) -> usize {
        self.checks
    }
}

impl Default for FakeConsole {
    fn default() -> FakeConsole {
        FakeConsole::new()
    }
}

impl ConsoleHost for FakeConsole {
    type Process = FakeProcess;

    fn is_redirected(&mut self, stream: StdStream) -> bool {
        self.calls.push(Call::IsRedirected(stream));
        self.redirected[stream.index()]
    }

    fn detach_console(&mut self) -> bool {
        self.calls.push(Call::DetachConsole);
        self.detach_succeeds
    }

    fn allocate_console(&mut self) -> bool {
        self.calls.push(Call::AllocateConsole);
        if self.allocate_succeeds {
            self.handles = self.console;
        }
        self.allocate_succeeds
    }

    fn std_handle(&mut self, stream: StdStream) -> Handle {
        self.calls.push(Call::GetStdHandle(stream));
        self.handles[stream.index()]
    }

    fn set_std_handle(&mut self, stream: StdStream, handle: Handle) {
        self.calls.push(Call::SetStdHandle(stream, handle));
        self.handles[stream.index()] = handle;
    }

    fn inject(&mut self, events: &[KeyInput]) -> Injection {
        self.calls.push(Call::Inject(events.to_vec()));
        self.injection
    }

    fn key_available(&mut self) -> bool {
        self.calls.push(Call::KeyAvailable);
        self.checks += 1;
        self.key_after.map_or(false, |after| self.checks >= after)
    }

    fn read_key_intercepted(&mut self) -> io::Result<KeyInfo> {
        self.calls.push(Call::ReadKey);
        if self.read_error {
            Err(io::Error::new(io::ErrorKind::Other, "console read failed"))
        } else {
            Ok(self.key)
        }
    }

    fn read_line(&mut self) -> io::Result<()> {
        self.calls.push(Call::ReadLine);
        Ok(())
    }

    fn spawn(&mut self, program: &OsStr, arg: &OsStr) -> Result<FakeProcess, Error> {
        self.calls
            .push(Call::Spawn(program.to_os_string(), arg.to_os_string()));
        if let Some(kind) = self.spawn_error {
            return Err(Error::new(
                kind,
                format!("Failed to start {}", program.to_string_lossy()),
            ));
        }
        self.spawned += 1;
        Ok(FakeProcess { id: self.spawned })
    }

    fn wait(&mut self, process: FakeProcess) -> Result<(), Error> {
        self.calls.push(Call::Wait(process.id));
        Ok(())
    }
}

/// A [`Clock`] that moves forward by a fixed step every time it is read.
#[derive(Debug)]
pub struct FakeClock {
    now: Cell<Duration>,
    step: Duration,
}

impl FakeClock {
    /// A clock at zero advancing by `step` per reading.
    pub fn new(step: Duration) -> FakeClock {
        FakeClock {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        let now = self.now.get() + self.step;
        self.now.set(now);
        now
    }
}
