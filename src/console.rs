//! The capability boundary between the probe and the operating system, and the
//! console reallocation sequence built on top of it.

use std::ffi::OsStr;
use std::io;

use crate::input::{Injection, KeyInput};
use crate::key::KeyInfo;
use crate::Error;

/// One of the three standard streams of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StdStream {
    /// Standard input.
    Input,
    /// Standard output.
    Output,
    /// Standard error.
    Error,
}

impl StdStream {
    /// All three streams, in input/output/error order.
    pub const ALL: [StdStream; 3] = [StdStream::Input, StdStream::Output, StdStream::Error];

    pub(crate) fn index(self) -> usize {
        match self {
            StdStream::Input => 0,
            StdStream::Output => 1,
            StdStream::Error => 2,
        }
    }
}

/// An opaque OS handle value bound to a standard stream slot.
///
/// Only ever compared and handed back to the host; never dereferenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(pub isize);

/// Which standard streams are redirected away from an interactive console.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Redirection {
    /// Standard input is redirected.
    pub input: bool,
    /// Standard output is redirected.
    pub output: bool,
    /// Standard error is redirected.
    pub error: bool,
}

impl Redirection {
    /// Ask the host about all three streams.
    ///
    /// The answer is captured once; later handle changes (such as a console
    /// reallocation) do not update it.
    pub fn query<H: ConsoleHost + ?Sized>(host: &mut H) -> Redirection {
        Redirection {
            input: host.is_redirected(StdStream::Input),
            output: host.is_redirected(StdStream::Output),
            error: host.is_redirected(StdStream::Error),
        }
    }
}

/// Outcome of [`reallocate`], as reported by the two console calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reallocation {
    /// Whether detaching from the previous console succeeded.
    pub detached: bool,
    /// Whether allocating the new console succeeded.
    pub allocated: bool,
}

/// Everything the probe needs from the operating system.
///
/// Results of console calls are plain values: a failure is something to
/// report, not something to act on. Only process management can fail with an
/// [`Error`].
pub trait ConsoleHost {
    /// A launched child process.
    type Process;

    /// Whether `stream` currently points somewhere other than a console.
    fn is_redirected(&mut self, stream: StdStream) -> bool;

    /// Detach the process from its console.
    fn detach_console(&mut self) -> bool;

    /// Allocate a new console for the process. This rebinds all three
    /// standard handles to the new console.
    fn allocate_console(&mut self) -> bool;

    /// The handle currently installed for `stream`.
    fn std_handle(&mut self, stream: StdStream) -> Handle;

    /// Install `handle` as the handle for `stream`.
    fn set_std_handle(&mut self, stream: StdStream, handle: Handle);

    /// Submit `events` to the system input queue in a single call.
    fn inject(&mut self, events: &[KeyInput]) -> Injection;

    /// Whether a readable key is waiting in the console input buffer.
    ///
    /// Must not block.
    fn key_available(&mut self) -> bool;

    /// Consume one key from the console input buffer without echoing it.
    fn read_key_intercepted(&mut self) -> io::Result<KeyInfo>;

    /// Block until a line is entered on standard input.
    fn read_line(&mut self) -> io::Result<()>;

    /// Start `program` with a single argument and no shell, inheriting the
    /// current standard handles.
    fn spawn(&mut self, program: &OsStr, arg: &OsStr) -> Result<Self::Process, Error>;

    /// Block until `process` exits.
    fn wait(&mut self, process: Self::Process) -> Result<(), Error>;
}

/// Give the process a fresh console while keeping output and error
/// redirections intact.
///
/// Order matters: save output/error, detach, allocate, then put output and
/// error back. Input is deliberately left bound to the new console.
pub fn reallocate<H: ConsoleHost + ?Sized>(host: &mut H) -> Reallocation {
    let output = host.std_handle(StdStream::Output);
    let error = host.std_handle(StdStream::Error);

    let detached = host.detach_console();
    let allocated = host.allocate_console();

    host.set_std_handle(StdStream::Output, output);
    host.set_std_handle(StdStream::Error, error);

    tracing::debug!(detached, allocated, ?output, ?error, "reallocated console");

    Reallocation {
        detached,
        allocated,
    }
}
