//! A small diagnostic for console input/output redirection on Windows.
//!
//! The probe allocates a fresh console window while keeping whatever the caller
//! did to standard output and standard error, synthesizes a key chord through
//! the system input queue, waits a bounded time for that key to show up in the
//! console input buffer and reports what it read. It is meant to run under CI,
//! where output is usually redirected to a log and no real keyboard exists.
//!
//! Two modes are available from the executable:
//!
//! - with no arguments it runs the probe in-process (see [`Probe`]);
//! - with exactly two arguments (`<program> <argument>`) it acts as a launcher
//!   (see [`launch`]), reallocating its own console and then running the given
//!   child, typically another copy of the probe.
//!
//! Every OS interaction goes through the [`ConsoleHost`] trait. The real
//! backend is `WindowsHost`; [`testing::FakeConsole`] stands in for it in
//! tests.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> Result<(), console_probe::Error> {
//! use console_probe::{Probe, WindowsHost};
//!
//! let mut host = WindowsHost::new();
//! let run = Probe::from_env().run(&mut host, &mut std::io::stdout())?;
//! println!("{:?}", run.outcome);
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

#![warn(missing_docs)]

use std::{borrow::Cow, fmt, io};

pub mod console;
pub mod input;
pub mod key;
mod launch;
pub mod logging;
pub mod poll;
mod probe;
mod report;
pub mod testing;

#[cfg(windows)]
mod windows;

pub use console::{reallocate, ConsoleHost, Handle, Reallocation, Redirection, StdStream};
pub use input::{Injection, InputFlags, Key, KeyChord, KeyInput};
pub use key::{KeyCode, KeyInfo, Modifiers};
pub use launch::{spawn, wait_on_child};
pub use poll::{poll_for_key, Clock, MonotonicClock, PollOutcome};
pub use probe::{launch, Invocation, KeyOutcome, Probe, ProbeRun};
pub use report::Report;

#[cfg(windows)]
pub use windows::WindowsHost;

/// Kinds of errors that can propagate out of a probe or launcher run.
///
/// Console and input failures are never errors: they are reported and the run
/// carries on. Only the cases below stop a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Writing the report or reading from the console failed.
    IOError,
    /// The child program could not be found.
    ProgramNotFound,
    /// The child program was found but could not be started.
    SpawnFailed,
    /// Waiting on the child program failed.
    WaitFailed,
    /// The executable was started on a platform without a console backend.
    Unsupported,
}

/// Represents an internal error that occurred, with an explanation.
#[derive(Clone, Debug)]
pub struct Error {
    /// Describes the kind of error that occurred.
    kind: ErrorKind,
    /// More explanation of error that occurred.
    message: Cow<'static, str>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Error {
        Error {
            kind,
            message: message.into(),
        }
    }

    /// An [`ErrorKind::Unsupported`] error.
    pub fn unsupported(message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(ErrorKind::Unsupported, message)
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::new(ErrorKind::IOError, format!("{}", e))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}
