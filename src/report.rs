//! The textual report a test harness scrapes. Each line is flushed as soon as
//! it is written so the order survives redirection and child output.
//!
//! Writes are best-effort: a failed line is logged and the run goes on.

use std::io::{self, Write};

use crate::console::{Reallocation, Redirection};
use crate::input::Injection;
use crate::key::KeyInfo;

/// Writes report lines to an output stream.
#[derive(Debug)]
pub struct Report<W> {
    out: W,
}

impl<W: Write> Report<W> {
    /// A report writing to `out`.
    pub fn new(out: W) -> Report<W> {
        Report { out }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let written = self
            .out
            .write_fmt(args)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            tracing::warn!("failed to write report line {:?}: {}", args.to_string(), e);
        }
    }

    /// `Redirected in/out/err: ...`
    pub fn redirection(&mut self, r: &Redirection) {
        self.line(format_args!(
            "Redirected in/out/err: {}/{}/{}",
            r.input, r.output, r.error
        ))
    }

    /// `Free/AllocConsole: ...`
    pub fn reallocation(&mut self, r: &Reallocation) {
        self.line(format_args!(
            "Free/AllocConsole: {} {}",
            r.detached, r.allocated
        ))
    }

    /// Announces the child about to be started.
    pub fn starting_child(&mut self) {
        self.line(format_args!("Starting client..."))
    }

    /// `SendInput: ...`
    pub fn injection(&mut self, i: &Injection) {
        self.line(format_args!(
            "SendInput: sent: {}, last error: 0x{:X}",
            i.sent, i.last_error
        ))
    }

    /// `ReadKey: ...`
    pub fn key(&mut self, k: &KeyInfo) {
        self.line(format_args!(
            "ReadKey: key: {}, mod: {}, char: 0x{:X}",
            k.key, k.modifiers, k.char_code
        ))
    }

    /// The key line when the read itself failed.
    pub fn key_error(&mut self, e: &io::Error) {
        self.line(format_args!("ReadKey failed: {}", e))
    }

    /// The key line when nothing arrived in time.
    pub fn timed_out(&mut self) {
        self.line(format_args!("KeyAvailable time out."))
    }

    /// Prompt shown before the final wait on an interactive console.
    pub fn final_prompt(&mut self) {
        self.line(format_args!(
            "App started without redirected std handles. Press <ENTER> to close this window."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyCode, Modifiers};

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    fn text(f: impl FnOnce(&mut Report<Vec<u8>>)) -> String {
        let mut report = Report::new(Vec::new());
        f(&mut report);
        String::from_utf8(report.into_inner()).unwrap()
    }

    #[test]
    fn lines() {
        assert_eq!(
            text(|r| r.redirection(&Redirection {
                input: false,
                output: true,
                error: false
            })),
            "Redirected in/out/err: false/true/false\n"
        );
        assert_eq!(
            text(|r| r.reallocation(&Reallocation {
                detached: true,
                allocated: false
            })),
            "Free/AllocConsole: true false\n"
        );
        assert_eq!(
            text(|r| r.injection(&Injection {
                sent: 0,
                last_error: 5
            })),
            "SendInput: sent: 0, last error: 0x5\n"
        );
        assert_eq!(text(|r| r.timed_out()), "KeyAvailable time out.\n");
    }

    #[test]
    fn key_line_is_hex() {
        let key = KeyInfo {
            key: KeyCode::NUMPAD1,
            modifiers: Modifiers::ALT,
            char_code: 0x263a,
        };
        assert_eq!(
            text(|r| r.key(&key)),
            "ReadKey: key: NumPad1, mod: Alt, char: 0x263A\n"
        );
    }

    #[test]
    fn write_failures_do_not_stop_the_report() {
        let mut report = Report::new(BrokenPipe);
        report.redirection(&Redirection::default());
        report.timed_out();
        report.final_prompt();
    }
}
