//! The two entry procedures: the in-process probe and the launcher.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::time::Duration;

use crate::console::{reallocate, ConsoleHost, Reallocation, Redirection};
use crate::input::{Injection, KeyChord};
use crate::key::KeyInfo;
use crate::poll::{poll_for_key, Clock, MonotonicClock, PollOutcome};
use crate::report::Report;
use crate::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn getenv(v: &str) -> Option<String> {
    let r = env::var(v).ok();
    tracing::debug!("{} = {:?}", v, r);
    r
}

/// How the executable was invoked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Run the probe in this process.
    Probe,
    /// Reallocate this process's console, then run `program arg`.
    Launch {
        /// Child executable.
        program: OsString,
        /// The single argument passed to it.
        arg: OsString,
    },
}

impl Invocation {
    /// Classify the arguments following the program name.
    ///
    /// Exactly two arguments select the launcher; any other count, including
    /// one or three, runs the probe.
    pub fn from_args<I>(args: I) -> Invocation
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().collect();
        if args.len() != 2 {
            return Invocation::Probe;
        }
        let arg = args.pop().unwrap_or_default();
        let program = args.pop().unwrap_or_default();
        Invocation::Launch { program, arg }
    }
}

/// The terminal state of the key wait.
#[derive(Debug)]
pub enum KeyOutcome {
    /// A key was read.
    Read(KeyInfo),
    /// A key was available but reading it failed.
    ReadFailed(std::io::Error),
    /// Nothing became available before the timeout.
    TimedOut,
}

/// Everything a probe run observed, in report order.
#[derive(Debug)]
pub struct ProbeRun {
    /// Redirection status captured at the start of the run.
    pub redirection: Redirection,
    /// Console detach/allocate results.
    pub reallocation: Reallocation,
    /// What the input queue said about the chord.
    pub injection: Injection,
    /// How the key wait ended.
    pub outcome: KeyOutcome,
    /// Whether the run held the window open for a manual key press.
    pub waited: bool,
}

/// Configuration for a probe run.
///
/// # Examples
///
/// ```
/// use console_probe::{Key, KeyChord, Probe};
/// use std::time::Duration;
///
/// let mut probe = Probe::new();
/// probe
///     .timeout(Duration::from_secs(3))
///     .chord(KeyChord::new(Key::SHIFT, Key::new(0x41, 0x1e)));
/// ```
#[derive(Clone, Debug)]
pub struct Probe {
    timeout: Duration,
    chord: KeyChord,
}

impl Default for Probe {
    fn default() -> Probe {
        Probe::new()
    }
}

impl Probe {
    /// Ten second timeout, Alt + NumPad1.
    pub fn new() -> Probe {
        Probe {
            timeout: DEFAULT_TIMEOUT,
            chord: KeyChord::default(),
        }
    }

    /// The defaults, with the timeout taken from `CONSOLE_PROBE_TIMEOUT_SECS`
    /// when it holds a positive number of seconds.
    pub fn from_env() -> Probe {
        let mut probe = Probe::new();
        if let Some(v) = getenv("CONSOLE_PROBE_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    probe.timeout(Duration::from_secs(secs));
                }
                _ => tracing::warn!(
                    "ignoring CONSOLE_PROBE_TIMEOUT_SECS={:?}, expected a positive number of seconds",
                    v
                ),
            }
        }
        probe
    }

    /// How long to wait for the key to become available.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Probe {
        self.timeout = timeout;
        self
    }

    /// The chord to inject.
    pub fn chord(&mut self, chord: KeyChord) -> &mut Probe {
        self.chord = chord;
        self
    }

    /// Run the probe against `host`, writing the report to `out`.
    ///
    /// Report lines that fail to write are logged and skipped; the probe
    /// itself never fails.
    pub fn run<H, W>(&self, host: &mut H, out: W) -> Result<ProbeRun, Error>
    where
        H: ConsoleHost + ?Sized,
        W: Write,
    {
        self.run_with_clock(host, out, &MonotonicClock::new())
    }

    /// [`Probe::run`] with the key wait timed on `clock`.
    pub fn run_with_clock<H, W, C>(&self, host: &mut H, out: W, clock: &C) -> Result<ProbeRun, Error>
    where
        H: ConsoleHost + ?Sized,
        W: Write,
        C: Clock + ?Sized,
    {
        let mut report = Report::new(out);

        // Redirection is judged once, before the console changes under us.
        let redirection = Redirection::query(host);
        report.redirection(&redirection);

        let reallocation = reallocate(host);
        report.reallocation(&reallocation);

        let events = self.chord.events();
        let injection = host.inject(&events);
        tracing::debug!(?events, ?injection, "injected key chord");
        report.injection(&injection);

        let outcome = match poll_for_key(self.timeout, clock, || host.key_available()) {
            PollOutcome::KeyReady { elapsed } => {
                tracing::debug!(?elapsed, "key available");
                match host.read_key_intercepted() {
                    Ok(key) => {
                        report.key(&key);
                        KeyOutcome::Read(key)
                    }
                    Err(e) => {
                        report.key_error(&e);
                        KeyOutcome::ReadFailed(e)
                    }
                }
            }
            PollOutcome::TimedOut => {
                report.timed_out();
                KeyOutcome::TimedOut
            }
        };

        let waited = !redirection.output;
        if waited {
            report.final_prompt();
            if let Err(e) = host.read_line() {
                tracing::warn!("final wait ended early: {}", e);
            }
        }

        Ok(ProbeRun {
            redirection,
            reallocation,
            injection,
            outcome,
            waited,
        })
    }
}

/// Run the launcher: report, reallocate this process's console, then start
/// `program arg` and block until it exits.
///
/// The child's exit status is not propagated. Failing to start or wait for
/// the child is the one error this returns.
pub fn launch<H, W>(host: &mut H, out: W, program: &OsStr, arg: &OsStr) -> Result<(), Error>
where
    H: ConsoleHost + ?Sized,
    W: Write,
{
    let mut report = Report::new(out);

    let redirection = Redirection::query(host);
    report.redirection(&redirection);

    let reallocation = reallocate(host);
    report.reallocation(&reallocation);

    report.starting_child();
    let process = host.spawn(program, arg)?;
    host.wait(process)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::StdStream;
    use crate::input::KeyInput;
    use crate::key::{KeyCode, Modifiers};
    use crate::testing::{Call, FakeClock, FakeConsole};
    use crate::ErrorKind;

    fn os(s: &str) -> OsString {
        OsString::from(s)
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn clock() -> FakeClock {
        FakeClock::new(Duration::from_millis(100))
    }

    #[test]
    fn invocation() {
        assert_eq!(Invocation::from_args(vec![]), Invocation::Probe);
        assert_eq!(Invocation::from_args(vec![os("a")]), Invocation::Probe);
        assert_eq!(
            Invocation::from_args(vec![os("a"), os("b"), os("c")]),
            Invocation::Probe
        );
        assert_eq!(
            Invocation::from_args(vec![os("notepad.exe"), os("foo.txt")]),
            Invocation::Launch {
                program: os("notepad.exe"),
                arg: os("foo.txt")
            }
        );
    }

    #[test]
    fn probe_reads_key_when_redirected() {
        let mut host = FakeConsole::new()
            .redirect(StdStream::Output, true)
            .key_after(Some(3));
        let mut out = Vec::new();

        let run = Probe::new()
            .run_with_clock(&mut host, &mut out, &clock())
            .unwrap();

        assert_eq!(
            lines(&out),
            [
                "Redirected in/out/err: false/true/false",
                "Free/AllocConsole: true true",
                "SendInput: sent: 4, last error: 0x0",
                "ReadKey: key: 18, mod: 0, char: 0x1",
            ]
        );
        assert!(!run.waited);
        assert!(matches!(run.outcome, KeyOutcome::Read(_)));
        assert_eq!(host.checks(), 3);
        assert!(!host.calls().contains(&Call::ReadLine));
    }

    #[test]
    fn probe_times_out_without_reading() {
        let mut host = FakeConsole::new()
            .redirect(StdStream::Output, true)
            .key_after(None);
        let mut out = Vec::new();

        let run = Probe::new()
            .run_with_clock(&mut host, &mut out, &clock())
            .unwrap();

        let lines = lines(&out);
        assert_eq!(lines.last().unwrap(), "KeyAvailable time out.");
        assert!(!lines.iter().any(|l| l.starts_with("ReadKey")));
        assert!(matches!(run.outcome, KeyOutcome::TimedOut));
        assert!(!host.calls().contains(&Call::ReadKey));
        // 100ms steps over a 10s timeout.
        assert_eq!(host.checks(), 99);
    }

    #[test]
    fn probe_waits_on_interactive_console() {
        let mut host = FakeConsole::new();
        let mut out = Vec::new();

        let run = Probe::new()
            .run_with_clock(&mut host, &mut out, &clock())
            .unwrap();

        assert!(run.waited);
        assert_eq!(
            lines(&out).last().unwrap(),
            "App started without redirected std handles. Press <ENTER> to close this window."
        );
        assert_eq!(host.calls().last(), Some(&Call::ReadLine));
    }

    #[test]
    fn probe_injects_the_configured_chord_once() {
        let mut host = FakeConsole::new().redirect(StdStream::Output, true);
        let chord = KeyChord::new(crate::Key::SHIFT, crate::Key::new(0x41, 0x1e));

        Probe::new()
            .chord(chord)
            .run_with_clock(&mut host, Vec::new(), &clock())
            .unwrap();

        let injected: Vec<&Vec<KeyInput>> = host
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::Inject(events) => Some(events),
                _ => None,
            })
            .collect();
        assert_eq!(injected, [&chord.events().to_vec()]);
    }

    #[test]
    fn probe_reports_injection_failure_and_continues() {
        let mut host = FakeConsole::new()
            .redirect(StdStream::Output, true)
            .detach_succeeds(false)
            .injection(Injection {
                sent: 0,
                last_error: 0x57,
            });
        let mut out = Vec::new();

        Probe::new()
            .run_with_clock(&mut host, &mut out, &clock())
            .unwrap();

        let lines = lines(&out);
        assert_eq!(lines[1], "Free/AllocConsole: false true");
        assert_eq!(lines[2], "SendInput: sent: 0, last error: 0x57");
        assert!(lines[3].starts_with("ReadKey: "));
    }

    #[test]
    fn probe_read_failure_still_one_key_line() {
        let mut host = FakeConsole::new()
            .redirect(StdStream::Output, true)
            .read_error();
        let mut out = Vec::new();

        let run = Probe::new()
            .run_with_clock(&mut host, &mut out, &clock())
            .unwrap();

        let lines = lines(&out);
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("ReadKey failed: "));
        assert!(matches!(run.outcome, KeyOutcome::ReadFailed(_)));
    }

    struct ClosedPipe;

    impl std::io::Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn probe_runs_to_the_end_when_report_output_is_closed() {
        let mut host = FakeConsole::new()
            .redirect(StdStream::Output, true)
            .key_after(Some(2));

        let run = Probe::new()
            .run_with_clock(&mut host, ClosedPipe, &clock())
            .unwrap();

        assert!(matches!(run.outcome, KeyOutcome::Read(_)));
        let calls = host.calls();
        assert!(calls.contains(&Call::DetachConsole));
        assert!(calls.iter().any(|c| matches!(c, Call::Inject(_))));
        assert!(calls.contains(&Call::KeyAvailable));
        assert!(calls.contains(&Call::ReadKey));
    }

    #[test]
    fn launcher_still_spawns_when_report_output_is_closed() {
        let mut host = FakeConsole::new().redirect(StdStream::Output, true);

        launch(&mut host, ClosedPipe, &os("notepad.exe"), &os("foo.txt")).unwrap();

        assert_eq!(host.calls().last(), Some(&Call::Wait(1)));
    }

    #[test]
    fn probe_redirection_is_captured_before_reallocation() {
        let mut host = FakeConsole::new()
            .redirect(StdStream::Output, true)
            .key(KeyInfo {
                key: KeyCode(0x41),
                modifiers: Modifiers::SHIFT,
                char_code: 'A' as u16,
            });

        Probe::new()
            .run_with_clock(&mut host, Vec::new(), &clock())
            .unwrap();

        let calls = host.calls();
        let last_query = calls
            .iter()
            .rposition(|c| matches!(c, Call::IsRedirected(_)))
            .unwrap();
        let detach = calls.iter().position(|c| *c == Call::DetachConsole).unwrap();
        assert!(last_query < detach);
    }

    #[test]
    fn launcher_spawns_and_waits() {
        let mut host = FakeConsole::new().redirect(StdStream::Output, true);
        let mut out = Vec::new();

        launch(&mut host, &mut out, &os("notepad.exe"), &os("foo.txt")).unwrap();

        assert_eq!(
            lines(&out),
            [
                "Redirected in/out/err: false/true/false",
                "Free/AllocConsole: true true",
                "Starting client...",
            ]
        );
        let calls = host.calls();
        let n = calls.len();
        assert_eq!(
            &calls[n - 2..],
            &[
                Call::Spawn(os("notepad.exe"), os("foo.txt")),
                Call::Wait(1)
            ]
        );
        assert!(!calls.contains(&Call::ReadLine));
        assert!(!calls.iter().any(|c| matches!(c, Call::Inject(_))));
    }

    #[test]
    fn launcher_spawn_failure_propagates() {
        let mut host = FakeConsole::new().spawn_error(ErrorKind::ProgramNotFound);
        let mut out = Vec::new();

        let err = launch(&mut host, &mut out, &os("missing.exe"), &os("x")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ProgramNotFound);
        assert_eq!(lines(&out).last().unwrap(), "Starting client...");
        assert!(!host.calls().iter().any(|c| matches!(c, Call::Wait(_))));
    }
}
