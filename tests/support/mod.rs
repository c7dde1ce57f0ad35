#![allow(dead_code)]

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use console_probe::testing::{FakeClock, FakeConsole};
use console_probe::{launch, Probe, ProbeRun};
use tempfile::{Builder, TempDir};

/// A run whose report goes to a file, the way CI redirects output to a log.
pub struct Test {
    pub td: TempDir,
    pub host: FakeConsole,
    pub probe: Probe,
}

pub struct Execution {
    lines: Vec<String>,
}

impl Test {
    pub fn new(host: FakeConsole) -> Test {
        Test {
            td: Builder::new().prefix("console-probe-test").tempdir().unwrap(),
            host,
            probe: Probe::new(),
        }
    }

    fn report_path(&self) -> PathBuf {
        self.td.path().join("report.log")
    }

    pub fn probe(&mut self) -> (ProbeRun, Execution) {
        let file = File::create(self.report_path()).unwrap();
        let clock = FakeClock::new(Duration::from_millis(50));
        let run = self
            .probe
            .run_with_clock(&mut self.host, file, &clock)
            .unwrap();
        (run, self.execution())
    }

    pub fn launch(&mut self, program: &str, arg: &str) -> Result<(), console_probe::Error> {
        let file = File::create(self.report_path()).unwrap();
        launch(
            &mut self.host,
            file,
            &OsString::from(program),
            &OsString::from(arg),
        )
    }

    pub fn execution(&self) -> Execution {
        let text = fs::read_to_string(self.report_path()).unwrap();
        Execution {
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}

impl Execution {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn must_have<P: AsRef<str>>(&self, line: P) -> &Execution {
        if !self.has(line.as_ref()) {
            panic!("didn't find {:?} in {:?}", line.as_ref(), self.lines);
        }
        self
    }

    pub fn must_not_have_prefix<P: AsRef<str>>(&self, prefix: P) -> &Execution {
        if self.lines.iter().any(|l| l.starts_with(prefix.as_ref())) {
            panic!("found {:?} in {:?}", prefix.as_ref(), self.lines);
        }
        self
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines.iter().filter(|l| l.starts_with(prefix)).count()
    }

    pub fn must_have_in_order(&self, before: &str, after: &str) -> &Execution {
        let before_position = self.position(before);
        let after_position = self.position(after);
        match (before_position, after_position) {
            (Some(b), Some(a)) if b < a => {}
            (b, a) => panic!(
                "{:?} (at {:?}) should come before {:?} (at {:?}) in {:?}",
                before, b, after, a, self.lines
            ),
        }
        self
    }

    fn has(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    fn position(&self, prefix: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.starts_with(prefix))
    }
}
