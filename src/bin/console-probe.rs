//! Console input probe.
//!
//! `console-probe` runs the probe in this process.
//! `console-probe <program> <argument>` reallocates this process's console
//! and runs `<program> <argument>` as a child, usually another copy of the
//! probe with redirections set up independently.

use std::{env, process::ExitCode};

use console_probe::{logging, Invocation};

#[cfg(windows)]
fn run(invocation: Invocation) -> Result<(), console_probe::Error> {
    use console_probe::{launch, Probe, WindowsHost};
    use std::io;

    let mut host = WindowsHost::new();
    match invocation {
        Invocation::Launch { program, arg } => launch(&mut host, io::stdout(), &program, &arg),
        Invocation::Probe => Probe::from_env().run(&mut host, io::stdout()).map(drop),
    }
}

#[cfg(not(windows))]
fn run(_invocation: Invocation) -> Result<(), console_probe::Error> {
    Err(console_probe::Error::unsupported(
        "console-probe needs a Windows console",
    ))
}

fn main() -> ExitCode {
    logging::init();

    let invocation = Invocation::from_args(env::args_os().skip(1));
    tracing::debug!(?invocation, "starting");

    match run(invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("console-probe: {}", e);
            ExitCode::FAILURE
        }
    }
}
