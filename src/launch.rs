//! Helpers for running the child program in launcher mode.

use std::{
    ffi::OsStr,
    io,
    process::{Child, Command, ExitStatus},
};

use crate::{Error, ErrorKind};

fn display_command(program: &OsStr, arg: &OsStr) -> String {
    let program = program.to_string_lossy();
    let arg = arg.to_string_lossy();
    shlex::try_join([program.as_ref(), arg.as_ref()])
        .unwrap_or_else(|_| format!("{:?} {:?}", program, arg))
}

/// Start `program` with exactly one argument.
///
/// No shell is involved, and the child inherits whatever standard handles
/// are installed at the time of the call.
pub fn spawn(program: &OsStr, arg: &OsStr) -> Result<Child, Error> {
    let mut cmd = Command::new(program);
    cmd.arg(arg);

    tracing::info!("running: {}", display_command(program, arg));

    match cmd.spawn() {
        Ok(child) => Ok(child),
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => Err(Error::new(
            ErrorKind::ProgramNotFound,
            format!(
                "Failed to find program. Does `{}` exist?",
                program.to_string_lossy()
            ),
        )),
        Err(e) => Err(Error::new(
            ErrorKind::SpawnFailed,
            format!("Command {:?} failed to start: {:?}", cmd, e),
        )),
    }
}

/// Block until `child` exits. The exit status is logged and handed back, but
/// a non-zero status is not an error.
pub fn wait_on_child(child: &mut Child) -> Result<ExitStatus, Error> {
    let status = child.wait().map_err(|e| {
        Error::new(
            ErrorKind::WaitFailed,
            format!(
                "Failed to wait on spawned child process {}: {}.",
                child.id(),
                e
            ),
        )
    })?;
    tracing::info!(%status, "child exited");
    Ok(status)
}
