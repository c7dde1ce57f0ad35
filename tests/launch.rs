//! Starting real child processes through the launcher helpers.

#![cfg(unix)]

use std::ffi::OsStr;

use console_probe::{spawn, wait_on_child};

#[test]
fn child_runs_to_completion_with_its_argument() {
    let td = tempfile::tempdir().unwrap();
    let marker = td.path().join("foo.txt");

    let mut child = spawn(OsStr::new("touch"), marker.as_os_str()).unwrap();
    let status = wait_on_child(&mut child).unwrap();

    assert!(status.success());
    assert!(marker.exists());
}

#[test]
fn argument_is_not_split_by_a_shell() {
    let td = tempfile::tempdir().unwrap();
    let marker = td.path().join("two words; rm -rf nothing");

    let mut child = spawn(OsStr::new("touch"), marker.as_os_str()).unwrap();
    wait_on_child(&mut child).unwrap();

    assert!(marker.exists());
}

#[test]
fn failing_child_is_not_an_error() {
    let mut child = spawn(OsStr::new("false"), OsStr::new("ignored")).unwrap();
    let status = wait_on_child(&mut child).unwrap();
    assert!(!status.success());
}
