//! Bounded wait for a key to appear in the console input buffer.

use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since some fixed, arbitrary origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// A clock whose origin is the moment of creation.
    pub fn new() -> MonotonicClock {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> MonotonicClock {
        MonotonicClock::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// How a [`poll_for_key`] call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A key became available after `elapsed`.
    KeyReady {
        /// Time from the start of polling to the successful check.
        elapsed: Duration,
    },
    /// No key became available within the timeout.
    TimedOut,
}

/// Spin on `key_available` until it returns `true` or `timeout` has elapsed on
/// `clock`.
///
/// This is a busy loop: there is no sleep and no yield between checks, and the
/// check that first sees a key ends the wait immediately. The elapsed time is
/// measured from the call, and a check is only made while it is below
/// `timeout`.
pub fn poll_for_key<C, F>(timeout: Duration, clock: &C, mut key_available: F) -> PollOutcome
where
    C: Clock + ?Sized,
    F: FnMut() -> bool,
{
    let start = clock.now();
    loop {
        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= timeout {
            return PollOutcome::TimedOut;
        }
        if key_available() {
            return PollOutcome::KeyReady { elapsed };
        }
    }
}
