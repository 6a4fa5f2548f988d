//! Stoppable background threads

use crate::HubError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Granularity of stop-flag checks while sleeping or joining
const STOP_POLL: Duration = Duration::from_millis(10);

/// Shared stop flag handed to a worker body
#[derive(Debug, Clone, Default)]
pub(crate) struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Sleep for `duration`, waking early once the flag is set
    pub fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_set() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(STOP_POLL.min(deadline - now));
        }
    }
}

/// A named thread with a cooperative stop flag
pub(crate) struct Worker {
    name: &'static str,
    stop: StopFlag,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Spawn `body` on a named OS thread
    pub fn spawn<F>(name: &'static str, body: F) -> Result<Self, HubError>
    where
        F: FnOnce(StopFlag) + Send + 'static,
    {
        let stop = StopFlag::default();
        let flag = stop.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(flag))
            .map_err(|source| HubError::Spawn { name, source })?;

        debug!("{} worker started", name);
        Ok(Self { name, stop, handle })
    }

    /// Signal the worker and wait at most `timeout` for it to exit
    ///
    /// Returns `false` if the thread was still running at the deadline; it is
    /// then detached. The device handle it owns is closed when the detached
    /// thread returns from its current blocking read and sees the flag.
    pub fn stop(self, timeout: Duration) -> bool {
        self.stop.set();

        let deadline = Instant::now() + timeout;
        while !self.handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    "{} worker did not exit within {:?}, detaching",
                    self.name, timeout
                );
                return false;
            }
            thread::sleep(STOP_POLL);
        }

        if self.handle.join().is_err() {
            warn!("{} worker panicked", self.name);
        }
        debug!("{} worker stopped", self.name);
        true
    }
}
