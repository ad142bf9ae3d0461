//! Monotonic stopwatch for timing a single sprint effort.
//!
//! The watch contributes exactly one seconds value to the session flow
//! when stopped. Cancelling releases the handle without producing a
//! result, so an abandoned timing never leaks into the logged times.

use std::time::Instant;

/// One-shot stopwatch backed by the monotonic clock
#[derive(Debug, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing. Restarting a running watch resets it.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Seconds elapsed so far, without stopping
    pub fn elapsed(&self) -> Option<f64> {
        self.started.map(|t| t.elapsed().as_secs_f64())
    }

    /// Stop and yield the elapsed seconds. The handle is released; a
    /// second stop returns None.
    pub fn stop(&mut self) -> Option<f64> {
        self.started.take().map(|t| t.elapsed().as_secs_f64())
    }

    /// Drop the current timing without producing a result
    pub fn cancel(&mut self) {
        self.started = None;
    }
}
