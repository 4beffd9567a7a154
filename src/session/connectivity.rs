//! Connectivity indicator and its background poller.
//!
//! The poller probes the NLU backend on a fixed interval and only ever
//! writes the indicator. Chat sends never read it, so a slow probe can't
//! hold up a turn and a disconnected label never blocks one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::analytics::EventLog;
use crate::nlu::{ConnectivityState, StatusProbe};

/// How often the poller checks for a stop request while waiting.
const STOP_CHECK: Duration = Duration::from_millis(100);

/// Shared, read-mostly connectivity state. Starts disconnected.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityIndicator {
    connected: Arc<AtomicBool>,
}

impl ConnectivityIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectivityState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectivityState::Connected
        } else {
            ConnectivityState::Disconnected
        }
    }

    pub fn label(&self) -> &'static str {
        self.state().label()
    }

    /// Store a new state; returns `true` if it changed.
    pub fn set(&self, state: ConnectivityState) -> bool {
        let was = self.connected.swap(state.is_connected(), Ordering::SeqCst);
        was != state.is_connected()
    }

    /// Probe once and store the result.
    pub fn refresh(&self, probe: &impl StatusProbe) -> ConnectivityState {
        let state = probe.probe();
        self.set(state);
        state
    }
}

/// Background thread that refreshes an indicator every `interval`.
///
/// Probes immediately on start. Stops when dropped; a probe already in
/// flight finishes in the background.
pub struct StatusPoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StatusPoller {
    pub fn spawn<P>(
        probe: P,
        indicator: ConnectivityIndicator,
        interval: Duration,
        events: EventLog,
    ) -> Self
    where
        P: StatusProbe + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                let state = probe.probe();
                if indicator.set(state) {
                    events.connectivity_changed(state);
                }

                let started = Instant::now();
                while started.elapsed() < interval {
                    if stop_flag.load(Ordering::SeqCst) {
                        return;
                    }
                    thread::sleep(STOP_CHECK.min(interval));
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop polling and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
