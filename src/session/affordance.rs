//! The send affordance: whether the user may submit a message right now.
//!
//! A send disables it for exactly as long as the [`SendGuard`] lives. The
//! guard re-enables it on drop, so success, failure and early returns all
//! end in the same state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendState {
    Idle,
    Sending,
}

/// Shared view of the submit control. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct SendAffordance {
    enabled: Arc<AtomicBool>,
}

impl Default for SendAffordance {
    fn default() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl SendAffordance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SendState {
        if self.is_enabled() {
            SendState::Idle
        } else {
            SendState::Sending
        }
    }

    /// Disable the control until the returned guard is dropped.
    pub fn disable(&self) -> SendGuard {
        self.enabled.store(false, Ordering::SeqCst);
        SendGuard {
            affordance: self.clone(),
        }
    }
}

/// Keeps the send affordance disabled while alive.
#[derive(Debug)]
pub struct SendGuard {
    affordance: SendAffordance,
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.affordance.enabled.store(true, Ordering::SeqCst);
    }
}
