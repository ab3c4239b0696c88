//! Session countdown timer
//!
//! A single countdown keeps the chat unlocked while running and re-locks it
//! at zero. The 1 Hz tick lives in an owned tokio task that is aborted when
//! the timer restarts, leaves the running state, or is dropped - no tick
//! ever fires against a torn-down session.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Countdown state. `Unset` means no session was ever purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Unset,
    Running {
        remaining_secs: u64,
    },
    Expired,
}

/// Advance the state by one 1-second tick. Returns true when this tick
/// caused expiry.
fn advance(state: &mut TimerState) -> bool {
    match state {
        TimerState::Running { remaining_secs } => {
            *remaining_secs -= 1;
            if *remaining_secs == 0 {
                *state = TimerState::Expired;
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Owns the countdown state and its tick task.
pub struct SessionTimer {
    state: Arc<Mutex<TimerState>>,
    tick_task: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::Unset)),
            tick_task: None,
        }
    }

    /// Start (or restart) the countdown. The last purchase wins: a start
    /// while running or expired replaces the remaining time, it never stacks.
    pub fn start(&mut self, duration_secs: u64) {
        self.stop_ticker();

        if duration_secs == 0 {
            *self.state.lock() = TimerState::Expired;
            return;
        }

        *self.state.lock() = TimerState::Running {
            remaining_secs: duration_secs,
        };
        tracing::info!(duration_secs, "Session started");

        let state = Arc::clone(&self.state);
        self.tick_task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick of a tokio interval completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut guard = state.lock();
                if !matches!(*guard, TimerState::Running { .. }) {
                    break;
                }
                if advance(&mut guard) {
                    tracing::info!("Session expired, access re-locked");
                    break;
                }
            }
        }));
    }

    pub fn state(&self) -> TimerState {
        *self.state.lock()
    }

    /// Derived access lock: locked unless a session is running.
    pub fn is_locked(&self) -> bool {
        !matches!(self.state(), TimerState::Running { .. })
    }

    /// Seconds left, or None when no session was ever purchased.
    pub fn remaining_secs(&self) -> Option<u64> {
        match self.state() {
            TimerState::Unset => None,
            TimerState::Running { remaining_secs } => Some(remaining_secs),
            TimerState::Expired => Some(0),
        }
    }

    /// `M:SS` display string for the status panel.
    pub fn format_remaining(&self) -> Option<String> {
        self.remaining_secs()
            .map(|secs| format!("{}:{:02}", secs / 60, secs % 60))
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            handle.abort();
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
