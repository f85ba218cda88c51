//! Scan Session - Buffer and inactivity timer of one scan attempt

use crate::state::timers::TimerId;

/// Where a listener is in its scan cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No characters buffered, no timer pending.
    #[default]
    Idle,
    /// Characters buffered, waiting for more or for the inactivity timeout.
    Accumulating,
}

/// Characters typed since the session began, plus the pending timeout.
///
/// A listener holds at most one session; `None` in its slot means idle.
#[derive(Debug, Default)]
pub struct ScanSession {
    buffer: String,
    timer: Option<TimerId>,
}

impl ScanSession {
    pub fn push(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Restart the buffer at `prefix` when it was not a candidate and the
    /// prefix has just been typed. Returns true if characters were dropped.
    ///
    /// A buffer that already starts with the prefix is never touched, so a
    /// payload may itself contain the prefix.
    pub fn resync(&mut self, prefix: &str) -> bool {
        if self.buffer.starts_with(prefix) || !self.buffer.ends_with(prefix) {
            return false;
        }
        let start = self.buffer.len() - prefix.len();
        self.buffer.drain(..start);
        true
    }

    /// Take the pending timeout so it can be cancelled.
    pub fn take_timer(&mut self) -> Option<TimerId> {
        self.timer.take()
    }

    pub fn set_timer(&mut self, timer: TimerId) {
        self.timer = Some(timer);
    }
}
