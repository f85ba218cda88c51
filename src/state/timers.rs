//! Timers Module - Cancellable one-shot timeouts on an injected clock
//!
//! Single-threaded timer queue. Nothing fires on its own: the host loop
//! (or a test) calls `run_due` after time has moved on, so timer callbacks
//! are serialized with keyboard dispatch.
//!
//! # Pattern
//!
//! - `set_timeout` schedules a callback `delay` after the clock's now
//! - `clear_timeout` cancels it by id (no-op if already fired)
//! - `run_due` fires everything whose deadline has passed, earliest first
//! - `time_until_next` tells a blocking host how long it may sleep
//!
//! # Example
//!
//! ```ignore
//! use barcode_scan_listener::state::timers::{ManualClock, Timers};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let timers = Timers::new(clock.clone());
//!
//! let id = timers.set_timeout(Duration::from_millis(100), || println!("idle"));
//! clock.tick(&timers, Duration::from_millis(100)); // prints "idle"
//! assert!(!timers.clear_timeout(id));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

// =============================================================================
// CLOCKS
// =============================================================================

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Fake clock that only moves when told to.
///
/// Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without firing anything.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward by `by`, firing due timers at their own deadlines.
    ///
    /// Timers scheduled by a firing callback also fire if they fall inside
    /// the window.
    pub fn tick(&self, timers: &Timers, by: Duration) {
        let target = self.now.get() + by;
        while let Some(deadline) = timers.next_deadline() {
            if deadline > target {
                break;
            }
            if deadline > self.now.get() {
                self.now.set(deadline);
            }
            timers.run_due();
        }
        self.now.set(target);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// =============================================================================
// TIMER QUEUE
// =============================================================================

/// Identifies a scheduled timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    deadline: Duration,
    callback: Box<dyn FnOnce()>,
}

struct TimerQueue {
    pending: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    /// Index of the earliest pending timer; ties go to the first scheduled.
    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by_key(|(_, timer)| (timer.deadline, timer.id.0))
            .map(|(index, _)| index)
    }
}

/// Cancellable one-shot timeouts.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct Timers {
    clock: Rc<dyn Clock>,
    queue: Rc<RefCell<TimerQueue>>,
}

impl Timers {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Rc::new(clock),
            queue: Rc::new(RefCell::new(TimerQueue {
                pending: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Current time on this queue's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Run `callback` once, `delay` from now.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        // Saturates: an unbounded delay just never comes due
        let deadline = self.clock.now().saturating_add(delay);
        let mut queue = self.queue.borrow_mut();
        let id = TimerId(queue.next_id);
        queue.next_id += 1;
        queue.pending.push(Timer {
            id,
            deadline,
            callback: Box::new(callback),
        });
        id
    }

    /// Cancel a pending timeout. Returns false if it already fired or was
    /// cancelled before.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let before = queue.pending.len();
        queue.pending.retain(|timer| timer.id != id);
        queue.pending.len() != before
    }

    /// Fire every timer whose deadline has passed, earliest first.
    /// Returns how many fired.
    pub fn run_due(&self) -> usize {
        let mut fired = 0;
        loop {
            let now = self.clock.now();
            // Pop one timer at a time so callbacks can schedule and cancel
            let due = {
                let mut queue = self.queue.borrow_mut();
                match queue.earliest() {
                    Some(index) if queue.pending[index].deadline <= now => {
                        Some(queue.pending.swap_remove(index))
                    }
                    _ => None,
                }
            };
            match due {
                Some(timer) => {
                    (timer.callback)();
                    fired += 1;
                }
                None => return fired,
            }
        }
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        let queue = self.queue.borrow();
        queue.earliest().map(|index| queue.pending[index].deadline)
    }

    /// How long until the earliest pending timer is due (zero if overdue).
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.clock.now()))
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
