//! Event System - Terminal input and wakeups for the host loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  INPUT THREAD                                       │
//! │  crossterm::poll/read ─── OS wakes on input         │
//! │           │                                         │
//! │           ▼                                         │
//! │  tx.send(AppEvent::Input(ev))                       │
//! └─────────────────────────────────────────────────────┘
//!                       │
//!                       ▼ channel
//! ┌─────────────────────────────────────────────────────┐
//! │  MAIN THREAD                                        │
//! │  channel.wait(next timer deadline)                  │
//! │           │                                         │
//! │           ▼                                         │
//! │  keyboard.dispatch(ev) / timers.run_due()           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The main thread owns every listener and timer; the input thread only
//! forwards raw events, so scan state never crosses threads.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use log::warn;

// =============================================================================
// APP EVENT
// =============================================================================

/// Events that can wake the main thread.
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event (keyboard, mouse, resize, etc.)
    Input(CrosstermEvent),

    /// Stop the event loop.
    ///
    /// Sent when the input thread loses the terminal, or by anyone
    /// holding a sender.
    Stop,
}

/// Outcome of waiting on the channel.
#[derive(Debug)]
pub enum Wait {
    /// An event arrived.
    Event(AppEvent),
    /// The timeout elapsed first.
    TimedOut,
    /// Every sender is gone; no event will ever arrive.
    Closed,
}

// =============================================================================
// EVENT CHANNEL
// =============================================================================

/// Multi-producer channel into the main thread.
pub struct EventChannel {
    /// Sender side - clone this for multiple producers
    pub tx: Sender<AppEvent>,
    /// Receiver side - only main thread should own this
    pub rx: Receiver<AppEvent>,
}

impl EventChannel {
    /// Create a new event channel.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Create a sender clone for another producer.
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }

    /// Block for the next event, at most `timeout` if given.
    ///
    /// Tells a timeout apart from a closed channel.
    pub fn wait(&self, timeout: Option<Duration>) -> Wait {
        match timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(event) => Wait::Event(event),
                Err(RecvTimeoutError::Timeout) => Wait::TimedOut,
                Err(RecvTimeoutError::Disconnected) => Wait::Closed,
            },
            None => match self.rx.recv() {
                Ok(event) => Wait::Event(event),
                Err(_) => Wait::Closed,
            },
        }
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// INPUT THREAD
// =============================================================================

/// Dedicated thread for reading terminal input.
///
/// `crossterm::event::poll()` blocks in the kernel until stdin has data or
/// the shutdown timeout expires; the timeout only bounds how long `stop`
/// waits, it adds no input latency.
pub struct InputThread {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

/// Configuration for the input thread.
#[derive(Clone, Debug)]
pub struct InputThreadConfig {
    /// How often the thread checks its running flag while idle.
    ///
    /// Default: 100ms
    pub shutdown_timeout: Duration,
}

impl Default for InputThreadConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_millis(100),
        }
    }
}

impl InputThread {
    /// Spawn the input thread with default configuration.
    pub fn spawn(event_tx: Sender<AppEvent>) -> io::Result<Self> {
        Self::spawn_with_config(event_tx, InputThreadConfig::default())
    }

    /// Spawn the input thread with custom configuration.
    pub fn spawn_with_config(event_tx: Sender<AppEvent>, config: InputThreadConfig) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::Builder::new()
            .name("scan-input".to_string())
            .spawn(move || {
                Self::run_loop(running_clone, event_tx, config.shutdown_timeout);
            })?;

        Ok(Self {
            handle: Some(handle),
            running,
        })
    }

    fn run_loop(running: Arc<AtomicBool>, tx: Sender<AppEvent>, shutdown_timeout: Duration) {
        while running.load(Ordering::SeqCst) {
            match event::poll(shutdown_timeout) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(AppEvent::Input(ev)).is_err() {
                            // Channel closed, main thread gone
                            break;
                        }
                    }
                    // Might be transient (e.g., signal interrupt)
                    Err(e) => warn!("[scan-input] Read error: {}", e),
                },
                Ok(false) => continue,
                Err(e) => {
                    // Terminal might be disconnected
                    warn!("[scan-input] Poll error: {}", e);
                    let _ = tx.send(AppEvent::Stop);
                    break;
                }
            }
        }
    }

    /// Stop the input thread and wait for it to finish.
    ///
    /// The thread exits within the shutdown timeout.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// TESTS
// =============================================================================
