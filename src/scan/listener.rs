//! Scan Listener - Registration and the scan session tracker
//!
//! A listener subscribes to a keyboard hub and watches the typed characters
//! for scanner bursts: a prefix followed by a payload that passes the value
//! test, typed with no gap longer than the scan duration.
//!
//! # Session lifecycle
//!
//! ```text
//!   Idle ──char──▶ Accumulating ──char──▶ Accumulating (timer rescheduled,
//!                       │                 restarted at the prefix if the
//!                       │                 buffer was not a candidate)
//!                       │
//!                       ├── match + finish_scan_on_match ──▶ handler(payload), Idle
//!                       └── scan duration idle ──▶ handler(payload) if match, Idle
//! ```
//!
//! # Example
//!
//! ```ignore
//! use barcode_scan_listener::scan::{on_scan, ScanOptions};
//! use barcode_scan_listener::state::keyboard;
//! use barcode_scan_listener::state::timers::{SystemClock, Timers};
//!
//! let timers = Timers::new(SystemClock::new());
//! let options = ScanOptions::new().barcode_prefix("L%").barcode_value_test(".*");
//!
//! let listener = on_scan(&keyboard::document(), &timers, &options, |payload| {
//!     println!("scanned {payload}");
//! })?;
//!
//! // Later:
//! listener.remove();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use super::config::{ScanConfig, ScanOptions};
use super::error::ScanConfigError;
use super::session::{ScanSession, SessionState};
use crate::state::keyboard::Keyboard;
use crate::state::timers::{TimerId, Timers};

/// Callback receiving the decoded payload of a completed scan.
pub type ScanHandler = Rc<dyn Fn(&str)>;

// =============================================================================
// TRACKER
// =============================================================================

/// Per-registration state: config, handler and the current session.
struct Tracker {
    config: ScanConfig,
    handler: ScanHandler,
    timers: Timers,
    session: RefCell<Option<ScanSession>>,
    removed: Cell<bool>,
}

impl Tracker {
    /// Buffer one typed character and evaluate the buffer.
    fn on_char(self: &Rc<Self>, c: char) {
        if self.removed.get() {
            return;
        }

        let finished = {
            let mut slot = self.session.borrow_mut();
            let session = slot.get_or_insert_with(|| {
                debug!("scan session started (prefix {:?})", self.config.prefix());
                ScanSession::default()
            });
            session.push(c);
            if session.resync(self.config.prefix()) {
                debug!("scan session restarted at prefix {:?}", self.config.prefix());
            }
            trace!("scan buffer {:?}", session.buffer());

            if let Some(timer) = session.take_timer() {
                self.timers.clear_timeout(timer);
            }

            let matched = self.config.decode(session.buffer()).map(str::to_owned);
            match matched {
                Some(payload) if self.config.finish_scan_on_match() => {
                    *slot = None;
                    Some(payload)
                }
                // Intermediate matches wait for the timeout to re-check
                _ => {
                    session.set_timer(self.schedule_timeout());
                    None
                }
            }
        };

        // No borrow held: the handler may remove this listener
        if let Some(payload) = finished {
            debug!("scan finished on match: {payload:?}");
            (self.handler)(&payload);
        }
    }

    fn schedule_timeout(self: &Rc<Self>) -> TimerId {
        let tracker = Rc::downgrade(self);
        self.timers.set_timeout(self.config.scan_duration(), move || {
            if let Some(tracker) = tracker.upgrade() {
                tracker.on_timeout();
            }
        })
    }

    /// The inactivity window elapsed: fire on a match, then go idle.
    fn on_timeout(&self) {
        let Some(session) = self.session.borrow_mut().take() else {
            return;
        };
        if self.removed.get() {
            return;
        }

        match self.config.decode(session.buffer()) {
            Some(payload) => {
                debug!("scan finished on timeout: {payload:?}");
                (self.handler)(payload);
            }
            None => debug!("scan session discarded: {:?}", session.buffer()),
        }
    }

    /// Stop for good: drop the session and its pending timeout.
    fn teardown(&self) {
        self.removed.set(true);
        if let Some(mut session) = self.session.borrow_mut().take() {
            if let Some(timer) = session.take_timer() {
                self.timers.clear_timeout(timer);
            }
        }
    }

    fn state(&self) -> SessionState {
        match *self.session.borrow() {
            Some(_) => SessionState::Accumulating,
            None => SessionState::Idle,
        }
    }
}

// =============================================================================
// LISTENER HANDLE
// =============================================================================

/// Handle to a registered scan listener.
///
/// Dropping the handle does NOT unregister the listener; call `remove`.
pub struct ScanListener {
    tracker: Rc<Tracker>,
    unsubscribe: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl ScanListener {
    /// Start building a listener from raw options.
    pub fn builder(options: &ScanOptions) -> ScanListenerBuilder {
        ScanListenerBuilder {
            config: options.validate(),
            handler: None,
        }
    }

    /// Start building a listener from an already validated config.
    pub fn from_config(config: ScanConfig) -> ScanListenerBuilder {
        ScanListenerBuilder {
            config: Ok(config),
            handler: None,
        }
    }

    /// Unsubscribe from the keyboard and cancel any pending timeout.
    ///
    /// Safe to call more than once, and from inside the scan handler.
    /// No handler call happens after this returns.
    pub fn remove(&self) {
        let unsubscribe = self.unsubscribe.borrow_mut().take();
        if let Some(unsubscribe) = unsubscribe {
            self.tracker.teardown();
            unsubscribe();
            debug!("scan listener removed (prefix {:?})", self.tracker.config.prefix());
        }
    }

    /// Turn the handle into a plain deregistration function.
    pub fn into_remover(self) -> impl FnOnce() {
        move || self.remove()
    }

    /// Whether `remove` has not been called yet.
    pub fn is_active(&self) -> bool {
        self.unsubscribe.borrow().is_some()
    }

    pub fn state(&self) -> SessionState {
        self.tracker.state()
    }

    /// Characters buffered in the current session (empty when idle).
    pub fn buffered(&self) -> String {
        self.tracker
            .session
            .borrow()
            .as_ref()
            .map(|session| session.buffer().to_owned())
            .unwrap_or_default()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.tracker.config
    }
}

impl fmt::Debug for ScanListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanListener")
            .field("config", &self.tracker.config)
            .field("state", &self.state())
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Collects the config and handler for a listener.
pub struct ScanListenerBuilder {
    config: Result<ScanConfig, ScanConfigError>,
    handler: Option<ScanHandler>,
}

impl ScanListenerBuilder {
    /// Function called with each decoded payload.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.handler = Some(Rc::new(handler));
        self
    }

    /// Validate and subscribe to `keyboard`, timing sessions on `timers`.
    ///
    /// Fails before subscribing if the config or handler is invalid.
    pub fn register(self, keyboard: &Keyboard, timers: &Timers) -> Result<ScanListener, ScanConfigError> {
        let config = self.config?;
        let handler = self.handler.ok_or(ScanConfigError::ScanHandler)?;

        debug!(
            "scan listener registered (prefix {:?}, test {:?}, finish on match {}, duration {:?})",
            config.prefix(),
            config.value_test().as_str(),
            config.finish_scan_on_match(),
            config.scan_duration(),
        );

        let tracker = Rc::new(Tracker {
            config,
            handler,
            timers: timers.clone(),
            session: RefCell::new(None),
            removed: Cell::new(false),
        });

        let subscriber = tracker.clone();
        let unsubscribe = keyboard.on(move |event| {
            if let Some(c) = event.char() {
                subscriber.on_char(c);
            }
            false // Other listeners see every keystroke too
        });

        Ok(ScanListener {
            tracker,
            unsubscribe: RefCell::new(Some(unsubscribe)),
        })
    }
}

/// Register a scan listener on `keyboard`.
///
/// Shorthand for `ScanListener::builder(options).handler(handler).register(..)`.
pub fn on_scan<F>(
    keyboard: &Keyboard,
    timers: &Timers,
    options: &ScanOptions,
    handler: F,
) -> Result<ScanListener, ScanConfigError>
where
    F: Fn(&str) + 'static,
{
    ScanListener::builder(options)
        .handler(handler)
        .register(keyboard, timers)
}

// =============================================================================
// TESTS
// =============================================================================
