//! # barcode-scan-listener
//!
//! Detects barcode scanner input in a keyboard event stream.
//!
//! Scanners that emulate a keyboard "type" a whole barcode in a burst far
//! faster than a person can. A scan listener buffers the characters of such
//! a burst, recognizes it by a configured prefix and value test, and calls
//! a handler with the decoded payload once the burst ends.
//!
//! ## Architecture
//!
//! ```text
//! key event → Keyboard hub → listener buffer → timer rescheduled
//!                                   │
//!                 match + finish_scan_on_match │ scan duration idle
//!                                   ▼
//!                         handler(payload) → Idle
//! ```
//!
//! Everything is single-threaded: the keyboard hub and the timer queue are
//! injected, so a host loop (see [`pipeline`]) or a test with a
//! [`ManualClock`](state::timers::ManualClock) decides when time passes.
//!
//! ## Modules
//!
//! - [`scan`] - Options, validation, the scan session tracker
//! - [`state`] - Keyboard hub, timers, crossterm input conversion
//! - [`pipeline`] - Input thread and host loop for terminals

pub mod pipeline;
pub mod scan;
pub mod state;

// Re-export commonly used items
pub use scan::{
    on_scan, ScanConfig, ScanConfigError, ScanHandler, ScanListener, ScanListenerBuilder,
    ScanOptions, SessionState, OptionsError, DEFAULT_SCAN_DURATION,
};

pub use state::{
    document, Clock, KeyState, Keyboard, KeyboardEvent, ManualClock, Modifiers, SystemClock,
    TimerId, Timers,
};

pub use pipeline::{run_loop, AppEvent, EventChannel, InputThread, LoopExit};
