//! Scan Module - Barcode scanner detection on a keyboard stream
//!
//! - **Config** - Raw `ScanOptions`, validated `ScanConfig`, the match test
//! - **Session** - Buffer and timer of one scan attempt
//! - **Listener** - Registration, session tracking, deregistration
//! - **Error** - Validation and options-file errors

mod config;
mod error;
mod listener;
mod session;

pub use config::{ScanConfig, ScanOptions, DEFAULT_SCAN_DURATION};
pub use error::{OptionsError, ScanConfigError};
pub use listener::{on_scan, ScanHandler, ScanListener, ScanListenerBuilder};
pub use session::{ScanSession, SessionState};
