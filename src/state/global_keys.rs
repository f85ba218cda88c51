//! Global Keys Module - Host keyboard shortcuts
//!
//! Provides global key handlers for:
//! - Ctrl+C: Graceful shutdown
//!
//! Raw mode delivers Ctrl+C as a key event instead of a signal, so a host
//! reading the terminal must handle it itself.
//!
//! # Example
//!
//! ```ignore
//! use barcode_scan_listener::state::{global_keys, keyboard};
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let handle = global_keys::setup_global_keys(&keyboard::document(), running.clone());
//!
//! // Later, on cleanup:
//! handle.cleanup();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::keyboard::{Keyboard, Modifiers};

/// Cleanup handle for global key handlers
pub struct GlobalKeysHandle {
    ctrl_c_cleanup: Option<Box<dyn FnOnce()>>,
}

impl GlobalKeysHandle {
    /// Clean up all global key handlers
    pub fn cleanup(mut self) {
        if let Some(cleanup) = self.ctrl_c_cleanup.take() {
            cleanup();
        }
    }
}

/// Set up global key handlers on `keyboard`.
/// Returns a handle for cleanup.
///
/// - **Ctrl+C**: Sets `running` to false and consumes the event
pub fn setup_global_keys(keyboard: &Keyboard, running: Arc<AtomicBool>) -> GlobalKeysHandle {
    let ctrl_c_cleanup = keyboard.on(move |event| {
        if event.modifiers.contains(Modifiers::CTRL) && event.key == "c" {
            running.store(false, Ordering::SeqCst);
            true // Consume
        } else {
            false
        }
    });

    GlobalKeysHandle {
        ctrl_c_cleanup: Some(ctrl_c_cleanup),
    }
}
