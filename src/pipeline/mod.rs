//! Pipeline Module - Real-time host for the scan listeners
//!
//! - **Events** - Event channel and the terminal input thread
//! - **Run** - The loop dispatching key events and firing timers

pub mod events;
pub mod run;

pub use events::{AppEvent, EventChannel, InputThread, InputThreadConfig, Wait};
pub use run::{run_loop, LoopExit};
