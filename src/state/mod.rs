//! State Module - Runtime input state
//!
//! - **Keyboard** - Event types, dispatch, handler registry
//! - **Timers** - Clocks and cancellable timeouts
//! - **Input** - crossterm event conversion and polling
//! - **Global Keys** - Host shortcuts (Ctrl+C)

pub mod global_keys;
pub mod input;
pub mod keyboard;
pub mod timers;

pub use keyboard::{document, KeyHandler, KeyState, Keyboard, KeyboardEvent, Modifiers};
pub use timers::{Clock, ManualClock, SystemClock, TimerId, Timers};
