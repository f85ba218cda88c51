//! Keyboard Module - Keyboard event types and handler registry
//!
//! A `Keyboard` is an event hub: hosts push events into it with `dispatch`,
//! subscribers register with `on` and get back a cleanup closure.
//! It does NOT own stdin (see `state::input` and `pipeline::events`).
//!
//! # API
//!
//! - `Keyboard::new()` - Create an isolated hub (tests, embedded hosts)
//! - `document()` - The thread's shared hub
//! - `on(handler)` - Subscribe to all keyboard events
//! - `dispatch(event)` - Deliver an event to every subscriber
//! - `last_event` / `last_key` - The last event, as a plain value
//! - `last_event_signal` - The same, as a signal effects can track
//!
//! # Example
//!
//! ```ignore
//! use barcode_scan_listener::state::keyboard::{Keyboard, KeyboardEvent};
//!
//! let keyboard = Keyboard::new();
//! let cleanup = keyboard.on(|event| {
//!     println!("Key: {}", event.key);
//!     false // Don't consume
//! });
//!
//! keyboard.dispatch(KeyboardEvent::new("a"));
//! cleanup();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

// =============================================================================
// TYPES
// =============================================================================

bitflags::bitflags! {
    /// Keyboard modifier state.
    ///
    /// Combine with bitwise OR: `Modifiers::CTRL | Modifiers::SHIFT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
        const META = 1 << 3;
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Create the key press that types `c`.
    ///
    /// Carriage return and tab map to their named keys, so
    /// `from_char(c).char() == Some(c)` for every character.
    pub fn from_char(c: char) -> Self {
        match c {
            '\r' => Self::new("Enter"),
            '\t' => Self::new("Tab"),
            c => Self::new(c.to_string()),
        }
    }

    /// Create a key press from a character code, as delivered by
    /// keypress-style event sources. `None` for invalid code points.
    pub fn from_char_code(code: u32) -> Option<Self> {
        char::from_u32(code).map(Self::from_char)
    }

    /// Check if this is a press event
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// The character this key press types, if any.
    ///
    /// Ctrl/Alt chords and named keys other than Enter and Tab type nothing.
    pub fn char(&self) -> Option<char> {
        if self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return None;
        }
        match self.key.as_str() {
            "Enter" => Some('\r'),
            "Tab" => Some('\t'),
            key => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
        }
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    handlers: Vec<(usize, KeyHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// =============================================================================
// KEYBOARD HUB
// =============================================================================

/// A keyboard event stream with its subscribers.
///
/// Cloning yields another handle to the same hub.
#[derive(Clone)]
pub struct Keyboard {
    registry: Rc<RefCell<HandlerRegistry>>,
    last_event: Signal<Option<KeyboardEvent>>,
}

impl Keyboard {
    /// Create an empty hub with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(HandlerRegistry::new())),
            last_event: signal(None),
        }
    }

    /// Subscribe to all keyboard events.
    /// Return true from handler to consume the event.
    /// Returns cleanup function.
    pub fn on<F>(&self, handler: F) -> Box<dyn FnOnce()>
    where
        F: Fn(&KeyboardEvent) -> bool + 'static,
    {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            reg.handlers.push((id, Rc::new(handler)));
            id
        };

        // The cleanup must not keep the hub alive
        let registry: Weak<RefCell<HandlerRegistry>> = Rc::downgrade(&self.registry);
        Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .handlers
                    .retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    /// Dispatch a keyboard event to all registered handlers.
    /// Returns true if any handler consumed the event.
    ///
    /// Handlers run in registration order against a snapshot of the
    /// registry, so a handler may subscribe or unsubscribe while running.
    pub fn dispatch(&self, event: KeyboardEvent) -> bool {
        self.last_event.set(Some(event.clone()));

        // Only dispatch press events to handlers
        if !event.is_press() {
            return false;
        }

        let handlers: Vec<(usize, KeyHandler)> = self.registry.borrow().handlers.clone();
        for (id, handler) in handlers {
            // Skip handlers removed by an earlier handler during this dispatch
            let live = self
                .registry
                .borrow()
                .handlers
                .iter()
                .any(|(handler_id, _)| *handler_id == id);
            if live && handler(&event) {
                return true;
            }
        }
        false
    }

    /// Type every character of `text` as consecutive key presses.
    pub fn type_str(&self, text: &str) {
        for c in text.chars() {
            self.dispatch(KeyboardEvent::from_char(c));
        }
    }

    /// Number of live subscribers.
    pub fn handler_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    /// Get the last keyboard event
    pub fn last_event(&self) -> Option<KeyboardEvent> {
        self.last_event.get()
    }

    /// Get the last key pressed
    pub fn last_key(&self) -> String {
        self.last_event().map(|e| e.key).unwrap_or_default()
    }

    /// Signal updated on every dispatch, press or not.
    ///
    /// Effects reading it re-run per keystroke without subscribing a handler.
    pub fn last_event_signal(&self) -> Signal<Option<KeyboardEvent>> {
        self.last_event.clone()
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// DOCUMENT HUB
// =============================================================================

thread_local! {
    static DOCUMENT: Keyboard = Keyboard::new();
}

/// The thread's shared keyboard hub.
///
/// Hosts that read a single terminal feed this one; every listener
/// registered on it sees every keystroke.
pub fn document() -> Keyboard {
    DOCUMENT.with(|k| k.clone())
}

// =============================================================================
// TESTS
// =============================================================================
