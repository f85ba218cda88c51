//! Input Module - Event conversion and routing
//!
//! Bridges crossterm's event system with the keyboard hub. The host loop
//! receives raw events from the input thread and routes them here.
//!
//! # API
//!
//! - `convert_key_event` - Convert crossterm KeyEvent to our KeyboardEvent
//! - `convert_event` - Convert any crossterm event to an InputEvent
//! - `route_event` - Dispatch event to a keyboard hub

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers,
};

use super::keyboard::{KeyState, Keyboard, KeyboardEvent, Modifiers};

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Terminal input as seen by the scanner host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Keyboard event (key press, release, etc.)
    Key(KeyboardEvent),
    /// Anything else (mouse, resize, focus, paste)
    None,
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        // Not a typed character, unlike Tab
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    let mut modifiers = convert_modifiers(event.modifiers);
    if event.code == KeyCode::BackTab {
        modifiers |= Modifiers::SHIFT;
    }

    KeyboardEvent {
        key,
        modifiers,
        state,
    }
}

/// Convert crossterm KeyModifiers to our Modifiers
fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut modifiers = Modifiers::NONE;
    if mods.contains(KeyModifiers::CONTROL) {
        modifiers |= Modifiers::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        modifiers |= Modifiers::ALT;
    }
    if mods.contains(KeyModifiers::SHIFT) {
        modifiers |= Modifiers::SHIFT;
    }
    if mods.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        modifiers |= Modifiers::META;
    }
    modifiers
}

/// Convert any crossterm event; non-key events become `InputEvent::None`.
pub fn convert_event(event: CrosstermEvent) -> InputEvent {
    match event {
        CrosstermEvent::Key(key) => InputEvent::Key(convert_key_event(key)),
        _ => InputEvent::None,
    }
}

// =============================================================================
// EVENT ROUTING
// =============================================================================

/// Route an event to the keyboard hub.
/// Returns true if any handler consumed the event.
pub fn route_event(keyboard: &Keyboard, event: InputEvent) -> bool {
    match event {
        InputEvent::Key(key) => keyboard.dispatch(key),
        InputEvent::None => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_convert_char() {
        let event = convert_key_event(key(KeyCode::Char('7'), KeyModifiers::NONE, KeyEventKind::Press));
        assert_eq!(event.key, "7");
        assert_eq!(event.state, KeyState::Press);
        assert_eq!(event.char(), Some('7'));
    }

    #[test]
    fn test_convert_enter_types_carriage_return() {
        let event = convert_key_event(key(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Press));
        assert_eq!(event.key, "Enter");
        assert_eq!(event.char(), Some('\r'));
    }

    #[test]
    fn test_convert_modifiers() {
        let event = convert_key_event(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            KeyEventKind::Press,
        ));
        assert!(event.modifiers.contains(Modifiers::CTRL | Modifiers::SHIFT));
        assert!(!event.modifiers.contains(Modifiers::ALT));
        assert_eq!(event.char(), None);
    }

    #[test]
    fn test_convert_back_tab_is_not_a_character() {
        let event = convert_key_event(key(KeyCode::BackTab, KeyModifiers::SHIFT, KeyEventKind::Press));
        assert_eq!(event.key, "BackTab");
        assert!(event.modifiers.contains(Modifiers::SHIFT));
        assert_eq!(event.char(), None);

        let event = convert_key_event(key(KeyCode::Tab, KeyModifiers::NONE, KeyEventKind::Press));
        assert_eq!(event.char(), Some('\t'));
    }

    #[test]
    fn test_convert_release() {
        let event = convert_key_event(key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release));
        assert_eq!(event.state, KeyState::Release);
    }

    #[test]
    fn test_non_key_events_are_none() {
        let mouse = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(convert_event(mouse), InputEvent::None);
        assert_eq!(convert_event(CrosstermEvent::Resize(80, 24)), InputEvent::None);
    }

    #[test]
    fn test_route_event() {
        let keyboard = Keyboard::new();
        let _cleanup = keyboard.on(|event| event.key == "x");

        assert!(route_event(&keyboard, InputEvent::Key(KeyboardEvent::new("x"))));
        assert!(!route_event(&keyboard, InputEvent::None));
        assert_eq!(keyboard.last_key(), "x");
    }
}
