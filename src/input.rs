//! Key and mouse bindings: crossterm events to play-mode input and name-entry keys.

use crate::modes::InputEvent;
use crate::modes::name_entry::NameKey;
use crate::ui::BoardGeometry;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Map a key press to an input event. Supports arrows and vim-style keys.
pub fn key_to_event(key: KeyEvent) -> Option<InputEvent> {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    if !no_mod {
        return None;
    }
    let event = match code {
        KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char('r') => InputEvent::Restart,
        KeyCode::Char('t') => InputEvent::ToggleTheme,
        KeyCode::Char('m') | KeyCode::Tab => InputEvent::SwitchMode,
        KeyCode::Left | KeyCode::Char('h') => InputEvent::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => InputEvent::MoveRight,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('x') => InputEvent::Rotate,
        KeyCode::Char('z') | KeyCode::Char('u') => InputEvent::RotateBack,
        KeyCode::Down | KeyCode::Char('j') => InputEvent::SoftDropStart,
        KeyCode::Enter | KeyCode::Char(' ') => InputEvent::HardDrop,
        _ => return None,
    };
    Some(event)
}

/// Map a key release; only soft drop cares.
pub fn key_release_to_event(key: KeyEvent) -> Option<InputEvent> {
    matches!(key.code, KeyCode::Down | KeyCode::Char('j')).then_some(InputEvent::SoftDropStop)
}

/// Left-button mouse events to pointer events in board cell units.
pub fn mouse_to_event(mouse: MouseEvent, geometry: &BoardGeometry) -> Option<InputEvent> {
    let (x, y) = geometry.to_cells(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerDown { x, y }),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(InputEvent::PointerMove { x, y })
        }
        MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::PointerUp { x, y }),
        _ => None,
    }
}

/// Keys for the name-entry screen.
pub fn key_to_name_key(key: KeyEvent) -> Option<NameKey> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(NameKey::Char(c)),
        KeyCode::Backspace => Some(NameKey::Backspace),
        KeyCode::Enter => Some(NameKey::Confirm),
        KeyCode::Esc => Some(NameKey::Cancel),
        _ => None,
    }
}
