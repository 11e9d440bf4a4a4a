//! Key mapping from terminal events to input commands.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// What a terminal event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Move the keyboard cursor by (rows, cols).
    MoveCursor { dr: i32, dc: i32 },
    /// Click the cell under the keyboard cursor.
    Activate,
    /// Left click at a terminal position (column, row).
    Pointer { x: u16, y: u16 },
    /// A game action that needs no cell.
    Game(GameAction),
}

/// Map keyboard input to commands.
pub fn handle_key_event(key: KeyEvent) -> Option<InputCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        // Cursor
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(InputCommand::MoveCursor { dr: 0, dc: -1 })
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(InputCommand::MoveCursor { dr: 0, dc: 1 })
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(InputCommand::MoveCursor { dr: -1, dc: 0 })
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(InputCommand::MoveCursor { dr: 1, dc: 0 })
        }

        // Click
        KeyCode::Char(' ') | KeyCode::Enter => Some(InputCommand::Activate),

        // Boosters
        KeyCode::Char('b') | KeyCode::Char('B') => Some(InputCommand::Game(GameAction::UseBomb)),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(InputCommand::Game(GameAction::UseReroll)),

        // Prompts
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputCommand::Game(GameAction::Restart)),
        KeyCode::Esc => Some(InputCommand::Game(GameAction::Dismiss)),

        _ => None,
    }
}

/// Map mouse input to commands. Only left-button presses count.
pub fn handle_mouse_event(mouse: MouseEvent) -> Option<InputCommand> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputCommand::Pointer {
            x: mouse.column,
            y: mouse.row,
        }),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_cursor_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(InputCommand::MoveCursor { dr: 0, dc: -1 })
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('L'))),
            Some(InputCommand::MoveCursor { dr: 0, dc: 1 })
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up)),
            Some(InputCommand::MoveCursor { dr: -1, dc: 0 })
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('j'))),
            Some(InputCommand::MoveCursor { dr: 1, dc: 0 })
        );
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(InputCommand::Activate)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('b'))),
            Some(InputCommand::Game(GameAction::UseBomb))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('X'))),
            Some(InputCommand::Game(GameAction::UseReroll))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(InputCommand::Game(GameAction::Restart))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Esc)),
            Some(InputCommand::Game(GameAction::Dismiss))
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut key = KeyEvent::from(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        assert_eq!(handle_key_event(key), None);
    }

    #[test]
    fn test_mouse_left_press_only() {
        let press = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            handle_mouse_event(press),
            Some(InputCommand::Pointer { x: 12, y: 4 })
        );

        let right = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            ..press
        };
        assert_eq!(handle_mouse_event(right), None);

        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            ..press
        };
        assert_eq!(handle_mouse_event(moved), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
