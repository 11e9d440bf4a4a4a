//! Terminal input module (engine-facing).
//!
//! Independent of any UI framework. Maps `crossterm` key and mouse events
//! into [`InputCommand`]s and tracks the keyboard cursor used to pick a cell.
//! Mouse positions stay in screen coordinates; the view that drew the board
//! translates them to cells.

pub mod cursor;
pub mod map;

pub use tui_match3_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, handle_mouse_event, should_quit, InputCommand};
