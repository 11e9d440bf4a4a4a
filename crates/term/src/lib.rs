//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids widget
//! toolkits and renders into a plain framebuffer that is diffed and flushed
//! to the terminal.
//!
//! - [`fb`]: styled character framebuffer
//! - [`game_view`]: board, side panel and prompts from a snapshot
//! - [`presenter`]: animated [`Presenter`](crate::core::Presenter) for the board
//! - [`renderer`]: raw-mode terminal output with diff encoding

pub mod fb;
pub mod game_view;
pub mod presenter;
pub mod renderer;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_glyph, tile_rgb, AdapterStatusView, AnchorY, FrameExtras, GameView, Viewport};
pub use presenter::{AnimTimings, Motion, Sprite, TerminalPresenter};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
