//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the tile-matching rules, the removal pipeline and
//! player progress. It has **no dependencies** on rendering, terminals or
//! networking; presentation is reached only through the [`Presenter`] trait.
//!
//! - **Deterministic**: Same seed produces identical boards and refills
//! - **Testable**: Rules are plain functions over a [`Board`]
//! - **Portable**: Runs in the terminal front end, over the adapter, or headless
//!
//! # Module Structure
//!
//! - [`board`]: rows x cols tile grid, group search, gravity and refill
//! - [`resolver`]: click interpretation and the removal/settle state machine
//! - [`player`]: moves, score, boosters, win/lose
//! - [`game`]: orchestrator routing clicks and boosters
//! - [`presenter`]: presentation seam and test presenters
//! - [`config`]: tunables with file/env loading
//! - [`rng`]: seeded LCG and tile factory
//! - [`snapshot`]: read-only view for renderers and the adapter
//!
//! # Rules
//!
//! - A click on a plain tile clears its 4-connected same-color group when it
//!   has at least [`MIN_GROUP_SIZE`](types::MIN_GROUP_SIZE) tiles, costing one move
//! - A click on a special tile clears its row, column or square radius for free
//! - An armed bomb clears a large square radius around the next click for free
//! - Cleared cells are refilled by gravity, then new tiles from above
//!
//! # Example
//!
//! ```
//! use tui_match3_core::{Game, GameConfig, NullPresenter};
//! use tui_match3_types::GameAction;
//!
//! let mut presenter = NullPresenter;
//! let mut game = Game::new(GameConfig::default(), 12345).unwrap();
//! game.start(&mut presenter);
//!
//! game.apply_action(GameAction::UseBomb, &mut presenter);
//! game.apply_action(GameAction::Click { row: 4, col: 4 }, &mut presenter);
//! assert!(game.input_locked());
//!
//! game.settle(&mut presenter);
//! assert!(!game.input_locked());
//! assert!(game.board().is_full());
//! ```
//!
//! # Timing
//!
//! Nothing here reads a clock. The host calls [`Game::tick`] with elapsed
//! milliseconds and forwards removal completion signals through
//! [`Game::removal_complete`].

pub mod board;
pub mod config;
pub mod game;
pub mod player;
pub mod presenter;
pub mod resolver;
pub mod rng;
pub mod snapshot;

pub use tui_match3_types as types;

pub use board::{Board, BoardParams};
pub use config::{ConfigError, GameConfig};
pub use game::{ClearKind, ClickOutcome, Game, IgnoreReason};
pub use player::{calculate_group_score, Player, PlayerSettings};
pub use presenter::{NullPresenter, Presenter, PresenterEvent, RecordingPresenter, RemovalAck};
pub use resolver::{clear_column, clear_radius, clear_row, MoveResolver, Progress, ResolverSettings};
pub use rng::{SimpleRng, TileFactory};
pub use snapshot::GameSnapshot;
