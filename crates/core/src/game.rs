//! Game orchestrator - routes input to the resolver and keeps score
//!
//! This module ties together the board, the move resolver and player progress.
//! It decides which resolution path a click takes, consumes moves and awards
//! score, and evaluates win/lose after every successful resolution.
//!
//! Click routing, in priority order:
//! 1. bomb booster armed: booster radius around the clicked cell (free)
//! 2. special tile: its row/column/radius pattern (free)
//! 3. plain tile: its color group, if at least [`MIN_GROUP_SIZE`] tiles;
//!    costs one move and scores `round(n * score_by_tile * multiplier)`

use tracing::{debug, info};

use crate::board::Board;
use crate::config::{ConfigError, GameConfig};
use crate::player::Player;
use crate::presenter::Presenter;
use crate::resolver::{MoveResolver, Progress};
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Why a click did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A resolution is still in flight.
    Locked,
    NoMoves,
    /// A win/lose prompt is showing.
    Prompt,
    /// Out of bounds or empty cell.
    EmptyCell,
    GroupTooSmall,
}

/// Which rule cleared the tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearKind {
    Group,
    Special(SpecialKind),
    Booster,
}

/// Result of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored(IgnoreReason),
    Resolved {
        kind: ClearKind,
        cleared: usize,
        score_gained: u32,
    },
}

impl ClickOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ClickOutcome::Resolved { .. })
    }
}

/// One play session.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    player: Player,
    resolver: MoveResolver,
    status: GameStatus,
    /// Restart asked for while a resolution was in flight.
    restart_pending: bool,
    /// `has_available_move` as of `move_hint_revision`.
    move_hint: bool,
    move_hint_revision: u64,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    started: bool,
}

impl Game {
    /// Create a new game with the given RNG seed
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.board_params(), seed);
        Ok(Self::assemble(config, board))
    }

    /// Create a game around a prepared board (dimensions come from the board).
    pub fn with_board(config: GameConfig, board: Board) -> Result<Self, ConfigError> {
        let config = GameConfig {
            rows: board.rows() as u16,
            cols: board.cols() as u16,
            ..config
        };
        config.validate()?;
        Ok(Self::assemble(config, board))
    }

    fn assemble(config: GameConfig, board: Board) -> Self {
        let move_hint = board.has_available_move(MIN_GROUP_SIZE);
        let move_hint_revision = board.revision();
        Self {
            player: Player::new(config.player_settings()),
            resolver: MoveResolver::new(config.resolver_settings()),
            config,
            board,
            status: GameStatus::Playing,
            restart_pending: false,
            move_hint,
            move_hint_revision,
            episode_id: 0,
            started: false,
        }
    }

    /// Hand the initial board to presentation. Only the first call has effect.
    pub fn start(&mut self, presenter: &mut dyn Presenter) {
        if self.started {
            return;
        }
        self.started = true;
        for tile in self.board.tiles() {
            presenter.create_tile(tile);
        }
        info!(
            rows = self.board.rows(),
            cols = self.board.cols(),
            seed = self.board.seed(),
            "game started"
        );
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable progress access (replays and tests).
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn resolver(&self) -> &MoveResolver {
        &self.resolver
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn input_locked(&self) -> bool {
        self.resolver.input_locked()
    }

    /// A restart is queued behind the in-flight resolution.
    pub fn restart_pending(&self) -> bool {
        self.restart_pending
    }

    /// Whether any click could clear something on the current board.
    pub fn has_available_move(&self) -> bool {
        self.move_hint
    }

    /// Handle a click on (row, col).
    pub fn click(&mut self, row: i32, col: i32, presenter: &mut dyn Presenter) -> ClickOutcome {
        if self.status != GameStatus::Playing {
            return ClickOutcome::Ignored(IgnoreReason::Prompt);
        }
        if self.resolver.input_locked() {
            return ClickOutcome::Ignored(IgnoreReason::Locked);
        }
        if self.player.moves_remaining() == 0 {
            return ClickOutcome::Ignored(IgnoreReason::NoMoves);
        }
        let Some(tile) = self.board.tile(row, col).copied() else {
            return ClickOutcome::Ignored(IgnoreReason::EmptyCell);
        };

        let (kind, tiles) = if self.player.booster_active() {
            (
                ClearKind::Booster,
                self.resolver.clear_booster_radius(&self.board, row, col),
            )
        } else if tile.is_special() {
            (
                ClearKind::Special(tile.special),
                self.resolver.special_effect(&self.board, &tile),
            )
        } else {
            let group = self.board.find_group(row, col);
            if group.len() < MIN_GROUP_SIZE {
                return ClickOutcome::Ignored(IgnoreReason::GroupTooSmall);
            }
            (ClearKind::Group, group)
        };

        let cleared = tiles.len();
        if !self.resolver.begin(&mut self.board, tiles, presenter) {
            return ClickOutcome::Ignored(IgnoreReason::EmptyCell);
        }
        self.refresh_move_hint();

        let mut score_gained = 0;
        if kind == ClearKind::Group {
            self.player.use_move();
            score_gained = self.player.update_score(cleared);
        }
        self.player.deactivate_booster();
        debug!(row, col, ?kind, cleared, score_gained, "click resolved");

        self.evaluate_outcome();
        ClickOutcome::Resolved {
            kind,
            cleared,
            score_gained,
        }
    }

    /// Arm the bomb for the next click.
    pub fn use_bomb(&mut self) -> bool {
        if !self.booster_allowed() {
            return false;
        }
        if !self.player.use_bomb() {
            return false;
        }
        info!(bombs_left = self.player.bombs(), "bomb armed");
        true
    }

    /// Replace every tile on the board.
    pub fn use_reroll(&mut self, presenter: &mut dyn Presenter) -> bool {
        if !self.booster_allowed() || self.player.rerolls() == 0 {
            return false;
        }
        let tiles: Vec<Tile> = self.board.tiles().copied().collect();
        if !self.resolver.begin(&mut self.board, tiles, presenter) {
            return false;
        }
        self.refresh_move_hint();
        self.player.use_reroll();
        info!(rerolls_left = self.player.rerolls(), "board rerolled");
        true
    }

    /// Reset progress and replace every tile.
    ///
    /// While a resolution is in flight the restart is queued and runs as soon
    /// as that resolution finishes.
    pub fn restart(&mut self, presenter: &mut dyn Presenter) -> bool {
        if self.resolver.input_locked() {
            if !self.restart_pending {
                debug!("restart queued behind resolution");
            }
            self.restart_pending = true;
            return true;
        }
        self.restart_pending = false;
        let tiles: Vec<Tile> = self.board.tiles().copied().collect();
        self.player.restart();
        self.status = GameStatus::Playing;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.resolver.begin(&mut self.board, tiles, presenter);
        self.refresh_move_hint();
        info!(episode = self.episode_id, "game restarted");
        true
    }

    /// Close the win prompt and keep playing. A lose prompt stays until restart.
    ///
    /// The prompt re-opens after the next resolution while the score still
    /// meets the target.
    pub fn dismiss(&mut self) -> bool {
        if self.status != GameStatus::Won || self.player.moves_remaining() == 0 {
            return false;
        }
        self.status = GameStatus::Playing;
        true
    }

    /// Apply a game action. Returns whether anything happened.
    pub fn apply_action(&mut self, action: GameAction, presenter: &mut dyn Presenter) -> bool {
        match action {
            GameAction::Click { row, col } => self.click(row, col, presenter).is_resolved(),
            GameAction::UseBomb => self.use_bomb(),
            GameAction::UseReroll => self.use_reroll(presenter),
            GameAction::Restart => self.restart(presenter),
            GameAction::Dismiss => self.dismiss(),
        }
    }

    /// Forward a removal completion signal from presentation.
    pub fn removal_complete(&mut self, id: u32, presenter: &mut dyn Presenter) -> Progress {
        let progress = self.resolver.removal_complete(id, &mut self.board, presenter);
        self.after_progress(presenter);
        progress
    }

    /// Advance the resolution timers by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32, presenter: &mut dyn Presenter) -> Progress {
        let progress = self.resolver.tick(elapsed_ms, &mut self.board, presenter);
        self.after_progress(presenter);
        progress
    }

    fn after_progress(&mut self, presenter: &mut dyn Presenter) {
        self.refresh_move_hint();
        if self.restart_pending && !self.resolver.input_locked() {
            self.restart(presenter);
        }
    }

    fn refresh_move_hint(&mut self) {
        let revision = self.board.revision();
        if revision != self.move_hint_revision {
            self.move_hint = self.board.has_available_move(MIN_GROUP_SIZE);
            self.move_hint_revision = revision;
        }
    }

    /// Drive the in-flight resolution to completion, assuming every removal
    /// signal arrives now. Used by headless callers with no animation clock.
    ///
    /// A queued restart is driven to completion as well.
    pub fn settle(&mut self, presenter: &mut dyn Presenter) {
        // At most the current resolution plus one queued restart.
        for _ in 0..2 {
            if !self.resolver.input_locked() {
                break;
            }
            let pending: Vec<u32> = self.resolver.pending_removals().to_vec();
            for id in pending {
                self.removal_complete(id, presenter);
            }
            if self.resolver.input_locked() && self.resolver.pending_removals().is_empty() {
                let delay = self.config.settle_delay_ms.max(1);
                self.tick(delay, presenter);
            }
        }
    }

    fn booster_allowed(&self) -> bool {
        self.status == GameStatus::Playing
            && !self.resolver.input_locked()
            && !self.player.booster_active()
    }

    fn evaluate_outcome(&mut self) {
        if self.player.is_win() {
            self.status = GameStatus::Won;
            info!(score = self.player.score(), "player won");
            return;
        }
        if self.player.is_lose() {
            self.status = GameStatus::Lost;
            info!(score = self.player.score(), "player lost");
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.rows = self.board.rows();
        out.cols = self.board.cols();
        out.cells.clear();
        out.cells.extend_from_slice(self.board.cells());
        out.moves_remaining = self.player.moves_remaining();
        out.moves_total = self.player.moves_total();
        out.score = self.player.score();
        out.target_score = self.player.target_score();
        out.rerolls = self.player.rerolls();
        out.bombs = self.player.bombs();
        out.booster_active = self.player.booster_active();
        out.input_locked = self.resolver.input_locked();
        out.status = self.status;
        out.has_available_move = self.move_hint;
        out.episode_id = self.episode_id;
        out.seed = self.board.seed();
        out.resolutions = self.resolver.completed();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
