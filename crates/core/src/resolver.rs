//! Move resolution - which tiles a click clears, and the removal pipeline
//!
//! Selection is pure: given a board and a tile, [`MoveResolver::resolve_click`]
//! returns the set to clear (a color group, or a special tile's pattern).
//!
//! Application is a small state machine driven by the host loop:
//!
//! ```text
//! Idle --begin--> Removing --all signals (or timeout)--> Settling --settle delay--> Idle
//!                    |                                      |
//!                    | remove_tile() per tile               | move_tile() for relocated tiles
//!                    |                                      | board mutated on entry
//!                                                           v
//!                                              spawn_new_tile() for refills, unlock
//! ```
//!
//! The board is only mutated once every pending removal has completed, and
//! input stays locked until the refills have been dispatched.

use tracing::{debug, warn};

use crate::board::Board;
use crate::presenter::{Presenter, RemovalAck};
use crate::types::{SpecialKind, Tile, REMOVAL_TIMEOUT_MS, SETTLE_DELAY_MS};

/// Radii and timings for a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Chebyshev radius of a `ClearRadius` special tile.
    pub radius_power: u32,
    /// Chebyshev radius of the bomb booster.
    pub radius_booster_power: u32,
    pub settle_delay_ms: u32,
    pub removal_timeout_ms: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            radius_power: crate::types::DEFAULT_RADIUS_POWER,
            radius_booster_power: crate::types::DEFAULT_RADIUS_BOOSTER_POWER,
            settle_delay_ms: SETTLE_DELAY_MS,
            removal_timeout_ms: REMOVAL_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Removing {
        tiles: Vec<Tile>,
        pending: Vec<u32>,
        waited_ms: u32,
    },
    Settling {
        spawned: Vec<Tile>,
        remaining_ms: u32,
    },
}

/// Pipeline progress reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Nothing in flight.
    Idle,
    /// Still waiting on removal signals or the settle delay.
    InFlight,
    /// The resolution finished during this call; input is unlocked.
    Finished,
}

/// All occupied tiles in `row`.
pub fn clear_row(board: &Board, row: i32) -> Vec<Tile> {
    (0..board.cols() as i32)
        .filter_map(|col| board.tile(row, col).copied())
        .collect()
}

/// All occupied tiles in `col`.
pub fn clear_column(board: &Board, col: i32) -> Vec<Tile> {
    (0..board.rows() as i32)
        .filter_map(|row| board.tile(row, col).copied())
        .collect()
}

/// All occupied tiles within Chebyshev distance `power` of (row, col).
pub fn clear_radius(board: &Board, row: i32, col: i32, power: u32) -> Vec<Tile> {
    let power = power.min(i32::MAX as u32 / 4) as i32;
    let r0 = row.saturating_sub(power).max(0);
    let r1 = row.saturating_add(power).min(board.rows() as i32 - 1);
    let c0 = col.saturating_sub(power).max(0);
    let c1 = col.saturating_add(power).min(board.cols() as i32 - 1);

    let mut out = Vec::new();
    for r in r0..=r1 {
        for c in c0..=c1 {
            if let Some(tile) = board.tile(r, c) {
                out.push(*tile);
            }
        }
    }
    out
}

/// Click interpreter and removal pipeline for one session.
#[derive(Debug, Clone)]
pub struct MoveResolver {
    settings: ResolverSettings,
    phase: Phase,
    completed: u64,
}

impl MoveResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            completed: 0,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// True while a resolution is in flight.
    pub fn input_locked(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Resolutions that ran to completion in this session.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Tile ids whose removal signal is still outstanding.
    pub fn pending_removals(&self) -> &[u32] {
        match &self.phase {
            Phase::Removing { pending, .. } => pending,
            _ => &[],
        }
    }

    /// Tiles a click on `tile` would clear (special pattern or color group).
    pub fn resolve_click(&self, board: &Board, tile: &Tile) -> Vec<Tile> {
        if tile.is_special() {
            return self.special_effect(board, tile);
        }
        board.find_group(tile.row, tile.col)
    }

    /// Tiles cleared by activating a special tile.
    pub fn special_effect(&self, board: &Board, tile: &Tile) -> Vec<Tile> {
        match tile.special {
            SpecialKind::ClearRow => clear_row(board, tile.row),
            SpecialKind::ClearColumn => clear_column(board, tile.col),
            SpecialKind::ClearRadius => {
                clear_radius(board, tile.row, tile.col, self.settings.radius_power)
            }
            SpecialKind::None => Vec::new(),
        }
    }

    /// Tiles cleared by the bomb booster at (row, col).
    pub fn clear_booster_radius(&self, board: &Board, row: i32, col: i32) -> Vec<Tile> {
        clear_radius(board, row, col, self.settings.radius_booster_power)
    }

    /// Start a resolution for `tiles`.
    ///
    /// Returns false (and does nothing) if another resolution is in flight or
    /// the set is empty.
    pub fn begin(
        &mut self,
        board: &mut Board,
        tiles: Vec<Tile>,
        presenter: &mut dyn Presenter,
    ) -> bool {
        if self.input_locked() || tiles.is_empty() {
            return false;
        }

        let mut pending = Vec::new();
        for tile in &tiles {
            if presenter.remove_tile(tile) == RemovalAck::Pending {
                pending.push(tile.id);
            }
        }
        debug!(tiles = tiles.len(), pending = pending.len(), "resolution started");

        let ready = pending.is_empty();
        self.phase = Phase::Removing {
            tiles,
            pending,
            waited_ms: 0,
        };
        if ready {
            self.apply(board, presenter);
        }
        true
    }

    /// Record that the removal animation of tile `id` finished.
    ///
    /// Unknown or duplicate ids are ignored.
    pub fn removal_complete(
        &mut self,
        id: u32,
        board: &mut Board,
        presenter: &mut dyn Presenter,
    ) -> Progress {
        match &mut self.phase {
            Phase::Removing { pending, .. } => {
                pending.retain(|&p| p != id);
                if !pending.is_empty() {
                    return Progress::InFlight;
                }
            }
            Phase::Idle => return Progress::Idle,
            Phase::Settling { .. } => return Progress::InFlight,
        }
        self.apply(board, presenter)
    }

    /// Advance timers by `elapsed_ms`.
    pub fn tick(
        &mut self,
        elapsed_ms: u32,
        board: &mut Board,
        presenter: &mut dyn Presenter,
    ) -> Progress {
        match &mut self.phase {
            Phase::Idle => Progress::Idle,
            Phase::Removing {
                pending, waited_ms, ..
            } => {
                *waited_ms = waited_ms.saturating_add(elapsed_ms);
                if *waited_ms >= self.settings.removal_timeout_ms {
                    warn!(
                        outstanding = pending.len(),
                        "removal signals timed out; applying resolution"
                    );
                    return self.apply(board, presenter);
                }
                Progress::InFlight
            }
            Phase::Settling { remaining_ms, .. } => {
                *remaining_ms = remaining_ms.saturating_sub(elapsed_ms);
                if *remaining_ms == 0 {
                    return self.finish(board, presenter);
                }
                Progress::InFlight
            }
        }
    }

    /// Full fan-in reached: mutate the board and dispatch relocations.
    fn apply(&mut self, board: &mut Board, presenter: &mut dyn Presenter) -> Progress {
        let tiles = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Removing { tiles, .. } => tiles,
            other => {
                self.phase = other;
                return self.progress();
            }
        };

        board.remove_tiles(&tiles);
        let changed = board.collapse_and_fill();
        let (spawned, relocated): (Vec<Tile>, Vec<Tile>) =
            changed.into_iter().partition(|t| t.is_new);

        for tile in &relocated {
            presenter.move_tile(tile);
        }
        debug!(
            cleared = tiles.len(),
            relocated = relocated.len(),
            spawned = spawned.len(),
            "board collapsed"
        );

        self.phase = Phase::Settling {
            spawned,
            remaining_ms: self.settings.settle_delay_ms,
        };
        if self.settings.settle_delay_ms == 0 {
            return self.finish(board, presenter);
        }
        Progress::InFlight
    }

    /// Settle delay elapsed: hand refills to presentation and unlock.
    fn finish(&mut self, board: &mut Board, presenter: &mut dyn Presenter) -> Progress {
        let spawned = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Settling { spawned, .. } => spawned,
            other => {
                self.phase = other;
                return self.progress();
            }
        };

        for tile in &spawned {
            presenter.spawn_new_tile(tile);
        }
        board.settle_spawned();
        self.completed += 1;
        debug!(spawned = spawned.len(), "resolution finished");
        Progress::Finished
    }

    fn progress(&self) -> Progress {
        if self.input_locked() {
            Progress::InFlight
        } else {
            Progress::Idle
        }
    }
}

impl Default for MoveResolver {
    fn default() -> Self {
        Self::new(ResolverSettings::default())
    }
}
