//! Presentation seam.
//!
//! The core never renders or waits on animations. It tells a [`Presenter`]
//! what happened to which tile and, for removals, either gets a synchronous
//! acknowledgement or a later completion signal through
//! [`Game::removal_complete`](crate::game::Game::removal_complete).

use crate::types::Tile;

/// Result of asking the presenter to remove a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalAck {
    /// Removal finished (or needs no animation); do not wait for a signal.
    Done,
    /// An animation is running; completion will be signalled by tile id.
    Pending,
}

/// Consumer of tile events.
pub trait Presenter {
    /// A tile exists at its current position (initial board).
    fn create_tile(&mut self, tile: &Tile);

    /// A tile is being cleared.
    fn remove_tile(&mut self, tile: &Tile) -> RemovalAck;

    /// An existing tile fell to its current position.
    fn move_tile(&mut self, tile: &Tile);

    /// A refill tile enters from above the top row and lands at its position.
    fn spawn_new_tile(&mut self, tile: &Tile);
}

/// Presenter that ignores everything and completes removals immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn create_tile(&mut self, _tile: &Tile) {}

    fn remove_tile(&mut self, _tile: &Tile) -> RemovalAck {
        RemovalAck::Done
    }

    fn move_tile(&mut self, _tile: &Tile) {}

    fn spawn_new_tile(&mut self, _tile: &Tile) {}
}

/// One recorded presenter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterEvent {
    Create(Tile),
    Remove(Tile),
    Move(Tile),
    Spawn(Tile),
}

/// Presenter that records every call, for tests and headless tooling.
///
/// With `defer_removals` set, removals answer [`RemovalAck::Pending`] and the
/// caller is expected to signal completion itself.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
    pub defer_removals: bool,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferring() -> Self {
        Self {
            events: Vec::new(),
            defer_removals: true,
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn removed(&self) -> Vec<Tile> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Remove(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn moved(&self) -> Vec<Tile> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Move(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn spawned(&self) -> Vec<Tile> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Spawn(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresenterEvent::Create(_)))
            .count()
    }
}

impl Presenter for RecordingPresenter {
    fn create_tile(&mut self, tile: &Tile) {
        self.events.push(PresenterEvent::Create(*tile));
    }

    fn remove_tile(&mut self, tile: &Tile) -> RemovalAck {
        self.events.push(PresenterEvent::Remove(*tile));
        if self.defer_removals {
            RemovalAck::Pending
        } else {
            RemovalAck::Done
        }
    }

    fn move_tile(&mut self, tile: &Tile) {
        self.events.push(PresenterEvent::Move(*tile));
    }

    fn spawn_new_tile(&mut self, tile: &Tile) {
        self.events.push(PresenterEvent::Spawn(*tile));
    }
}
