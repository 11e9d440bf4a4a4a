use crate::types::{GameStatus, Tile};

/// Read-only view of a session for renderers and the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cells. A newly spawned tile keeps `is_new` until it has been
    /// handed to presentation.
    pub cells: Vec<Option<Tile>>,
    pub moves_remaining: u32,
    pub moves_total: u32,
    pub score: u32,
    pub target_score: u32,
    pub rerolls: u32,
    pub bombs: u32,
    pub booster_active: bool,
    pub input_locked: bool,
    pub status: GameStatus,
    /// Whether any click could clear something right now.
    pub has_available_move: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub resolutions: u64,
}

impl GameSnapshot {
    pub fn cell(&self, row: usize, col: usize) -> Option<&Tile> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).and_then(|c| c.as_ref())
    }

    /// Accepting clicks right now.
    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing && !self.input_locked && self.moves_remaining > 0
    }

    /// Values that change whenever a player-visible counter changes.
    pub fn progress_key(&self) -> (u32, u32, u32, u32, bool, GameStatus) {
        (
            self.moves_remaining,
            self.score,
            self.rerolls,
            self.bombs,
            self.booster_active,
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileColor;

    #[test]
    fn test_cell_lookup_bounds() {
        let snap = GameSnapshot {
            rows: 1,
            cols: 2,
            cells: vec![Some(Tile::new(1, 0, 0, TileColor::Red)), None],
            moves_remaining: 1,
            ..GameSnapshot::default()
        };
        assert_eq!(snap.cell(0, 0).map(|t| t.color), Some(TileColor::Red));
        assert!(snap.cell(0, 1).is_none());
        assert!(snap.cell(1, 0).is_none());
        assert!(snap.playable());
    }

    #[test]
    fn test_not_playable_when_locked_or_over() {
        let mut snap = GameSnapshot {
            moves_remaining: 3,
            ..GameSnapshot::default()
        };
        snap.input_locked = true;
        assert!(!snap.playable());
        snap.input_locked = false;
        snap.status = GameStatus::Lost;
        assert!(!snap.playable());
    }
}
