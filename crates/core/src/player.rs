//! Player progress - moves, score, boosters and win/lose evaluation
//!
//! Scoring rule: clearing `n` tiles through a normal group click awards
//! `round(n * score_by_tile * score_multiplier)`. Rounding is half away from
//! zero, so `4 * 5 * 1.5 = 30` and `3 * 5 * 1.5 = 22.5 -> 23`.
//!
//! All counters saturate at zero: using a move or a booster that is not
//! available is a no-op.

/// Session-start values for a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    pub moves: u32,
    pub target_score: u32,
    pub reroll_count: u32,
    pub bomb_count: u32,
    pub score_by_tile: u32,
    pub score_multiplier: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        use crate::types::*;
        Self {
            moves: DEFAULT_MOVES,
            target_score: DEFAULT_TARGET_SCORE,
            reroll_count: DEFAULT_REROLL_COUNT,
            bomb_count: DEFAULT_BOMB_COUNT,
            score_by_tile: DEFAULT_SCORE_BY_TILE,
            score_multiplier: DEFAULT_SCORE_MULTIPLIER,
        }
    }
}

/// Points for clearing `tiles` tiles.
pub fn calculate_group_score(tiles: usize, score_by_tile: u32, multiplier: f64) -> u32 {
    let raw = (tiles as f64) * (score_by_tile as f64) * multiplier;
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    raw.round().min(u32::MAX as f64) as u32
}

/// Mutable per-session progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    settings: PlayerSettings,
    moves_remaining: u32,
    score: u32,
    rerolls: u32,
    bombs: u32,
    booster_active: bool,
}

impl Player {
    pub fn new(settings: PlayerSettings) -> Self {
        Self {
            settings,
            moves_remaining: settings.moves,
            score: 0,
            rerolls: settings.reroll_count,
            bombs: settings.bomb_count,
            booster_active: false,
        }
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn moves_total(&self) -> u32 {
        self.settings.moves
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target_score(&self) -> u32 {
        self.settings.target_score
    }

    pub fn rerolls(&self) -> u32 {
        self.rerolls
    }

    pub fn rerolls_total(&self) -> u32 {
        self.settings.reroll_count
    }

    pub fn bombs(&self) -> u32 {
        self.bombs
    }

    pub fn bombs_total(&self) -> u32 {
        self.settings.bomb_count
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Spend one move. Returns the moves left (0 and no change when none remain).
    pub fn use_move(&mut self) -> u32 {
        if self.moves_remaining == 0 {
            return 0;
        }
        self.moves_remaining -= 1;
        self.moves_remaining
    }

    /// Add the points for `cleared` tiles. Returns the points added.
    pub fn update_score(&mut self, cleared: usize) -> u32 {
        let gained = calculate_group_score(
            cleared,
            self.settings.score_by_tile,
            self.settings.score_multiplier,
        );
        self.score = self.score.saturating_add(gained);
        gained
    }

    /// Spend a bomb and arm the booster for the next click.
    pub fn use_bomb(&mut self) -> bool {
        if self.bombs == 0 {
            return false;
        }
        self.bombs -= 1;
        self.booster_active = true;
        true
    }

    /// Spend a reroll.
    pub fn use_reroll(&mut self) -> bool {
        if self.rerolls == 0 {
            return false;
        }
        self.rerolls -= 1;
        true
    }

    /// Whether the next click is routed through the bomb radius.
    pub fn booster_active(&self) -> bool {
        self.booster_active
    }

    pub fn deactivate_booster(&mut self) {
        self.booster_active = false;
    }

    pub fn is_win(&self) -> bool {
        self.score >= self.settings.target_score
    }

    pub fn is_lose(&self) -> bool {
        !self.is_win() && self.moves_remaining == 0
    }

    /// Back to session-start values.
    pub fn restart(&mut self) {
        self.moves_remaining = self.settings.moves;
        self.score = 0;
        self.bombs = self.settings.bomb_count;
        self.rerolls = self.settings.reroll_count;
        self.booster_active = false;
    }

    /// Overwrite the score (replays and tests).
    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    /// Overwrite moves left, clamped to the allotment (replays and tests).
    pub fn set_moves_remaining(&mut self, moves: u32) {
        self.moves_remaining = moves.min(self.settings.moves);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlayerSettings::default())
    }
}
