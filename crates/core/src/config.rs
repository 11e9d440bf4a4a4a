//! Session configuration
//!
//! A flat set of named numeric options, read once at session start.
//!
//! Resolution order for [`GameConfig::load`]:
//! 1. built-in defaults
//! 2. JSON file named by `MATCH3_CONFIG` (missing keys keep their defaults)
//! 3. `MATCH3_<KEY>` environment overrides, e.g. `MATCH3_ROWS=10`
//! 4. [`GameConfig::validate`]

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardParams;
use crate::player::PlayerSettings;
use crate::resolver::ResolverSettings;
use crate::types::*;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "MATCH3_CONFIG";

/// Prefix for per-key environment overrides.
pub const ENV_PREFIX: &str = "MATCH3_";

/// Largest supported board side.
pub const MAX_BOARD_SIDE: u16 = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board must be between 1x1 and {max}x{max}, got {rows}x{cols}")]
    InvalidDimensions { rows: u16, cols: u16, max: u16 },
    #[error("palette size must be 1..=5, got {0}")]
    InvalidPalette(u8),
    #[error("special tile chance must be 0..=100, got {0}")]
    InvalidChance(u8),
    #[error("score multiplier must be finite and non-negative, got {0}")]
    InvalidMultiplier(f64),
    #[error("move allotment must be positive")]
    NoMoves,
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: String, value: String },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every tunable of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: u16,
    pub cols: u16,
    pub moves: u32,
    pub target_score: u32,
    pub palette_size: u8,
    pub special_tile_chance: u8,
    pub radius_power: u32,
    pub radius_booster_power: u32,
    pub score_by_tile: u32,
    pub score_multiplier: f64,
    pub reroll_count: u32,
    pub bomb_count: u32,
    pub settle_delay_ms: u32,
    pub removal_timeout_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            moves: DEFAULT_MOVES,
            target_score: DEFAULT_TARGET_SCORE,
            palette_size: DEFAULT_PALETTE_SIZE,
            special_tile_chance: DEFAULT_SPECIAL_TILE_CHANCE,
            radius_power: DEFAULT_RADIUS_POWER,
            radius_booster_power: DEFAULT_RADIUS_BOOSTER_POWER,
            score_by_tile: DEFAULT_SCORE_BY_TILE,
            score_multiplier: DEFAULT_SCORE_MULTIPLIER,
            reroll_count: DEFAULT_REROLL_COUNT,
            bomb_count: DEFAULT_BOMB_COUNT,
            settle_delay_ms: SETTLE_DELAY_MS,
            removal_timeout_ms: REMOVAL_TIMEOUT_MS,
        }
    }
}

impl GameConfig {
    /// Defaults, then the optional file, then env overrides, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply `MATCH3_<KEY>` overrides using `lookup` as the environment.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        override_value(&lookup, "ROWS", &mut self.rows)?;
        override_value(&lookup, "COLS", &mut self.cols)?;
        override_value(&lookup, "MOVES", &mut self.moves)?;
        override_value(&lookup, "TARGET_SCORE", &mut self.target_score)?;
        override_value(&lookup, "PALETTE_SIZE", &mut self.palette_size)?;
        override_value(&lookup, "SPECIAL_TILE_CHANCE", &mut self.special_tile_chance)?;
        override_value(&lookup, "RADIUS_POWER", &mut self.radius_power)?;
        override_value(&lookup, "RADIUS_BOOSTER_POWER", &mut self.radius_booster_power)?;
        override_value(&lookup, "SCORE_BY_TILE", &mut self.score_by_tile)?;
        override_value(&lookup, "SCORE_MULTIPLIER", &mut self.score_multiplier)?;
        override_value(&lookup, "REROLL_COUNT", &mut self.reroll_count)?;
        override_value(&lookup, "BOMB_COUNT", &mut self.bomb_count)?;
        override_value(&lookup, "SETTLE_DELAY_MS", &mut self.settle_delay_ms)?;
        override_value(&lookup, "REMOVAL_TIMEOUT_MS", &mut self.removal_timeout_ms)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0
            || self.cols == 0
            || self.rows > MAX_BOARD_SIDE
            || self.cols > MAX_BOARD_SIDE
        {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
                max: MAX_BOARD_SIDE,
            });
        }
        if self.palette_size == 0 || self.palette_size as usize > TileColor::PALETTE.len() {
            return Err(ConfigError::InvalidPalette(self.palette_size));
        }
        if self.special_tile_chance > 100 {
            return Err(ConfigError::InvalidChance(self.special_tile_chance));
        }
        if !self.score_multiplier.is_finite() || self.score_multiplier < 0.0 {
            return Err(ConfigError::InvalidMultiplier(self.score_multiplier));
        }
        if self.moves == 0 {
            return Err(ConfigError::NoMoves);
        }
        Ok(())
    }

    pub fn board_params(&self) -> BoardParams {
        BoardParams {
            rows: self.rows as usize,
            cols: self.cols as usize,
            palette_size: self.palette_size,
            special_tile_chance: self.special_tile_chance,
        }
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            moves: self.moves,
            target_score: self.target_score,
            reroll_count: self.reroll_count,
            bomb_count: self.bomb_count,
            score_by_tile: self.score_by_tile,
            score_multiplier: self.score_multiplier,
        }
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            radius_power: self.radius_power,
            radius_booster_power: self.radius_booster_power,
            settle_delay_ms: self.settle_delay_ms,
            removal_timeout_ms: self.removal_timeout_ms,
        }
    }
}

fn override_value<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    slot: &mut T,
) -> Result<(), ConfigError> {
    let key = format!("{ENV_PREFIX}{name}");
    let Some(raw) = lookup(&key) else {
        return Ok(());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    *slot = trimmed
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value: raw.clone() })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_validate() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rows, 8);
        assert_eq!(config.target_score, 500);
        assert_eq!(config.score_multiplier, 1.5);
        assert_eq!(config.radius_booster_power, 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{"rows": 10, "bomb_count": 1}"#).unwrap();
        assert_eq!(config.rows, 10);
        assert_eq!(config.bomb_count, 1);
        assert_eq!(config.cols, 8);
        assert_eq!(config.moves, 20);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{rows: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GameConfig::default();
        config
            .apply_overrides(env(&[
                ("MATCH3_COLS", "12"),
                ("MATCH3_SCORE_MULTIPLIER", "2.0"),
                ("MATCH3_MOVES", " "),
            ]))
            .unwrap();
        assert_eq!(config.cols, 12);
        assert_eq!(config.score_multiplier, 2.0);
        assert_eq!(config.moves, 20);
    }

    #[test]
    fn test_bad_env_value_reports_key() {
        let mut config = GameConfig::default();
        let err = config
            .apply_overrides(env(&[("MATCH3_ROWS", "lots")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidEnv { key, value } => {
                assert_eq!(key, "MATCH3_ROWS");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_failures() {
        let bad = GameConfig {
            rows: 0,
            ..GameConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidDimensions { .. })));

        let bad = GameConfig {
            palette_size: 6,
            ..GameConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidPalette(6))));

        let bad = GameConfig {
            special_tile_chance: 101,
            ..GameConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidChance(101))));

        let bad = GameConfig {
            score_multiplier: f64::INFINITY,
            ..GameConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidMultiplier(_))));

        let bad = GameConfig {
            moves: 0,
            ..GameConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::NoMoves)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_settings_projection() {
        let config = GameConfig::default();
        assert_eq!(config.board_params().rows, 8);
        assert_eq!(config.player_settings().bomb_count, 3);
        assert_eq!(config.resolver_settings().radius_power, 1);
    }
}
