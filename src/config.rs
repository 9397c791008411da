//! Game tunables
//!
//! Defaults reproduce the arcade balance; a JSON file may override any
//! subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield size in simulation units
    pub playfield_width: f32,
    pub playfield_height: f32,
    /// Decorative background stars, fixed for the lifetime of a session object
    pub star_count: usize,
    pub starting_lives: u32,
    /// How long the stage-clear overlay holds the simulation (ms)
    pub stage_clear_ms: u64,
    /// Chance that each enemy fires when a volley is due
    pub enemy_fire_chance: f64,
    /// Sparks per destroyed enemy
    pub explosion_particles: usize,
    /// Ticks a spark survives
    pub particle_life: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            playfield_width: 480.0,
            playfield_height: 640.0,
            star_count: 120,
            starting_lives: 3,
            stage_clear_ms: 1600,
            enemy_fire_chance: 0.25,
            explosion_particles: 15,
            particle_life: 20,
        }
    }
}

impl GameConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let wave_width = crate::wave::grid_width();
        if !(self.playfield_width > wave_width) {
            return Err(ConfigError::Invalid {
                field: "playfield_width",
                reason: format!("must exceed the enemy grid width ({wave_width})"),
            });
        }
        if !(self.playfield_height > crate::consts::PLAYER_BOTTOM_OFFSET) {
            return Err(ConfigError::Invalid {
                field: "playfield_height",
                reason: format!("must exceed {}", crate::consts::PLAYER_BOTTOM_OFFSET),
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid {
                field: "starting_lives",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.enemy_fire_chance) {
            return Err(ConfigError::Invalid {
                field: "enemy_fire_chance",
                reason: format!("{} is outside [0, 1]", self.enemy_fire_chance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{ "starting_lives": 5 }"#).unwrap();
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.star_count, 120);
        assert_eq!(config.stage_clear_ms, 1600);
    }

    #[test]
    fn rejects_bad_fire_chance() {
        let config = GameConfig {
            enemy_fire_chance: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "enemy_fire_chance", .. })
        ));
    }

    #[test]
    fn rejects_narrow_playfield() {
        let config = GameConfig {
            playfield_width: 100.0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
