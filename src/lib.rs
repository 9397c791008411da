//! Galaxy Shooter - a descending-wave arcade shooter
//!
//! Core modules:
//! - `geometry`: axis-aligned rectangle overlap
//! - `entities`: player, bullets, enemies, particles, stars (pure data)
//! - `wave`: per-stage enemy grid generation
//! - `compute`: per-tick simulation step
//! - `collision`: hit detection, damage and explosions
//! - `session`: game lifecycle state machine
//! - `render`: draws a world snapshot onto an injected target
//! - `score_store`: best-effort score persistence
//! - `high_score`: locally persisted best score

pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod high_score;
pub mod render;
pub mod score_store;
pub mod session;
pub mod wave;

pub use config::GameConfig;
pub use error::{ConfigError, StoreError};
pub use geometry::{intersects, Rect};
pub use session::{GameObserver, GameSession, Phase, SessionIdentity};

/// Fixed gameplay constants (playfield units, per-tick speeds)
pub mod consts {
    /// Player ship
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 28.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Distance from the playfield bottom to the ship's top edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 60.0;

    /// Player bullets travel up, enemy bullets down
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 12.0;
    pub const BULLET_SPEED: f32 = 9.0;
    pub const ENEMY_BULLET_HEIGHT: f32 = 10.0;
    pub const ENEMY_BULLET_SPEED: f32 = 3.5;

    /// Enemy grid
    pub const ENEMY_WIDTH: f32 = 35.0;
    pub const ENEMY_HEIGHT: f32 = 28.0;
    pub const ENEMY_PAD: f32 = 12.0;
    pub const ENEMY_TOP: f32 = 60.0;
    /// Downward step of the whole formation on a wall bounce
    pub const FORMATION_STEP_DOWN: f32 = 18.0;

    /// Background
    pub const STAR_DRIFT: f32 = 0.6;
    pub const STAR_MAX_SIZE: f32 = 2.0;

    /// Particles are drawn as fixed squares
    pub const PARTICLE_SIZE: f32 = 3.0;
}
