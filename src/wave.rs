/// Enemy wave generation and the per-stage difficulty tables.

use crate::consts::*;
use crate::entities::{Enemy, EnemyTier};

/// Columns in every wave.
pub const WAVE_COLS: usize = 7;
/// Rows never exceed this, whatever the stage.
pub const MAX_WAVE_ROWS: usize = 7;
const BASE_WAVE_ROWS: usize = 4;

/// Enemy volley delay bounds (ms).
const BASE_FIRE_DELAY_MS: u64 = 900;
const FIRE_DELAY_STEP_MS: u64 = 70;
const MIN_FIRE_DELAY_MS: u64 = 550;

// ── Difficulty tables ────────────────────────────────────────────────────────

/// One extra row every second stage, capped at seven.
pub fn rows_for_stage(stage: u32) -> usize {
    assert!(stage >= 1, "stage numbers start at 1, got {stage}");
    (BASE_WAVE_ROWS + (stage / 2) as usize).min(MAX_WAVE_ROWS)
}

/// Horizontal speed shared by every enemy of the stage.
pub fn enemy_speed_for_stage(stage: u32) -> f32 {
    assert!(stage >= 1, "stage numbers start at 1, got {stage}");
    1.0 + (stage - 1) as f32 * 0.25
}

/// Gap between enemy volleys, shrinking with stage down to a floor.
pub fn fire_delay_ms(stage: u32) -> u64 {
    assert!(stage >= 1, "stage numbers start at 1, got {stage}");
    BASE_FIRE_DELAY_MS
        .saturating_sub(stage as u64 * FIRE_DELAY_STEP_MS)
        .max(MIN_FIRE_DELAY_MS)
}

/// Total width of the enemy grid including per-column padding.
pub fn grid_width() -> f32 {
    WAVE_COLS as f32 * (ENEMY_WIDTH + ENEMY_PAD)
}

// ── Generation ───────────────────────────────────────────────────────────────

/// A freshly generated formation and its fire cadence.
#[derive(Clone, Debug)]
pub struct Wave {
    /// Row-major: row 0 (the elite tier) first.
    pub enemies: Vec<Enemy>,
    pub fire_delay_ms: u64,
}

/// Build the full grid for `stage`, centred in a playfield `playfield_width`
/// wide.  Row 0 is the elite tier.
pub fn generate_wave(stage: u32, playfield_width: f32) -> Wave {
    let rows = rows_for_stage(stage);
    let speed = enemy_speed_for_stage(stage);
    let offset_x = (playfield_width - grid_width()) / 2.0;

    let mut enemies = Vec::with_capacity(rows * WAVE_COLS);
    for row in 0..rows {
        let tier = if row == 0 {
            EnemyTier::Elite
        } else {
            EnemyTier::Drone
        };
        let y = ENEMY_TOP + row as f32 * (ENEMY_HEIGHT + ENEMY_PAD);
        for col in 0..WAVE_COLS {
            let x = offset_x + col as f32 * (ENEMY_WIDTH + ENEMY_PAD);
            enemies.push(Enemy::new(x, y, speed, tier));
        }
    }

    let fire_delay_ms = fire_delay_ms(stage);
    log::info!(
        "Stage {stage}: {rows}x{WAVE_COLS} wave, speed {speed:.2}, fire delay {fire_delay_ms}ms"
    );

    Wave {
        enemies,
        fire_delay_ms,
    }
}
