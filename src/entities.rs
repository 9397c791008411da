/// Game entity types: plain data plus constructors.

use crate::consts::*;
use crate::geometry::{Bounded, Rect};

/// Palette entry carried by every drawable entity.  The front end decides
/// what each tag looks like on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Cyan,
    Yellow,
    Orange,
    Red,
    Green,
    White,
}

/// Explosion sparks pick from this palette.
pub const EXPLOSION_PALETTE: [ColorTag; 3] = [ColorTag::Yellow, ColorTag::Orange, ColorTag::Red];

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub color: ColorTag,
}

impl Player {
    /// Ship centred horizontally near the bottom of the playfield.
    pub fn spawn(playfield_width: f32, playfield_height: f32) -> Self {
        Self {
            x: playfield_width / 2.0 - PLAYER_WIDTH / 2.0,
            y: playfield_height - PLAYER_BOTTOM_OFFSET,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
            color: ColorTag::Cyan,
        }
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A projectile.  `speed` is the signed vertical velocity per tick:
/// negative travels up (player fire), positive travels down (enemy fire).
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub color: ColorTag,
}

impl Bullet {
    /// Fired from the nose of the player's ship.
    pub fn from_player(player: &Player) -> Self {
        Self {
            x: player.x + player.width / 2.0 - BULLET_WIDTH / 2.0,
            y: player.y,
            width: BULLET_WIDTH,
            height: BULLET_HEIGHT,
            speed: -BULLET_SPEED,
            color: ColorTag::Yellow,
        }
    }

    /// Dropped from the underside of an enemy.
    pub fn from_enemy(enemy: &Enemy) -> Self {
        Self {
            x: enemy.x + enemy.width / 2.0 - BULLET_WIDTH / 2.0,
            y: enemy.y + enemy.height,
            width: BULLET_WIDTH,
            height: ENEMY_BULLET_HEIGHT,
            speed: ENEMY_BULLET_SPEED,
            color: ColorTag::Red,
        }
    }
}

impl Bounded for Bullet {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyTier {
    /// Front row: two hits, 30 points.
    Elite,
    /// Every other row: one hit, 10 points.
    Drone,
}

impl EnemyTier {
    pub fn health(&self) -> u32 {
        match self {
            EnemyTier::Elite => 2,
            EnemyTier::Drone => 1,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            EnemyTier::Elite => 30,
            EnemyTier::Drone => 10,
        }
    }

    pub fn color(&self) -> ColorTag {
        match self {
            EnemyTier::Elite => ColorTag::Yellow,
            EnemyTier::Drone => ColorTag::Green,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// +1 moving right, -1 moving left.
    pub direction: f32,
    /// Always > 0 while the enemy is part of the world.
    pub health: u32,
    pub points: u32,
    pub tier: EnemyTier,
    pub color: ColorTag,
}

impl Enemy {
    pub fn new(x: f32, y: f32, speed: f32, tier: EnemyTier) -> Self {
        Self {
            x,
            y,
            width: ENEMY_WIDTH,
            height: ENEMY_HEIGHT,
            speed,
            direction: 1.0,
            health: tier.health(),
            points: tier.points(),
            tier,
            color: tier.color(),
        }
    }
}

impl Bounded for Enemy {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Decoration ────────────────────────────────────────────────────────────────

/// One spark of an explosion burst.  `life` counts down once per tick and
/// the particle is pruned when it reaches zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: ColorTag,
    pub life: u32,
}

impl Bounded for Particle {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, PARTICLE_SIZE, PARTICLE_SIZE)
    }
}

/// Background star; wraps to the top after scrolling off the bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl Bounded for Star {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

// ── Control intent ────────────────────────────────────────────────────────────

/// What the input layer wants this tick.  Input handlers only ever set or
/// clear these flags; the simulation reads them once per frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlIntent {
    pub left: bool,
    pub right: bool,
    /// One-shot: fire a bullet this tick.
    pub fire: bool,
    /// One-shot: toggle pause this tick.
    pub pause: bool,
}

// ── World snapshot ────────────────────────────────────────────────────────────

/// Every entity on the playfield plus the enemy fire schedule.  Cloneable
/// so the pure update functions can return a new copy without mutating the
/// original.
#[derive(Clone, Debug)]
pub struct World {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    /// Timestamp (ms) of the last enemy volley.
    pub last_enemy_shot_ms: u64,
    /// Minimum gap between volleys for the current stage.
    pub enemy_shot_delay_ms: u64,
    pub width: f32,
    pub height: f32,
}

impl World {
    /// An empty playfield with the player in its start position.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            player: Player::spawn(width, height),
            bullets: Vec::new(),
            enemies: Vec::new(),
            enemy_bullets: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            last_enemy_shot_ms: 0,
            enemy_shot_delay_ms: 0,
            width,
            height,
        }
    }
}
