/// Pure per-tick simulation functions.
///
/// Every public function takes an immutable reference to the current
/// `World` (and, where needed, an RNG handle) and returns a brand-new
/// `World`.  Side effects are limited to the injected RNG.

use rand::Rng;

use crate::config::GameConfig;
use crate::consts::*;
use crate::entities::{Bullet, ControlIntent, Enemy, Particle, Player, Star, World};
use crate::wave::generate_wave;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Empty playfield with a fresh star field.  Stars are created once here
/// and survive every later reset.
pub fn init_world(config: &GameConfig, rng: &mut impl Rng) -> World {
    let mut world = World::new(config.playfield_width, config.playfield_height);
    world.stars = spawn_stars(
        config.star_count,
        config.playfield_width,
        config.playfield_height,
        rng,
    );
    world
}

pub fn spawn_stars(count: usize, width: f32, height: f32, rng: &mut impl Rng) -> Vec<Star> {
    (0..count)
        .map(|_| Star {
            x: rng.gen_range(0.0..width),
            y: rng.gen_range(0.0..height),
            size: rng.gen_range(0.0..STAR_MAX_SIZE),
        })
        .collect()
}

/// Clear every transient collection and re-centre the player.  Stars and
/// playfield size carry over.
pub fn reset_world(world: &World) -> World {
    World {
        player: Player::spawn(world.width, world.height),
        bullets: Vec::new(),
        enemies: Vec::new(),
        enemy_bullets: Vec::new(),
        particles: Vec::new(),
        ..world.clone()
    }
}

/// Replace the formation with the wave for `stage`.  The volley timer
/// restarts at `now_ms`.
pub fn load_wave(world: &World, stage: u32, now_ms: u64) -> World {
    let wave = generate_wave(stage, world.width);
    World {
        enemies: wave.enemies,
        enemy_shot_delay_ms: wave.fire_delay_ms,
        last_enemy_shot_ms: now_ms,
        ..world.clone()
    }
}

// ── Input-driven transitions ─────────────────────────────────────────────────

/// Fire one bullet from the player's nose.
pub fn player_shoot(world: &World) -> World {
    let mut bullets = world.bullets.clone();
    bullets.push(Bullet::from_player(&world.player));
    World {
        bullets,
        ..world.clone()
    }
}

/// Horizontal movement from the held direction flags, clamped to the
/// playfield.  Vertical position never changes.
pub fn move_player(player: &Player, intent: &ControlIntent, playfield_width: f32) -> Player {
    let mut x = player.x;
    if intent.left {
        x -= player.speed;
    }
    if intent.right {
        x += player.speed;
    }
    Player {
        x: x.clamp(0.0, playfield_width - player.width),
        ..player.clone()
    }
}

// ── Per-tick steps ───────────────────────────────────────────────────────────

/// Stars drift down and wrap to the top at a new random column.
pub fn drift_stars(stars: &[Star], width: f32, height: f32, rng: &mut impl Rng) -> Vec<Star> {
    stars
        .iter()
        .map(|s| {
            let y = s.y + STAR_DRIFT;
            if y > height {
                Star {
                    x: rng.gen_range(0.0..width),
                    y: 0.0,
                    ..s.clone()
                }
            } else {
                Star { y, ..s.clone() }
            }
        })
        .collect()
}

/// Move bullets by their signed speed and prune any that have fully left
/// the playfield vertically.
pub fn advance_bullets(bullets: &[Bullet], height: f32) -> Vec<Bullet> {
    bullets
        .iter()
        .filter_map(|b| {
            let y = b.y + b.speed;
            let above_top = y + b.height < 0.0;
            let below_bottom = y > height;
            if above_top || below_bottom {
                None
            } else {
                Some(Bullet { y, ..b.clone() })
            }
        })
        .collect()
}

/// Move the formation sideways.  If any member reaches a side wall the
/// whole formation reverses and steps down together.
pub fn advance_formation(enemies: &[Enemy], width: f32) -> Vec<Enemy> {
    let mut moved: Vec<Enemy> = enemies
        .iter()
        .map(|e| Enemy {
            x: e.x + e.speed * e.direction,
            ..e.clone()
        })
        .collect();

    let hit_wall = moved.iter().any(|e| e.x <= 0.0 || e.x >= width - e.width);
    if hit_wall {
        for e in &mut moved {
            e.direction = -e.direction;
            e.y += FORMATION_STEP_DOWN;
        }
    }
    moved
}

/// Sparks drift and burn down; dead ones are dropped.
pub fn decay_particles(particles: &[Particle]) -> Vec<Particle> {
    particles
        .iter()
        .filter(|p| p.life > 1)
        .map(|p| Particle {
            x: p.x + p.vx,
            y: p.y + p.vy,
            life: p.life - 1,
            ..p.clone()
        })
        .collect()
}

/// When a volley is due, each enemy independently fires with
/// `fire_chance`.  The timer resets whether or not anyone fired.
pub fn schedule_enemy_fire(
    world: &World,
    now_ms: u64,
    fire_chance: f64,
    rng: &mut impl Rng,
) -> World {
    if now_ms.saturating_sub(world.last_enemy_shot_ms) <= world.enemy_shot_delay_ms {
        return world.clone();
    }

    let mut enemy_bullets = world.enemy_bullets.clone();
    let before = enemy_bullets.len();
    for enemy in &world.enemies {
        if rng.gen_bool(fire_chance) {
            enemy_bullets.push(Bullet::from_enemy(enemy));
        }
    }
    log::debug!("Enemy volley at {now_ms}ms: {} shots", enemy_bullets.len() - before);

    World {
        enemy_bullets,
        last_enemy_shot_ms: now_ms,
        ..world.clone()
    }
}

// ── Per-frame tick (RNG injected) ────────────────────────────────────────────

/// Advance every entity by one tick.  Collisions are resolved separately,
/// on the world this returns.
pub fn step(
    world: &World,
    intent: &ControlIntent,
    now_ms: u64,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> World {
    // ── 1. Background ────────────────────────────────────────────────────────
    let stars = drift_stars(&world.stars, world.width, world.height, rng);

    // ── 2. Player ────────────────────────────────────────────────────────────
    let player = move_player(&world.player, intent, world.width);

    // ── 3. Player bullets (then any new shot from the nose) ─────────────────
    let bullets = advance_bullets(&world.bullets, world.height);

    // ── 4. Formation ─────────────────────────────────────────────────────────
    let enemies = advance_formation(&world.enemies, world.width);

    // ── 5. Enemy bullets ─────────────────────────────────────────────────────
    let enemy_bullets = advance_bullets(&world.enemy_bullets, world.height);

    let particles = decay_particles(&world.particles);

    let moved = World {
        player,
        bullets,
        enemies,
        enemy_bullets,
        particles,
        stars,
        ..world.clone()
    };
    let moved = if intent.fire {
        player_shoot(&moved)
    } else {
        moved
    };

    // ── 6. Enemy fire ────────────────────────────────────────────────────────
    schedule_enemy_fire(&moved, now_ms, config.enemy_fire_chance, rng)
}
