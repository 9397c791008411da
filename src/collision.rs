/// Collision and damage resolution for one tick.
///
/// Works on post-move positions.  Hits are marked first and every
/// collection is filtered once at the end, so an entity removed earlier in
/// the pass is never evaluated again.

use rand::Rng;

use crate::entities::{Enemy, Particle, World, EXPLOSION_PALETTE};
use crate::geometry::{intersects, Bounded};

/// What the resolver did to the world this tick.  The session applies
/// score and life changes and drives transitions from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Sum of the point values of enemies destroyed this tick.
    pub score_gained: u32,
    pub enemies_destroyed: usize,
    /// Player bullets that hit an enemy (destroyed or not).
    pub enemy_hits: usize,
    /// Enemy bullets that hit the player.
    pub player_hits: u32,
    /// The formation went from non-empty to empty in this pass.
    pub wave_cleared: bool,
}

/// Explosion parameters, normally taken from `GameConfig`.
#[derive(Clone, Copy, Debug)]
pub struct ExplosionSpec {
    pub particles: usize,
    pub life: u32,
}

/// A burst of sparks at `(x, y)`, each with a palette colour and a small
/// random drift.
pub fn explosion_at(x: f32, y: f32, spec: ExplosionSpec, rng: &mut impl Rng) -> Vec<Particle> {
    (0..spec.particles)
        .map(|_| Particle {
            x,
            y,
            vx: rng.gen_range(-1.5..1.5),
            vy: rng.gen_range(-1.5..1.5),
            color: EXPLOSION_PALETTE[rng.gen_range(0..EXPLOSION_PALETTE.len())],
            life: spec.life,
        })
        .collect()
}

/// Resolve every player-bullet/enemy and enemy-bullet/player hit.
pub fn resolve(world: &World, spec: ExplosionSpec, rng: &mut impl Rng) -> (World, Resolution) {
    let mut resolution = Resolution::default();

    // ── 1. Player bullets ↔ enemies ─────────────────────────────────────────
    let mut health: Vec<u32> = world.enemies.iter().map(|e| e.health).collect();
    let mut spent_bullets = vec![false; world.bullets.len()];
    let mut particles = world.particles.clone();

    for (bi, bullet) in world.bullets.iter().enumerate() {
        let bullet_box = bullet.bounds();
        for (ei, enemy) in world.enemies.iter().enumerate() {
            // Already destroyed earlier in this pass
            if health[ei] == 0 {
                continue;
            }
            if !intersects(&bullet_box, &enemy.bounds()) {
                continue;
            }

            health[ei] -= 1;
            spent_bullets[bi] = true;
            resolution.enemy_hits += 1;

            if health[ei] == 0 {
                resolution.score_gained += enemy.points;
                resolution.enemies_destroyed += 1;
                particles.extend(explosion_at(enemy.x, enemy.y, spec, rng));
            }
            // One bullet damages one enemy
            break;
        }
    }

    let enemies: Vec<Enemy> = world
        .enemies
        .iter()
        .zip(&health)
        .filter(|&(_, &hp)| hp > 0)
        .map(|(e, &hp)| Enemy {
            health: hp,
            ..e.clone()
        })
        .collect();

    let bullets = world
        .bullets
        .iter()
        .zip(&spent_bullets)
        .filter(|&(_, &spent)| !spent)
        .map(|(b, _)| b.clone())
        .collect();

    resolution.wave_cleared = !world.enemies.is_empty() && enemies.is_empty();

    // ── 2. Enemy bullets ↔ player ───────────────────────────────────────────
    let player_box = world.player.bounds();
    let enemy_bullets = world
        .enemy_bullets
        .iter()
        .filter(|b| {
            let hit = intersects(&b.bounds(), &player_box);
            if hit {
                resolution.player_hits += 1;
            }
            !hit
        })
        .cloned()
        .collect();

    debug_assert!(enemies.iter().all(|e| e.health > 0));

    let resolved = World {
        bullets,
        enemies,
        enemy_bullets,
        particles,
        ..world.clone()
    };
    (resolved, resolution)
}
