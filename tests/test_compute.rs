use galaxy_shooter::compute::*;
use galaxy_shooter::config::GameConfig;
use galaxy_shooter::consts::*;
use galaxy_shooter::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_world() -> World {
    World::new(480.0, 640.0)
}

fn bullet(y: f32, speed: f32) -> Bullet {
    Bullet {
        x: 100.0,
        y,
        width: BULLET_WIDTH,
        height: BULLET_HEIGHT,
        speed,
        color: ColorTag::Yellow,
    }
}

// ── init / reset / load ──────────────────────────────────────────────────────

#[test]
fn init_world_spawns_stars_inside_playfield() {
    let config = GameConfig::default();
    let w = init_world(&config, &mut seeded_rng());
    assert_eq!(w.stars.len(), 120);
    assert!(w
        .stars
        .iter()
        .all(|s| s.x >= 0.0 && s.x < 480.0 && s.y >= 0.0 && s.y < 640.0 && s.size < STAR_MAX_SIZE));
    assert!(w.enemies.is_empty());
}

#[test]
fn reset_keeps_stars_and_clears_the_rest() {
    let config = GameConfig::default();
    let mut w = init_world(&config, &mut seeded_rng());
    w.bullets.push(bullet(100.0, -BULLET_SPEED));
    w.enemy_bullets.push(bullet(100.0, ENEMY_BULLET_SPEED));
    w.player.x = 0.0;
    let stars = w.stars.clone();

    let r = reset_world(&w);
    assert_eq!(r.stars, stars);
    assert!(r.bullets.is_empty());
    assert!(r.enemy_bullets.is_empty());
    assert_eq!(r.player.x, 220.0);
}

#[test]
fn load_wave_arms_the_fire_timer() {
    let w = load_wave(&make_world(), 1, 5_000);
    assert_eq!(w.enemies.len(), 28);
    assert_eq!(w.enemy_shot_delay_ms, 830);
    assert_eq!(w.last_enemy_shot_ms, 5_000);
}

// ── player ───────────────────────────────────────────────────────────────────

#[test]
fn move_player_left_and_right() {
    let p = Player::spawn(480.0, 640.0);
    let left = ControlIntent { left: true, ..Default::default() };
    let right = ControlIntent { right: true, ..Default::default() };
    assert_eq!(move_player(&p, &left, 480.0).x, 215.0);
    assert_eq!(move_player(&p, &right, 480.0).x, 225.0);
}

#[test]
fn move_player_both_directions_cancel() {
    let p = Player::spawn(480.0, 640.0);
    let both = ControlIntent { left: true, right: true, ..Default::default() };
    assert_eq!(move_player(&p, &both, 480.0).x, p.x);
}

#[test]
fn move_player_clamps_to_walls() {
    let mut p = Player::spawn(480.0, 640.0);
    p.x = 2.0;
    let left = ControlIntent { left: true, ..Default::default() };
    assert_eq!(move_player(&p, &left, 480.0).x, 0.0);

    p.x = 438.0;
    let right = ControlIntent { right: true, ..Default::default() };
    assert_eq!(move_player(&p, &right, 480.0).x, 440.0); // 480 - 40
}

#[test]
fn player_shoot_adds_one_bullet() {
    let w = player_shoot(&make_world());
    assert_eq!(w.bullets.len(), 1);
    assert!(w.bullets[0].speed < 0.0);
}

// ── bullets ──────────────────────────────────────────────────────────────────

#[test]
fn bullets_move_by_signed_speed() {
    let moved = advance_bullets(&[bullet(100.0, -9.0), bullet(100.0, 3.5)], 640.0);
    assert_eq!(moved[0].y, 91.0);
    assert_eq!(moved[1].y, 103.5);
}

#[test]
fn bullet_fully_above_top_is_pruned() {
    // y after move = -13, bottom edge at -1
    assert!(advance_bullets(&[bullet(-4.0, -9.0)], 640.0).is_empty());
    // still partly visible
    assert_eq!(advance_bullets(&[bullet(0.0, -9.0)], 640.0).len(), 1);
}

#[test]
fn bullet_below_bottom_is_pruned() {
    assert!(advance_bullets(&[bullet(638.0, 3.5)], 640.0).is_empty());
    assert_eq!(advance_bullets(&[bullet(636.0, 3.5)], 640.0).len(), 1);
}

// ── formation ────────────────────────────────────────────────────────────────

#[test]
fn formation_moves_sideways_without_stepping_down() {
    let enemies = vec![Enemy::new(100.0, 60.0, 2.0, EnemyTier::Drone)];
    let moved = advance_formation(&enemies, 480.0);
    assert_eq!(moved[0].x, 102.0);
    assert_eq!(moved[0].y, 60.0);
    assert_eq!(moved[0].direction, 1.0);
}

#[test]
fn one_enemy_at_the_wall_turns_the_whole_formation() {
    let enemies = vec![
        Enemy::new(100.0, 60.0, 2.0, EnemyTier::Drone),
        Enemy::new(444.0, 100.0, 2.0, EnemyTier::Drone), // 446 >= 480 - 35
    ];
    let moved = advance_formation(&enemies, 480.0);
    assert!(moved.iter().all(|e| e.direction == -1.0));
    assert_eq!(moved[0].y, 60.0 + FORMATION_STEP_DOWN);
    assert_eq!(moved[1].y, 100.0 + FORMATION_STEP_DOWN);
}

#[test]
fn empty_formation_stays_empty() {
    assert!(advance_formation(&[], 480.0).is_empty());
}

// ── particles ────────────────────────────────────────────────────────────────

#[test]
fn particles_drift_and_burn_down() {
    let p = Particle { x: 10.0, y: 10.0, vx: 1.0, vy: -0.5, color: ColorTag::Red, life: 3 };
    let once = decay_particles(&[p]);
    assert_eq!(once.len(), 1);
    assert_eq!(once[0].life, 2);
    assert_eq!((once[0].x, once[0].y), (11.0, 9.5));

    let twice = decay_particles(&once);
    assert_eq!(twice[0].life, 1);
    assert!(decay_particles(&twice).is_empty());
}

#[test]
fn particle_set_does_not_grow_without_new_explosions() {
    let burst: Vec<Particle> = (0..15)
        .map(|i| Particle { x: i as f32, y: 0.0, vx: 0.0, vy: 0.0, color: ColorTag::Yellow, life: 20 })
        .collect();
    let mut current = burst;
    for _ in 0..20 {
        current = decay_particles(&current);
    }
    assert!(current.is_empty());
}

// ── stars ────────────────────────────────────────────────────────────────────

#[test]
fn stars_drift_and_wrap() {
    let stars = vec![
        Star { x: 10.0, y: 5.0, size: 1.0 },
        Star { x: 20.0, y: 639.9, size: 1.0 },
    ];
    let moved = drift_stars(&stars, 480.0, 640.0, &mut seeded_rng());
    assert_eq!(moved[0].y, 5.0 + STAR_DRIFT);
    assert_eq!(moved[0].x, 10.0);
    assert_eq!(moved[1].y, 0.0);
    assert!(moved[1].x >= 0.0 && moved[1].x < 480.0);
}

// ── enemy fire ───────────────────────────────────────────────────────────────

#[test]
fn enemy_fire_waits_for_the_delay() {
    let w = load_wave(&make_world(), 1, 1_000);
    let same = schedule_enemy_fire(&w, 1_830, 1.0, &mut seeded_rng());
    assert!(same.enemy_bullets.is_empty());
    assert_eq!(same.last_enemy_shot_ms, 1_000);
}

#[test]
fn volley_fires_from_every_enemy_at_full_chance() {
    let w = load_wave(&make_world(), 1, 1_000);
    let fired = schedule_enemy_fire(&w, 1_831, 1.0, &mut seeded_rng());
    assert_eq!(fired.enemy_bullets.len(), 28);
    assert_eq!(fired.last_enemy_shot_ms, 1_831);
}

#[test]
fn timer_resets_even_when_nobody_fires() {
    let w = load_wave(&make_world(), 1, 1_000);
    let quiet = schedule_enemy_fire(&w, 5_000, 0.0, &mut seeded_rng());
    assert!(quiet.enemy_bullets.is_empty());
    assert_eq!(quiet.last_enemy_shot_ms, 5_000);
}

// ── step ─────────────────────────────────────────────────────────────────────

#[test]
fn step_fires_when_asked() {
    let config = GameConfig::default();
    let w = init_world(&config, &mut seeded_rng());
    let fire = ControlIntent { fire: true, ..Default::default() };
    let next = step(&w, &fire, 0, &config, &mut seeded_rng());
    assert_eq!(next.bullets.len(), 1);

    let idle = step(&w, &ControlIntent::default(), 0, &config, &mut seeded_rng());
    assert!(idle.bullets.is_empty());
}

#[test]
fn step_leaves_the_input_world_untouched() {
    let config = GameConfig::default();
    let w = load_wave(&init_world(&config, &mut seeded_rng()), 1, 0);
    let before = w.clone();
    let _ = step(&w, &ControlIntent { right: true, fire: true, ..Default::default() }, 16, &config, &mut seeded_rng());
    assert_eq!(w.enemies, before.enemies);
    assert_eq!(w.player, before.player);
    assert_eq!(w.stars, before.stars);
}

#[test]
fn step_moves_formation_and_player_together() {
    let config = GameConfig::default();
    let w = load_wave(&init_world(&config, &mut seeded_rng()), 1, 0);
    let right = ControlIntent { right: true, ..Default::default() };
    let next = step(&w, &right, 16, &config, &mut seeded_rng());
    assert_eq!(next.player.x, w.player.x + PLAYER_SPEED);
    assert_eq!(next.enemies[0].x, w.enemies[0].x + 1.0);
    assert!(next.enemy_bullets.is_empty());
}
