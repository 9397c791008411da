//! Renderer: draws a world snapshot onto whatever surface the caller
//! injects.  Reads entities only; drawing the same snapshot twice issues
//! the same calls.

use crate::consts::PARTICLE_SIZE;
use crate::entities::{ColorTag, World};
use crate::geometry::{Bounded, Rect};

/// A surface that can show filled rectangles.
pub trait RenderTarget {
    /// Start a new frame (clear the surface).
    fn begin_frame(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: ColorTag);
    /// Present the frame.
    fn end_frame(&mut self);
}

/// Draw every entity as a filled rectangle in its own colour, back to
/// front: stars, player, player bullets, enemies, enemy bullets, sparks.
pub fn draw<T: RenderTarget + ?Sized>(target: &mut T, world: &World) {
    target.begin_frame();

    for star in &world.stars {
        target.fill_rect(star.bounds(), ColorTag::White);
    }

    target.fill_rect(world.player.bounds(), world.player.color);

    for bullet in &world.bullets {
        target.fill_rect(bullet.bounds(), bullet.color);
    }
    for enemy in &world.enemies {
        target.fill_rect(enemy.bounds(), enemy.color);
    }
    for bullet in &world.enemy_bullets {
        target.fill_rect(bullet.bounds(), bullet.color);
    }
    for particle in &world.particles {
        target.fill_rect(
            Rect::new(particle.x, particle.y, PARTICLE_SIZE, PARTICLE_SIZE),
            particle.color,
        );
    }

    target.end_frame();
}
