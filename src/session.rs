//! Game lifecycle state machine
//!
//! One `GameSession` owns the world, the score/lives/stage counters and the
//! phase.  Everything runs on the caller's frame loop; the only work that
//! leaves that thread is the best-effort score save on game over.

use std::sync::Arc;

use rand::Rng;

use crate::collision::{resolve, ExplosionSpec};
use crate::compute::{init_world, load_wave, reset_world, step};
use crate::config::GameConfig;
use crate::entities::{ControlIntent, World};
use crate::score_store::{save_detached, PendingSave, ScoreStore};

/// Where the session is in its lifecycle.  Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, never started
    Idle,
    /// Simulation advancing every frame
    Running,
    /// Player paused; frames are skipped until resumed
    Paused,
    /// Overlay between stages; the simulation holds until the timer fires
    StageClear,
    /// Lives exhausted; only a restart leaves this phase
    GameOver,
}

/// Who is playing.  Free-form; empty strings are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub player_name: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub score: u32,
    pub lives: u32,
    pub stage: u32,
}

/// Display hooks, called at the moment the corresponding value changes.
pub trait GameObserver {
    fn score_changed(&mut self, _score: u32) {}
    fn stage_changed(&mut self, _stage: u32) {}
    fn lives_changed(&mut self, _lives: u32) {}
    fn stage_clear_shown(&mut self, _stage: u32) {}
    fn stage_clear_hidden(&mut self) {}
    fn game_over_shown(&mut self, _score: u32, _stage: u32) {}
}

/// Observer that ignores every notification.
impl GameObserver for () {}

/// Deferred wave regeneration after a stage clear, tagged with the run
/// that armed it.  Starting a run drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StageClearTimer {
    due_ms: u64,
    generation: u64,
}

pub struct GameSession<O: GameObserver> {
    config: GameConfig,
    identity: SessionIdentity,
    store: Arc<dyn ScoreStore>,
    observer: O,
    phase: Phase,
    stats: SessionStats,
    world: World,
    /// Bumped on every start
    generation: u64,
    stage_clear: Option<StageClearTimer>,
    pending_save: Option<PendingSave>,
}

impl<O: GameObserver> GameSession<O> {
    pub fn new(
        config: GameConfig,
        identity: SessionIdentity,
        store: Arc<dyn ScoreStore>,
        observer: O,
        rng: &mut impl Rng,
    ) -> Self {
        let world = init_world(&config, rng);
        let stats = SessionStats {
            score: 0,
            lives: config.starting_lives,
            stage: 1,
        };
        Self {
            config,
            identity,
            store,
            observer,
            phase: Phase::Idle,
            stats,
            world,
            generation: 0,
            stage_clear: None,
            pending_save: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for scripted scenarios (demo setups, tests).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a run is in progress, paused or not.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused | Phase::StageClear)
    }

    /// Only a fully active session advances and redraws.
    pub fn should_draw(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Change who is playing.  Only takes effect between runs.
    pub fn set_identity(&mut self, identity: SessionIdentity) {
        if self.is_running() {
            log::warn!("Ignoring identity change during a run");
            return;
        }
        self.identity = identity;
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Start (or restart) a run: counters reset, transient entities cleared,
    /// stage 1 wave loaded.  Cancels any pending stage-clear timer.
    pub fn start(&mut self, now_ms: u64) {
        self.generation += 1;
        self.stage_clear = None;

        self.stats = SessionStats {
            score: 0,
            lives: self.config.starting_lives,
            stage: 1,
        };
        let world = reset_world(&self.world);
        self.world = load_wave(&world, self.stats.stage, now_ms);
        self.phase = Phase::Running;

        log::info!(
            "Run {} started for {:?} ({:?})",
            self.generation,
            self.identity.player_name,
            self.identity.student_id
        );
        self.notify_stats();
    }

    /// Same as `start`; exists so callers can say what they mean.
    pub fn restart(&mut self, now_ms: u64) {
        self.start(now_ms);
    }

    /// Flip between running and paused.  Ignored in every other phase.
    /// Returns whether the toggle was applied.
    pub fn toggle_pause(&mut self) -> bool {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => {
                log::debug!("Pause toggle ignored in {other:?}");
                return false;
            }
        };
        log::info!("Session {:?}", self.phase);
        true
    }

    /// One display frame.  Returns true when the world advanced and should
    /// be redrawn.
    pub fn frame(&mut self, intent: &ControlIntent, now_ms: u64, rng: &mut impl Rng) -> bool {
        self.poll_save();

        if intent.pause {
            self.toggle_pause();
        }

        match self.phase {
            Phase::Running => {
                self.tick(intent, now_ms, rng);
                true
            }
            Phase::StageClear => self.fire_stage_clear_timer(now_ms),
            Phase::Idle | Phase::Paused | Phase::GameOver => false,
        }
    }

    fn tick(&mut self, intent: &ControlIntent, now_ms: u64, rng: &mut impl Rng) {
        let moved = step(&self.world, intent, now_ms, &self.config, rng);
        let spec = ExplosionSpec {
            particles: self.config.explosion_particles,
            life: self.config.particle_life,
        };
        let (resolved, resolution) = resolve(&moved, spec, rng);
        self.world = resolved;

        if resolution.score_gained > 0 {
            self.stats.score = self.stats.score.saturating_add(resolution.score_gained);
            self.observer.score_changed(self.stats.score);
        }

        if resolution.player_hits > 0 {
            self.stats.lives = self.stats.lives.saturating_sub(resolution.player_hits);
            self.observer.lives_changed(self.stats.lives);
            if self.stats.lives == 0 {
                self.enter_game_over();
                return;
            }
        }

        if resolution.wave_cleared {
            self.enter_stage_clear(now_ms);
        }
    }

    fn enter_stage_clear(&mut self, now_ms: u64) {
        self.stats.stage += 1;
        self.phase = Phase::StageClear;
        self.stage_clear = Some(StageClearTimer {
            due_ms: now_ms + self.config.stage_clear_ms,
            generation: self.generation,
        });
        log::info!("Stage cleared; stage {} up next", self.stats.stage);
        self.observer.stage_changed(self.stats.stage);
        self.observer.stage_clear_shown(self.stats.stage);
    }

    /// Load the next wave once the overlay has run its course.
    fn fire_stage_clear_timer(&mut self, now_ms: u64) -> bool {
        // Only `enter_stage_clear` enters this phase, and every way out of
        // it (`start`, the timer itself) replaces or clears the timer
        let Some(timer) = self.stage_clear else {
            debug_assert!(false, "StageClear without an armed timer");
            return false;
        };
        debug_assert_eq!(
            timer.generation, self.generation,
            "stage-clear timer outlived its run"
        );
        if now_ms < timer.due_ms {
            return false;
        }

        self.stage_clear = None;
        self.observer.stage_clear_hidden();
        self.world = load_wave(&self.world, self.stats.stage, now_ms);
        self.phase = Phase::Running;
        true
    }

    fn enter_game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.stage_clear = None;
        log::info!(
            "Game over: score {} at stage {}",
            self.stats.score,
            self.stats.stage
        );

        self.pending_save = Some(save_detached(
            Arc::clone(&self.store),
            self.stats.score,
            self.stats.stage,
            self.identity.player_name.clone(),
            self.identity.student_id.clone(),
        ));
        self.observer.game_over_shown(self.stats.score, self.stats.stage);
    }

    fn notify_stats(&mut self) {
        self.observer.score_changed(self.stats.score);
        self.observer.stage_changed(self.stats.stage);
        self.observer.lives_changed(self.stats.lives);
    }

    // ── Persistence results ──────────────────────────────────────────────────

    fn poll_save(&mut self) {
        let Some(pending) = &self.pending_save else {
            return;
        };
        if let Some(durable) = pending.poll() {
            log_save_result(durable);
            self.pending_save = None;
        }
    }

    /// Block until an in-flight score save finishes.  `None` when nothing
    /// was pending.
    pub fn wait_for_save(&mut self) -> Option<bool> {
        let durable = self.pending_save.take()?.wait();
        log_save_result(durable);
        Some(durable)
    }
}

fn log_save_result(durable: bool) {
    if durable {
        log::info!("Score save finished (durable)");
    } else {
        log::warn!("Score save finished (local only)");
    }
}
