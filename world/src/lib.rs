#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game session state for Arena Combat.
//!
//! A [`GameSession`] owns everything that lives for one play session: the
//! player character, the enemy roster, the wave scheduler and the projectile
//! simulator. Dropping the session tears all of it down; there is no global
//! player state.

mod enemies;
mod player;

use std::time::Duration;

use arena_combat_core::{
    Command, ConfigError, DifficultyProfile, EffectSink, EnemyId, EnemyKind, Event,
    ProjectileId, ProjectileTuning, ProjectileVisual, Side, TargetSnapshot, Vec2,
};
use arena_combat_system_projectiles::{AdvanceSummary, EnemyShot, PlayerShot, ProjectileSimulator};
use arena_combat_system_wave_scheduler::{self as waves, WaveScheduler};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::enemies::{DamageOutcome, EnemyRegistry};
use crate::player::{PlayerState, PLAYER_BODY_RADIUS};

/// Distance beyond touching at which contact damage still applies.
const CONTACT_SLACK: f32 = 0.5;

/// Tunable parameters of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Arena width in world units.
    pub arena_width: f32,
    /// Arena height in world units.
    pub arena_height: f32,
    /// Starting and maximum player health.
    pub player_max_health: f32,
    /// Minimum time between player shots, in milliseconds.
    pub player_fire_interval_ms: u64,
    /// Minimum time between contact hits from the same enemy, in milliseconds.
    pub contact_cooldown_ms: u64,
    /// Whether a completed wave arms the next-wave timer automatically.
    pub auto_schedule_next_wave: bool,
    /// Seed for every random roll made during the session.
    pub seed: u64,
    /// Wave composition and pacing.
    pub difficulty: DifficultyProfile,
    /// Player projectile parameters.
    pub projectiles: ProjectileTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            arena_width: 1_280.0,
            arena_height: 720.0,
            player_max_health: 100.0,
            player_fire_interval_ms: 250,
            contact_cooldown_ms: 1_000,
            auto_schedule_next_wave: true,
            seed: 0x5eed_a4e4_a000_0001,
            difficulty: DifficultyProfile::default(),
            projectiles: ProjectileTuning::default(),
        }
    }
}

impl SessionConfig {
    /// Rejects configurations the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.difficulty.validate()?;
        self.projectiles.validate()?;
        for (field, value) in [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("player_max_health", self.player_max_health),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite {
                    field,
                    value: f64::from(value),
                });
            }
            if value <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: f64::from(value),
                    min: f64::MIN_POSITIVE,
                    max: f64::INFINITY,
                });
            }
        }
        Ok(())
    }

    fn arena_center(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height) * 0.5
    }
}

/// Totals reported when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Highest wave that was started.
    pub wave_reached: u32,
    /// Enemies killed by the player.
    pub kills: u32,
    /// Score accumulated from kills.
    pub score: u32,
    /// Damage absorbed by the player.
    pub damage_taken: f32,
    /// Whether the player was still alive.
    pub survived: bool,
    /// Number of ticks simulated.
    pub ticks: u64,
}

/// Represents one authoritative play session.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    player: PlayerState,
    enemies: EnemyRegistry,
    waves: WaveScheduler,
    projectiles: ProjectileSimulator,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl GameSession {
    /// Creates a session with the player centered in an empty arena.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        // Wave rolls and spawn placement draw from independent streams.
        let wave_seed = config.seed ^ 0x9e37_79b9_7f4a_7c15;
        let session = Self {
            player: PlayerState::new(config.arena_center(), config.player_max_health),
            enemies: EnemyRegistry::new(),
            waves: WaveScheduler::new(waves::Config::new(config.difficulty, wave_seed)),
            projectiles: ProjectileSimulator::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            tick_index: 0,
            config,
        };
        info!(seed = config.seed, "session created");
        Ok(session)
    }

    /// Ends the session, releasing every live projectile.
    pub fn finish(mut self, out_events: &mut Vec<Event>) -> SessionSummary {
        self.projectiles.clear(&mut EventEffects::new(out_events));
        let summary = SessionSummary {
            wave_reached: self.waves.state().current_wave,
            kills: self.player.kills,
            score: self.player.score,
            damage_taken: self.player.damage_taken,
            survived: self.player.is_alive(),
            ticks: self.tick_index,
        };
        info!(
            wave = summary.wave_reached,
            kills = summary.kills,
            survived = summary.survived,
            "session finished"
        );
        summary
    }

    fn tick(&mut self, dt: Duration, delta_scale: f32, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        self.player.fire_cooldown = self.player.fire_cooldown.saturating_sub(dt);
        self.update_enemies(dt, delta_scale, out_events);
        self.resolve_enemy_projectiles(delta_scale, out_events);
        self.resolve_player_projectiles(delta_scale, out_events);

        let mut next_wave = None;
        let _ = self.waves.advance_timer(dt, |wave| next_wave = Some(wave));
        if let Some(wave) = next_wave {
            self.start_wave(wave, out_events);
        }
    }

    fn update_enemies(&mut self, dt: Duration, delta_scale: f32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.hit_point() else {
            return;
        };

        let contact_cooldown = Duration::from_millis(self.config.contact_cooldown_ms);
        let mut contact_damage = Vec::new();
        let mut shots = Vec::new();

        for enemy in self.enemies.iter_mut() {
            let stats = enemy.kind.stats();
            let reach = stats.collision_radius() + PLAYER_BODY_RADIUS;
            enemy.chase(player, reach, delta_scale);

            enemy.contact_cooldown = enemy.contact_cooldown.saturating_sub(dt);
            let touching = enemy.position.distance(player) <= reach + CONTACT_SLACK;
            if touching && enemy.contact_cooldown.is_zero() {
                enemy.contact_cooldown = contact_cooldown;
                contact_damage.push(stats.contact_damage);
            }

            if let Some(shot) = stats.shot {
                enemy.fire_cooldown = enemy.fire_cooldown.saturating_sub(dt);
                if enemy.fire_cooldown.is_zero() {
                    enemy.fire_cooldown = shot.interval();
                    shots.push(EnemyShot {
                        origin: enemy.position,
                        direction: player - enemy.position,
                        speed: shot.speed,
                        damage: shot.damage,
                        radius: shot.radius,
                        range: shot.range,
                        visual: shot.visual,
                    });
                }
            }
        }

        for shot in shots {
            let projectile = self.projectiles.spawn_enemy(shot);
            out_events.push(Event::ProjectileFired {
                projectile,
                side: Side::Enemy,
                visual: shot.visual,
            });
        }

        for damage in contact_damage {
            self.damage_player(damage, out_events);
        }
    }

    fn resolve_enemy_projectiles(&mut self, delta_scale: f32, out_events: &mut Vec<Event>) {
        let mut damage_taken = Vec::new();
        let summary = self.projectiles.advance_against_player(
            delta_scale,
            self.player.hit_point(),
            self.config.projectiles.player_hit_margin,
            |damage| damage_taken.push(damage),
            &mut EventEffects::new(out_events),
        );
        log_retired(self.tick_index, Side::Enemy, summary);

        for damage in damage_taken {
            self.damage_player(damage, out_events);
        }
    }

    fn resolve_player_projectiles(&mut self, delta_scale: f32, out_events: &mut Vec<Event>) {
        let targets: Vec<TargetSnapshot> = self
            .enemies
            .iter()
            .map(|enemy| enemy.snapshot().target())
            .collect();

        let mut hits = Vec::new();
        let summary = self.projectiles.advance(
            delta_scale,
            &targets,
            |enemy, damage| hits.push((enemy, damage)),
            &mut EventEffects::new(out_events),
        );
        log_retired(self.tick_index, Side::Player, summary);

        for (enemy, damage) in hits {
            self.damage_enemy(enemy, damage, out_events);
        }
    }

    fn damage_enemy(&mut self, enemy: EnemyId, damage: f32, out_events: &mut Vec<Event>) {
        match self.enemies.damage(enemy, damage) {
            DamageOutcome::Survived(remaining_health) => {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    damage,
                    remaining_health,
                });
            }
            DamageOutcome::Killed(kind) => {
                self.player.kills = self.player.kills.saturating_add(1);
                self.player.score = self.player.score.saturating_add(kind.stats().score);
                out_events.push(Event::EnemyKilled { enemy, kind });
                debug!(enemy = enemy.get(), kind = kind.name(), "enemy killed");

                if self.waves.register_kill() {
                    out_events.push(Event::WaveCompleted {
                        wave: self.waves.state().current_wave,
                    });
                    if self.config.auto_schedule_next_wave && self.player.is_alive() {
                        self.schedule_next_wave(out_events);
                    }
                }
            }
            // Two shots in the same tick can land on an enemy the first one killed.
            DamageOutcome::Missing => {}
        }
    }

    fn damage_player(&mut self, damage: f32, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }

        let defeated = self.player.take_damage(damage);
        out_events.push(Event::PlayerDamaged {
            damage,
            remaining_health: self.player.health,
        });
        if defeated {
            if self.waves.cancel_pending() {
                debug!("pending wave cancelled after defeat");
            }
            info!(tick = self.tick_index, "player defeated");
            out_events.push(Event::PlayerDefeated);
        }
    }

    fn start_wave(&mut self, wave: u32, out_events: &mut Vec<Event>) {
        let mut spawned = Vec::new();
        let composition = self
            .waves
            .start_wave(wave, &mut |kind: EnemyKind| spawned.push(kind));
        out_events.push(Event::WaveStarted { composition });

        for kind in spawned {
            let position = self.spawn_position();
            let enemy = self.enemies.spawn(kind, position);
            out_events.push(Event::EnemySpawned {
                enemy,
                kind,
                position,
            });
        }
    }

    fn schedule_next_wave(&mut self, out_events: &mut Vec<Event>) {
        let wave = self.waves.schedule_next_wave();
        out_events.push(Event::NextWaveScheduled {
            wave,
            delay: self.config.difficulty.wave_start_delay(),
        });
    }

    fn fire_player_shot(&mut self, direction: Vec2, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() || !self.player.fire_cooldown.is_zero() {
            return;
        }

        let Some(direction) = direction.try_normalize() else {
            return;
        };

        let tuning = self.config.projectiles;
        let projectile = self.projectiles.spawn_player(PlayerShot {
            origin: self.player.position,
            velocity: direction * tuning.player_shot_speed,
            damage: tuning.player_shot_damage,
            radius: tuning.player_shot_radius,
            range: tuning.player_shot_range,
            visual: ProjectileVisual::Arrow,
        });
        self.player.fire_cooldown = Duration::from_millis(self.config.player_fire_interval_ms);
        out_events.push(Event::ProjectileFired {
            projectile,
            side: Side::Player,
            visual: ProjectileVisual::Arrow,
        });
    }

    /// Picks a uniformly random point on the arena perimeter.
    fn spawn_position(&mut self) -> Vec2 {
        let width = self.config.arena_width;
        let height = self.config.arena_height;
        match self.rng.gen_range(0..4) {
            0 => Vec2::new(self.rng.gen_range(0.0..width), 0.0),
            1 => Vec2::new(width, self.rng.gen_range(0.0..height)),
            2 => Vec2::new(self.rng.gen_range(0.0..width), height),
            _ => Vec2::new(0.0, self.rng.gen_range(0.0..height)),
        }
    }

    fn clamp_to_arena(&self, position: Vec2) -> Vec2 {
        position.clamp(
            Vec2::ZERO,
            Vec2::new(self.config.arena_width, self.config.arena_height),
        )
    }
}

fn log_retired(tick: u64, side: Side, summary: AdvanceSummary) {
    if summary != AdvanceSummary::default() {
        debug!(
            tick,
            ?side,
            hits = summary.hits,
            expired = summary.expired,
            "projectiles retired"
        );
    }
}

/// Forwards presentation requests from the projectile system as events.
struct EventEffects<'a> {
    out: &'a mut Vec<Event>,
}

impl<'a> EventEffects<'a> {
    fn new(out: &'a mut Vec<Event>) -> Self {
        Self { out }
    }
}

impl EffectSink for EventEffects<'_> {
    fn impact(&mut self, position: Vec2, visual: ProjectileVisual) {
        self.out.push(Event::ImpactEffect { position, visual });
    }

    fn release(&mut self, projectile: ProjectileId) {
        self.out.push(Event::ProjectileReleased { projectile });
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut GameSession, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, delta_scale } => session.tick(dt, delta_scale, out_events),
        Command::StartWave { wave } => {
            if session.waves.cancel_pending() {
                debug!(wave, "manual wave start replaced pending timer");
            }
            session.start_wave(wave, out_events);
        }
        Command::ScheduleNextWave => session.schedule_next_wave(out_events),
        Command::MovePlayer { position } => {
            if session.player.is_alive() {
                session.player.position = session.clamp_to_arena(position);
            }
        }
        Command::FirePlayerShot { direction } => session.fire_player_shot(direction, out_events),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use arena_combat_core::{EnemySnapshot, PlayerSnapshot, TargetSnapshot, WaveProgress};
    use arena_combat_system_projectiles::Projectile;

    use super::{GameSession, SessionConfig};

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(session: &GameSession) -> &SessionConfig {
        &session.config
    }

    /// Snapshot of the player character.
    #[must_use]
    pub fn player(session: &GameSession) -> PlayerSnapshot {
        session.player.snapshot()
    }

    /// Snapshots of every live enemy ordered by identifier.
    #[must_use]
    pub fn enemies(session: &GameSession) -> Vec<EnemySnapshot> {
        session.enemies.iter().map(|enemy| enemy.snapshot()).collect()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(session: &GameSession) -> usize {
        session.enemies.len()
    }

    /// Collision targets for every live enemy.
    #[must_use]
    pub fn targets(session: &GameSession) -> Vec<TargetSnapshot> {
        session
            .enemies
            .iter()
            .map(|enemy| enemy.snapshot().target())
            .collect()
    }

    /// Progress of the current wave.
    #[must_use]
    pub fn wave_progress(session: &GameSession) -> WaveProgress {
        session.waves.progress()
    }

    /// Display line describing the current wave.
    #[must_use]
    pub fn wave_progress_text(session: &GameSession) -> String {
        session.waves.progress_text()
    }

    /// Wave the next-wave timer will start, if armed.
    #[must_use]
    pub fn pending_wave(session: &GameSession) -> Option<u32> {
        session.waves.pending_wave()
    }

    /// Time left on the next-wave timer, if armed.
    #[must_use]
    pub fn pending_delay(session: &GameSession) -> Option<Duration> {
        session.waves.pending_delay()
    }

    /// Live player projectiles.
    #[must_use]
    pub fn player_projectiles(session: &GameSession) -> &[Projectile] {
        session.projectiles.player_projectiles()
    }

    /// Live enemy projectiles.
    #[must_use]
    pub fn enemy_projectiles(session: &GameSession) -> &[Projectile] {
        session.projectiles.enemy_projectiles()
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(session: &GameSession) -> u64 {
        session.tick_index
    }
}
