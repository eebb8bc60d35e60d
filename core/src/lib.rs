#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena Combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game session, and the simulation systems. Adapters submit
//! [`Command`] values describing desired mutations, the session executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that the host renders or records. Systems never own presentation: they call
//! out through the [`SpawnSink`] and [`EffectSink`] collaborator traits.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest wave the scheduler will ever produce, regardless of rolls.
pub const MIN_WAVE_ENEMIES: u32 = 3;

/// Upper bound applied to the per-wave elite chance.
pub const MAX_ELITE_CHANCE: f64 = 0.7;

/// Extra distance added to an enemy projectile's radius when testing the player.
pub const PLAYER_HIT_MARGIN: f32 = 10.0;

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one host frame.
    Tick {
        /// Wall-clock time that elapsed since the previous tick.
        dt: Duration,
        /// Per-tick speed scaling factor supplied by the host loop.
        delta_scale: f32,
    },
    /// Starts the provided wave immediately, bypassing the next-wave timer.
    StartWave {
        /// Wave number to start.
        wave: u32,
    },
    /// Arms the next-wave timer, replacing any timer already pending.
    ScheduleNextWave,
    /// Teleports the player character to a new position.
    MovePlayer {
        /// Destination in arena coordinates.
        position: Vec2,
    },
    /// Fires a player projectile along the provided direction.
    FirePlayerShot {
        /// Direction of travel; normalized by the session.
        direction: Vec2,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces the composition of a freshly started wave.
    WaveStarted {
        /// Composition rolled for the wave.
        composition: WaveComposition,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Arena position of the spawn.
        position: Vec2,
    },
    /// Reports damage dealt to an enemy that survived the hit.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage applied by the hit.
        damage: f32,
        /// Health left after the hit.
        remaining_health: f32,
    },
    /// Reports that an enemy ran out of health and left the arena.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy that died.
        kind: EnemyKind,
    },
    /// Reports that the current wave has been marked complete.
    WaveCompleted {
        /// Wave number that completed.
        wave: u32,
    },
    /// Confirms that the next-wave timer has been armed.
    NextWaveScheduled {
        /// Wave that will start once the timer fires.
        wave: u32,
        /// Delay before the wave starts.
        delay: Duration,
    },
    /// Confirms that a projectile entered the simulation.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Side that owns the projectile.
        side: Side,
        /// Visual used to present the projectile.
        visual: ProjectileVisual,
    },
    /// Requests an impact effect at the provided position.
    ImpactEffect {
        /// Position of the impact.
        position: Vec2,
        /// Visual of the projectile that hit.
        visual: ProjectileVisual,
    },
    /// Signals that a projectile left the simulation and its display can be freed.
    ProjectileReleased {
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
    },
    /// Reports damage dealt to the player.
    PlayerDamaged {
        /// Damage applied.
        damage: f32,
        /// Health left after the hit.
        remaining_health: f32,
    },
    /// Reports that the player character ran out of health.
    PlayerDefeated,
}

/// Closed set of enemy kinds that may appear in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Slow melee blob; the bulk of every wave.
    Slime,
    /// Elite caster that throws fireballs.
    Devil,
    /// Mid-tier archer that throws bones.
    Skeleton,
    /// Caster that fires frost bolts.
    FrostWraith,
    /// Fast melee unit with heavy contact damage.
    BomberBeetle,
    /// Fragile caster with rapid lightning.
    StormMage,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Slime,
        EnemyKind::Devil,
        EnemyKind::Skeleton,
        EnemyKind::FrostWraith,
        EnemyKind::BomberBeetle,
        EnemyKind::StormMage,
    ];

    /// Stable snake_case identifier of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slime => "slime",
            Self::Devil => "devil",
            Self::Skeleton => "skeleton",
            Self::FrostWraith => "frost_wraith",
            Self::BomberBeetle => "bomber_beetle",
            Self::StormMage => "storm_mage",
        }
    }

    /// Gameplay constants for the kind.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Slime => EnemyStats {
                health: 30.0,
                base_radius: 16.0,
                size_scale: 0.9,
                speed: 1.2,
                contact_damage: 8.0,
                score: 10,
                shot: None,
            },
            Self::Devil => EnemyStats {
                health: 80.0,
                base_radius: 16.0,
                size_scale: 1.1,
                speed: 1.6,
                contact_damage: 15.0,
                score: 30,
                shot: Some(EnemyShot {
                    visual: ProjectileVisual::Fireball,
                    speed: 4.0,
                    damage: 12.0,
                    radius: 6.0,
                    range: 420.0,
                    interval_ms: 2_200,
                }),
            },
            Self::Skeleton => EnemyStats {
                health: 50.0,
                base_radius: 14.0,
                size_scale: 1.0,
                speed: 1.4,
                contact_damage: 10.0,
                score: 20,
                shot: Some(EnemyShot {
                    visual: ProjectileVisual::Bone,
                    speed: 5.0,
                    damage: 8.0,
                    radius: 4.0,
                    range: 360.0,
                    interval_ms: 2_800,
                }),
            },
            Self::FrostWraith => EnemyStats {
                health: 60.0,
                base_radius: 15.0,
                size_scale: 1.0,
                speed: 1.3,
                contact_damage: 12.0,
                score: 25,
                shot: Some(EnemyShot {
                    visual: ProjectileVisual::Frost,
                    speed: 3.5,
                    damage: 10.0,
                    radius: 5.0,
                    range: 400.0,
                    interval_ms: 2_500,
                }),
            },
            Self::BomberBeetle => EnemyStats {
                health: 40.0,
                base_radius: 12.0,
                size_scale: 1.2,
                speed: 2.0,
                contact_damage: 25.0,
                score: 25,
                shot: None,
            },
            Self::StormMage => EnemyStats {
                health: 45.0,
                base_radius: 14.0,
                size_scale: 1.0,
                speed: 1.0,
                contact_damage: 6.0,
                score: 35,
                shot: Some(EnemyShot {
                    visual: ProjectileVisual::Lightning,
                    speed: 6.0,
                    damage: 9.0,
                    radius: 4.0,
                    range: 480.0,
                    interval_ms: 1_800,
                }),
            },
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Slime => 0,
            Self::Devil => 1,
            Self::Skeleton => 2,
            Self::FrostWraith => 3,
            Self::BomberBeetle => 4,
            Self::StormMage => 5,
        }
    }
}

/// Constant gameplay parameters attached to an [`EnemyKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting health.
    pub health: f32,
    /// Collision radius before size scaling.
    pub base_radius: f32,
    /// Multiplier applied to the base radius.
    pub size_scale: f32,
    /// Movement speed in arena units per tick at a delta scale of one.
    pub speed: f32,
    /// Damage dealt to the player on contact.
    pub contact_damage: f32,
    /// Score awarded for the kill.
    pub score: u32,
    /// Ranged attack, if the kind has one.
    pub shot: Option<EnemyShot>,
}

impl EnemyStats {
    /// Effective collision radius used by projectile hit tests.
    #[must_use]
    pub fn collision_radius(&self) -> f32 {
        self.base_radius * self.size_scale
    }
}

/// Ranged attack parameters for enemy kinds that shoot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyShot {
    /// Visual of the fired projectile.
    pub visual: ProjectileVisual,
    /// Speed in arena units per tick.
    pub speed: f32,
    /// Damage dealt on hit.
    pub damage: f32,
    /// Projectile collision radius.
    pub radius: f32,
    /// Maximum travel distance.
    pub range: f32,
    /// Minimum time between shots in milliseconds.
    pub interval_ms: u64,
}

impl EnemyShot {
    /// Minimum time between shots.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Per-kind enemy counts rolled for a wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyCounts {
    counts: [u32; EnemyKind::ALL.len()],
}

impl EnemyCounts {
    /// Creates an empty count table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; EnemyKind::ALL.len()],
        }
    }

    /// Count recorded for the provided kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Overwrites the count recorded for the provided kind.
    pub fn set(&mut self, kind: EnemyKind, count: u32) {
        self.counts[kind.index()] = count;
    }

    /// Adds one enemy of the provided kind.
    pub fn increment(&mut self, kind: EnemyKind) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(1);
    }

    /// Sum across every kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Iterator over `(kind, count)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EnemyKind, u32)> + '_ {
        EnemyKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.counts[kind.index()]))
    }
}

/// Result of starting a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveComposition {
    /// Wave number that was started.
    pub wave: u32,
    /// Per-kind counts after variety correction.
    pub counts: EnemyCounts,
    /// Enemy total rolled before per-kind distribution.
    pub total: u32,
}

/// Read-only progress of the current wave for UI display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveProgress {
    /// Current wave number; zero before the first wave.
    pub wave: u32,
    /// Enemies killed since the wave started.
    pub killed: u32,
    /// Enemies rolled for the wave.
    pub total: u32,
    /// Enemies spawned for the wave, which may exceed `total`.
    pub spawned: u32,
    /// Whether the wave is still running.
    pub in_progress: bool,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side that owns a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Fired by the player, hits enemies.
    Player,
    /// Fired by an enemy, hits the player.
    Enemy,
}

/// Visual tag carried by a projectile for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileVisual {
    /// Default player shot.
    Arrow,
    /// Devil shot.
    Fireball,
    /// Skeleton shot.
    Bone,
    /// Frost wraith shot.
    Frost,
    /// Storm mage shot.
    Lightning,
}

/// Immutable representation of a hit target supplied to projectile systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    /// Identifier reported back through the hit callback.
    pub id: EnemyId,
    /// Center of the target; targets without a position are never hit.
    pub position: Option<Vec2>,
    /// Collision radius before size scaling.
    pub base_radius: f32,
    /// Multiplier applied to the base radius.
    pub size_scale: f32,
}

impl TargetSnapshot {
    /// Effective collision radius of the target.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.base_radius * self.size_scale
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current center.
    pub position: Vec2,
    /// Health left.
    pub health: f32,
}

impl EnemySnapshot {
    /// Collision target describing the enemy for projectile systems.
    #[must_use]
    pub fn target(&self) -> TargetSnapshot {
        let stats = self.kind.stats();
        TargetSnapshot {
            id: self.id,
            position: Some(self.position),
            base_radius: stats.base_radius,
            size_scale: stats.size_scale,
        }
    }
}

/// Immutable representation of the player character used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    /// Current center.
    pub position: Vec2,
    /// Health left.
    pub health: f32,
    /// Health the player started with.
    pub max_health: f32,
    /// Enemies killed by the player.
    pub kills: u32,
    /// Score accumulated from kills.
    pub score: u32,
    /// Damage absorbed over the session.
    pub damage_taken: f32,
}

impl PlayerSnapshot {
    /// Reports whether the player still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Collaborator that materializes enemies requested by a wave start.
pub trait SpawnSink {
    /// Creates a single enemy of the provided kind.
    fn spawn(&mut self, kind: EnemyKind);
}

impl<F> SpawnSink for F
where
    F: FnMut(EnemyKind),
{
    fn spawn(&mut self, kind: EnemyKind) {
        self(kind);
    }
}

/// Fire-and-forget presentation collaborator used by the projectile system.
pub trait EffectSink {
    /// Plays an impact effect where a projectile hit.
    fn impact(&mut self, position: Vec2, visual: ProjectileVisual);

    /// Frees display resources associated with a removed projectile.
    fn release(&mut self, projectile: ProjectileId);
}

/// Effect sink that discards every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEffects;

impl EffectSink for NoEffects {
    fn impact(&mut self, _position: Vec2, _visual: ProjectileVisual) {}

    fn release(&mut self, _projectile: ProjectileId) {}
}

/// How a registered kill feeds into wave completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Every kill checks completion with zero remaining enemies, so the first
    /// kill completes the wave.
    #[default]
    AnyKill,
    /// Kills check completion with the number of spawned enemies still alive.
    RemainingCount,
}

/// Difficulty knobs that drive wave composition and pacing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyProfile {
    /// Enemy count of the first wave before randomization.
    pub base_enemy_count: f64,
    /// Additional enemies per wave after the first.
    pub growth_rate: f64,
    /// Elite chance gained per wave.
    pub elite_chance_per_wave: f64,
    /// Half-width of the symmetric random multiplier applied to the count.
    pub variance: f64,
    /// Delay between scheduling and starting the next wave, in milliseconds.
    pub wave_start_delay_ms: u64,
    /// How kills feed into wave completion.
    pub completion_policy: CompletionPolicy,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self {
            base_enemy_count: 5.0,
            growth_rate: 2.5,
            elite_chance_per_wave: 0.08,
            variance: 0.3,
            wave_start_delay_ms: 3_000,
            completion_policy: CompletionPolicy::AnyKill,
        }
    }
}

impl DifficultyProfile {
    /// Delay between scheduling and starting the next wave.
    #[must_use]
    pub const fn wave_start_delay(&self) -> Duration {
        Duration::from_millis(self.wave_start_delay_ms)
    }

    /// Elite chance for the provided wave, capped at [`MAX_ELITE_CHANCE`].
    #[must_use]
    pub fn elite_chance(&self, wave: u32) -> f64 {
        (f64::from(wave) * self.elite_chance_per_wave).min(MAX_ELITE_CHANCE)
    }

    /// Rejects knobs that would produce nonsensical waves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("base_enemy_count", self.base_enemy_count)?;
        check_non_negative("growth_rate", self.growth_rate)?;
        check_non_negative("elite_chance_per_wave", self.elite_chance_per_wave)?;
        check_non_negative("variance", self.variance)?;
        if self.variance > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "variance",
                value: self.variance,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Parameters of projectiles fired by the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Speed in arena units per tick.
    pub player_shot_speed: f32,
    /// Damage dealt on hit.
    pub player_shot_damage: f32,
    /// Projectile collision radius.
    pub player_shot_radius: f32,
    /// Maximum travel distance.
    pub player_shot_range: f32,
    /// Extra distance added when enemy projectiles test the player.
    pub player_hit_margin: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_shot_speed: 8.0,
            player_shot_damage: 20.0,
            player_shot_radius: 3.0,
            player_shot_range: 500.0,
            player_hit_margin: PLAYER_HIT_MARGIN,
        }
    }
}

impl ProjectileTuning {
    /// Rejects tunings that would produce inert or invalid projectiles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("player_shot_speed", f64::from(self.player_shot_speed))?;
        check_non_negative("player_shot_damage", f64::from(self.player_shot_damage))?;
        check_non_negative("player_shot_radius", f64::from(self.player_shot_radius))?;
        check_positive("player_shot_range", f64::from(self.player_shot_range))?;
        check_non_negative("player_hit_margin", f64::from(self.player_hit_margin))
    }
}

/// Reasons a configuration is rejected before a session starts.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A parameter was NaN or infinite.
    #[error("`{field}` must be finite, got {value}")]
    NotFinite {
        /// Name of the offending parameter.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A parameter fell outside its allowed interval.
    #[error("`{field}` must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the offending parameter.
        field: &'static str,
        /// Rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_non_negative(field, value)?;
    if value == 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::INFINITY,
        });
    }
    Ok(())
}
