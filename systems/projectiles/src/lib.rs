#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile system that advances shots, resolves first-hit collisions and
//! retires spent projectiles.
//!
//! Player shots are tested against a list of enemy targets; enemy shots are
//! tested against the single player point. Collision is a plain distance check
//! in target list order, so the first qualifying target wins.

use arena_combat_core::{
    EffectSink, EnemyId, ProjectileId, ProjectileVisual, TargetSnapshot, Vec2,
};
use tracing::debug;

/// Share of the initial range below which a projectile counts as spent.
///
/// Absorbs f32 drift from subtracting the per-tick travel, so a range that
/// is an exact multiple of the step expires on the expected tick.
const RANGE_TOLERANCE: f32 = 1e-4;

/// Parameters of a projectile fired by the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerShot {
    /// Spawn position.
    pub origin: Vec2,
    /// Displacement per tick at a delta scale of one.
    pub velocity: Vec2,
    /// Damage dealt on hit.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Travel distance before the shot expires.
    pub range: f32,
    /// Visual tag for presentation.
    pub visual: ProjectileVisual,
}

/// Parameters of a projectile fired by an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyShot {
    /// Spawn position.
    pub origin: Vec2,
    /// Direction of travel; normalized on spawn.
    pub direction: Vec2,
    /// Distance covered per tick at a delta scale of one.
    pub speed: f32,
    /// Damage dealt on hit.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Travel distance before the shot expires.
    pub range: f32,
    /// Visual tag for presentation.
    pub visual: ProjectileVisual,
}

/// Live projectile owned by the simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    /// Identifier allocated on spawn.
    pub id: ProjectileId,
    /// Current center.
    pub position: Vec2,
    /// Displacement per tick at a delta scale of one.
    pub velocity: Vec2,
    /// Damage dealt on hit.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Travel distance granted on spawn.
    pub range: f32,
    /// Distance left before the projectile expires.
    pub range_remaining: f32,
    /// Visual tag for presentation.
    pub visual: ProjectileVisual,
}

impl Projectile {
    fn step(&mut self, delta_scale: f32) {
        let displacement = self.velocity * delta_scale;
        self.position += displacement;
        self.range_remaining -= displacement.length();
    }

    fn is_spent(&self) -> bool {
        self.range_remaining <= self.range * RANGE_TOLERANCE
    }
}

/// Number of projectiles retired during a single advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    /// Projectiles removed because they hit something.
    pub hits: usize,
    /// Projectiles removed because their range ran out.
    pub expired: usize,
}

/// Owns every live projectile for both sides.
#[derive(Debug, Default)]
pub struct ProjectileSimulator {
    player: Vec<Projectile>,
    enemy: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileSimulator {
    /// Creates an empty simulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a player projectile and returns its identifier.
    pub fn spawn_player(&mut self, shot: PlayerShot) -> ProjectileId {
        let id = self.allocate_id();
        self.player.push(Projectile {
            id,
            position: shot.origin,
            velocity: shot.velocity,
            damage: shot.damage,
            radius: shot.radius,
            range: shot.range,
            range_remaining: shot.range,
            visual: shot.visual,
        });
        id
    }

    /// Appends an enemy projectile and returns its identifier.
    ///
    /// A zero direction produces a stationary shot that expires only if its
    /// range is already spent.
    pub fn spawn_enemy(&mut self, shot: EnemyShot) -> ProjectileId {
        let id = self.allocate_id();
        self.enemy.push(Projectile {
            id,
            position: shot.origin,
            velocity: shot.direction.normalize_or_zero() * shot.speed,
            damage: shot.damage,
            radius: shot.radius,
            range: shot.range,
            range_remaining: shot.range,
            visual: shot.visual,
        });
        id
    }

    /// Advances player projectiles and resolves hits against `targets`.
    ///
    /// `on_hit` receives the first target in list order whose distance to the
    /// projectile is below the sum of both radii. Hit and spent projectiles are
    /// removed in the same call and released through `effects`.
    pub fn advance<F, E>(
        &mut self,
        delta_scale: f32,
        targets: &[TargetSnapshot],
        mut on_hit: F,
        effects: &mut E,
    ) -> AdvanceSummary
    where
        F: FnMut(EnemyId, f32),
        E: EffectSink + ?Sized,
    {
        let mut summary = AdvanceSummary::default();
        self.player.retain_mut(|projectile| {
            projectile.step(delta_scale);

            if let Some(target) = first_hit(projectile, targets) {
                debug!(
                    projectile = projectile.id.get(),
                    target = target.get(),
                    damage = projectile.damage,
                    "player projectile hit"
                );
                on_hit(target, projectile.damage);
                retire_hit(projectile, effects);
                summary.hits += 1;
                return false;
            }

            if projectile.is_spent() {
                effects.release(projectile.id);
                summary.expired += 1;
                return false;
            }

            true
        });
        summary
    }

    /// Advances enemy projectiles and resolves hits against the player.
    ///
    /// The player is a point; a hit occurs when the distance is below the
    /// projectile radius plus `hit_margin`. No hits are possible while
    /// `player` is `None`.
    pub fn advance_against_player<F, E>(
        &mut self,
        delta_scale: f32,
        player: Option<Vec2>,
        hit_margin: f32,
        mut on_hit: F,
        effects: &mut E,
    ) -> AdvanceSummary
    where
        F: FnMut(f32),
        E: EffectSink + ?Sized,
    {
        let mut summary = AdvanceSummary::default();
        self.enemy.retain_mut(|projectile| {
            projectile.step(delta_scale);

            let hit = player.is_some_and(|center| {
                projectile.position.distance(center) < projectile.radius + hit_margin
            });
            if hit {
                debug!(
                    projectile = projectile.id.get(),
                    damage = projectile.damage,
                    "enemy projectile hit player"
                );
                on_hit(projectile.damage);
                retire_hit(projectile, effects);
                summary.hits += 1;
                return false;
            }

            if projectile.is_spent() {
                effects.release(projectile.id);
                summary.expired += 1;
                return false;
            }

            true
        });
        summary
    }

    /// Removes every projectile, releasing its display resources.
    pub fn clear<E>(&mut self, effects: &mut E)
    where
        E: EffectSink + ?Sized,
    {
        for projectile in self.player.drain(..).chain(self.enemy.drain(..)) {
            effects.release(projectile.id);
        }
    }

    /// Live player projectiles in spawn order.
    #[must_use]
    pub fn player_projectiles(&self) -> &[Projectile] {
        &self.player
    }

    /// Live enemy projectiles in spawn order.
    #[must_use]
    pub fn enemy_projectiles(&self) -> &[Projectile] {
        &self.enemy
    }

    /// Total number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.player.len() + self.enemy.len()
    }

    /// Reports whether no projectile is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.player.is_empty() && self.enemy.is_empty()
    }

    fn allocate_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

fn first_hit(projectile: &Projectile, targets: &[TargetSnapshot]) -> Option<EnemyId> {
    targets.iter().find_map(|target| {
        let center = target.position?;
        let reach = projectile.radius + target.radius();
        (projectile.position.distance(center) < reach).then_some(target.id)
    })
}

fn retire_hit<E>(projectile: &Projectile, effects: &mut E)
where
    E: EffectSink + ?Sized,
{
    effects.impact(projectile.position, projectile.visual);
    effects.release(projectile.id);
}
