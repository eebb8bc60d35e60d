//! Authoritative enemy state management utilities.

use std::{collections::BTreeMap, time::Duration};

use arena_combat_core::{EnemyId, EnemyKind, EnemySnapshot, Vec2};

/// State of a live enemy stored inside the session.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    /// Identifier allocated by the session for the enemy.
    pub(crate) id: EnemyId,
    /// Kind of enemy.
    pub(crate) kind: EnemyKind,
    /// Current center.
    pub(crate) position: Vec2,
    /// Health left.
    pub(crate) health: f32,
    /// Time left before the enemy may shoot again.
    pub(crate) fire_cooldown: Duration,
    /// Time left before the enemy may deal contact damage again.
    pub(crate) contact_cooldown: Duration,
}

impl EnemyState {
    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
        }
    }

    /// Moves toward `goal`, stopping once the bodies touch.
    pub(crate) fn chase(&mut self, goal: Vec2, reach: f32, delta_scale: f32) {
        let offset = goal - self.position;
        let distance = offset.length();
        let gap = distance - reach;
        if gap <= 0.0 {
            return;
        }

        let step = (self.kind.stats().speed * delta_scale).min(gap);
        self.position += offset / distance * step;
    }
}

/// Outcome of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    /// The enemy survived with the provided health.
    Survived(f32),
    /// The enemy died and was removed from the registry.
    Killed(EnemyKind),
    /// No enemy with the identifier exists.
    Missing,
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty enemy registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Inserts a freshly spawned enemy and returns its identifier.
    pub(crate) fn spawn(&mut self, kind: EnemyKind, position: Vec2) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));

        let stats = kind.stats();
        let fire_cooldown = stats
            .shot
            .map_or(Duration::ZERO, |shot| shot.interval());
        let _ = self.entries.insert(
            id,
            EnemyState {
                id,
                kind,
                position,
                health: stats.health,
                fire_cooldown,
                contact_cooldown: Duration::ZERO,
            },
        );
        id
    }

    /// Subtracts `damage` from the enemy's health, removing it on death.
    pub(crate) fn damage(&mut self, id: EnemyId, damage: f32) -> DamageOutcome {
        let Some(enemy) = self.entries.get_mut(&id) else {
            return DamageOutcome::Missing;
        };

        enemy.health -= damage;
        if enemy.health > 0.0 {
            return DamageOutcome::Survived(enemy.health);
        }

        let kind = enemy.kind;
        let _ = self.entries.remove(&id);
        DamageOutcome::Killed(kind)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EnemyState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EnemyState> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
