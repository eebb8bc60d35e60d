//! Player character owned by a game session.

use std::time::Duration;

use arena_combat_core::{PlayerSnapshot, Vec2};

/// Collision radius of the player body used for enemy contact.
pub(crate) const PLAYER_BODY_RADIUS: f32 = 12.0;

#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) fire_cooldown: Duration,
    pub(crate) kills: u32,
    pub(crate) score: u32,
    pub(crate) damage_taken: f32,
}

impl PlayerState {
    pub(crate) fn new(position: Vec2, max_health: f32) -> Self {
        Self {
            position,
            health: max_health,
            max_health,
            fire_cooldown: Duration::ZERO,
            kills: 0,
            score: 0,
            damage_taken: 0.0,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Position used for hit tests; a defeated player cannot be targeted.
    pub(crate) fn hit_point(&self) -> Option<Vec2> {
        self.is_alive().then_some(self.position)
    }

    /// Applies damage and reports whether this hit defeated the player.
    pub(crate) fn take_damage(&mut self, damage: f32) -> bool {
        if !self.is_alive() {
            return false;
        }

        self.health = (self.health - damage).max(0.0);
        self.damage_taken += damage;
        !self.is_alive()
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            kills: self.kills,
            score: self.score,
            damage_taken: self.damage_taken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defeat_is_reported_once() {
        let mut player = PlayerState::new(Vec2::ZERO, 20.0);
        assert!(!player.take_damage(15.0));
        assert!(player.take_damage(15.0));
        assert_eq!(player.health, 0.0);
        assert!(!player.take_damage(15.0), "dead players absorb nothing");
        assert_eq!(player.damage_taken, 30.0);
        assert_eq!(player.hit_point(), None);
    }
}
