use arena_combat_core::{
    EffectSink, EnemyId, NoEffects, ProjectileId, ProjectileVisual, TargetSnapshot, Vec2,
};
use arena_combat_system_projectiles::{AdvanceSummary, EnemyShot, PlayerShot, ProjectileSimulator};

#[derive(Debug, Default)]
struct RecordingEffects {
    impacts: Vec<(Vec2, ProjectileVisual)>,
    released: Vec<ProjectileId>,
}

impl EffectSink for RecordingEffects {
    fn impact(&mut self, position: Vec2, visual: ProjectileVisual) {
        self.impacts.push((position, visual));
    }

    fn release(&mut self, projectile: ProjectileId) {
        self.released.push(projectile);
    }
}

fn shot(origin: Vec2, velocity: Vec2, radius: f32, range: f32) -> PlayerShot {
    PlayerShot {
        origin,
        velocity,
        damage: 25.0,
        radius,
        range,
        visual: ProjectileVisual::Arrow,
    }
}

fn target(id: u32, position: Vec2, base_radius: f32, size_scale: f32) -> TargetSnapshot {
    TargetSnapshot {
        id: EnemyId::new(id),
        position: Some(position),
        base_radius,
        size_scale,
    }
}

fn ticks_until_expired(range: f32, speed: f32, delta_scale: f32) -> usize {
    let mut simulator = ProjectileSimulator::new();
    let _ = simulator.spawn_player(shot(Vec2::ZERO, Vec2::new(speed, 0.0), 1.0, range));
    let mut ticks = 0;
    while !simulator.is_empty() {
        ticks += 1;
        assert!(ticks < 1_000, "projectile never expired");
        let summary = simulator.advance(
            delta_scale,
            &[],
            |_, _| panic!("no targets to hit"),
            &mut NoEffects,
        );
        assert_eq!(summary.hits, 0);
    }
    ticks
}

#[test]
fn range_exhaustion_matches_ceiling_of_travel() {
    assert_eq!(ticks_until_expired(10.0, 2.5, 1.0), 4);
    assert_eq!(ticks_until_expired(10.0, 3.0, 1.0), 4);
    assert_eq!(ticks_until_expired(10.0, 1.0, 1.0), 10);
    assert_eq!(ticks_until_expired(10.0, 2.0, 0.5), 10);
    assert_eq!(ticks_until_expired(12.0, 2.0, 2.0), 3);
}

#[test]
fn range_exhaustion_ignores_float_drift() {
    // Neither step is exact in binary; the accumulated error must not add a tick.
    assert_eq!(ticks_until_expired(3.0, 0.3, 1.0), 10);
    assert_eq!(ticks_until_expired(1.0, 0.2, 1.0), 5);
    assert_eq!(ticks_until_expired(7.0, 0.7, 1.0), 10);
    assert_eq!(ticks_until_expired(10.0, 1.0, 0.1), 100);
}

#[test]
fn close_target_is_hit_on_first_tick() {
    let mut simulator = ProjectileSimulator::new();
    let id = simulator.spawn_player(shot(Vec2::ZERO, Vec2::new(1.0, 0.0), 3.0, 10.0));
    let targets = [target(7, Vec2::new(5.0, 0.0), 14.0, 1.0)];
    let mut effects = RecordingEffects::default();
    let mut hits = Vec::new();

    let summary = simulator.advance(
        1.0,
        &targets,
        |enemy, damage| hits.push((enemy, damage)),
        &mut effects,
    );

    assert_eq!(summary, AdvanceSummary { hits: 1, expired: 0 });
    assert_eq!(hits, vec![(EnemyId::new(7), 25.0)]);
    assert!(simulator.is_empty(), "hit projectile must be removed same tick");
    assert_eq!(effects.impacts, vec![(Vec2::new(1.0, 0.0), ProjectileVisual::Arrow)]);
    assert_eq!(effects.released, vec![id]);

    let summary = simulator.advance(
        1.0,
        &targets,
        |_, _| panic!("removed projectile hit again"),
        &mut effects,
    );
    assert_eq!(summary, AdvanceSummary::default());
}

#[test]
fn first_target_in_list_order_wins() {
    let mut simulator = ProjectileSimulator::new();
    let _ = simulator.spawn_player(shot(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.0, 50.0));
    let targets = [
        target(1, Vec2::new(8.0, 0.0), 10.0, 1.0),
        target(2, Vec2::new(1.0, 0.0), 10.0, 1.0),
    ];
    let mut hits = Vec::new();

    let _ = simulator.advance(1.0, &targets, |enemy, _| hits.push(enemy), &mut NoEffects);

    assert_eq!(hits, vec![EnemyId::new(1)], "list order beats proximity");
}

#[test]
fn size_scale_grows_the_collision_radius() {
    let far = Vec2::new(20.0, 0.0);
    let mut hits = 0;

    let mut simulator = ProjectileSimulator::new();
    let _ = simulator.spawn_player(shot(Vec2::ZERO, Vec2::ZERO, 2.0, 50.0));
    let _ = simulator.advance(
        1.0,
        &[target(1, far, 10.0, 1.0)],
        |_, _| hits += 1,
        &mut NoEffects,
    );
    assert_eq!(hits, 0, "unscaled target is out of reach");

    let _ = simulator.advance(
        1.0,
        &[target(1, far, 10.0, 2.0)],
        |_, _| hits += 1,
        &mut NoEffects,
    );
    assert_eq!(hits, 1, "doubled target reaches the projectile");
}

#[test]
fn expired_projectiles_release_without_impact() {
    let mut simulator = ProjectileSimulator::new();
    let id = simulator.spawn_player(shot(Vec2::ZERO, Vec2::new(5.0, 0.0), 1.0, 5.0));
    let mut effects = RecordingEffects::default();

    let summary = simulator.advance(
        1.0,
        &[target(1, Vec2::new(100.0, 0.0), 5.0, 1.0)],
        |_, _| panic!("target is out of reach"),
        &mut effects,
    );

    assert_eq!(summary, AdvanceSummary { hits: 0, expired: 1 });
    assert!(effects.impacts.is_empty());
    assert_eq!(effects.released, vec![id]);
}

#[test]
fn enemy_projectiles_hit_player_with_margin() {
    let mut simulator = ProjectileSimulator::new();
    let _ = simulator.spawn_enemy(EnemyShot {
        origin: Vec2::new(30.0, 0.0),
        direction: Vec2::new(-1.0, 0.0),
        speed: 4.0,
        damage: 12.0,
        radius: 6.0,
        range: 400.0,
        visual: ProjectileVisual::Fireball,
    });
    let mut damage_taken = Vec::new();
    let mut ticks = 0;

    while !simulator.is_empty() {
        ticks += 1;
        let _ = simulator.advance_against_player(
            1.0,
            Some(Vec2::ZERO),
            10.0,
            |damage| damage_taken.push(damage),
            &mut NoEffects,
        );
    }

    // Reach is 16: positions 26, 22, 18, 14 -> hit on the fourth tick.
    assert_eq!(ticks, 4);
    assert_eq!(damage_taken, vec![12.0]);
}

#[test]
fn absent_player_cannot_be_hit() {
    let mut simulator = ProjectileSimulator::new();
    let _ = simulator.spawn_enemy(EnemyShot {
        origin: Vec2::ZERO,
        direction: Vec2::X,
        speed: 2.0,
        damage: 5.0,
        radius: 50.0,
        range: 4.0,
        visual: ProjectileVisual::Bone,
    });

    let first = simulator.advance_against_player(
        1.0,
        None,
        10.0,
        |_| panic!("no player to hit"),
        &mut NoEffects,
    );
    assert_eq!(first, AdvanceSummary::default());
    let second = simulator.advance_against_player(
        1.0,
        None,
        10.0,
        |_| panic!("no player to hit"),
        &mut NoEffects,
    );
    assert_eq!(second, AdvanceSummary { hits: 0, expired: 1 });
}

#[test]
fn sides_advance_independently() {
    let mut simulator = ProjectileSimulator::new();
    let _ = simulator.spawn_player(shot(Vec2::ZERO, Vec2::X, 1.0, 100.0));
    let _ = simulator.spawn_enemy(EnemyShot {
        origin: Vec2::new(50.0, 50.0),
        direction: Vec2::Y,
        speed: 1.0,
        damage: 1.0,
        radius: 1.0,
        range: 100.0,
        visual: ProjectileVisual::Lightning,
    });

    let _ = simulator.advance(1.0, &[], |_, _| {}, &mut NoEffects);

    assert_eq!(simulator.player_projectiles()[0].position, Vec2::new(1.0, 0.0));
    assert_eq!(simulator.enemy_projectiles()[0].position, Vec2::new(50.0, 50.0));
}

#[test]
fn clear_releases_every_projectile() {
    let mut simulator = ProjectileSimulator::new();
    let a = simulator.spawn_player(shot(Vec2::ZERO, Vec2::X, 1.0, 100.0));
    let b = simulator.spawn_enemy(EnemyShot {
        origin: Vec2::ZERO,
        direction: Vec2::Y,
        speed: 1.0,
        damage: 1.0,
        radius: 1.0,
        range: 100.0,
        visual: ProjectileVisual::Frost,
    });
    let mut effects = RecordingEffects::default();

    simulator.clear(&mut effects);

    assert!(simulator.is_empty());
    assert_eq!(effects.released, vec![a, b]);
}
