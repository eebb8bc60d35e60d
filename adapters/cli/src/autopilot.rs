//! Scripted player that drives a headless session.
//!
//! Each frame the autopilot backs away from enemies that get too close, fires
//! at the nearest enemy, and then advances the session by one tick.

use std::time::Duration;

use anyhow::{Context, Result};
use arena_combat_core::{Command, EnemySnapshot, Event, Vec2};
use arena_combat_world::{self as world, query, GameSession, SessionConfig, SessionSummary};
use serde::Serialize;
use tracing::{debug, info};

const RETREAT_DISTANCE: f32 = 120.0;
const RETREAT_SPEED: f32 = 3.0;

/// Bounds of a headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunLimits {
    /// Stop once this many waves have completed.
    pub(crate) waves: u32,
    /// Stop after this many ticks regardless of progress.
    pub(crate) max_ticks: u64,
    /// Simulated time per tick.
    pub(crate) frame: Duration,
}

/// Outcome of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RunReport {
    pub(crate) target_waves: u32,
    pub(crate) waves_completed: u32,
    pub(crate) progress: String,
    pub(crate) summary: SessionSummary,
}

/// Runs a session until the wave target is met, the player falls, or the tick
/// budget runs out.
pub(crate) fn run(config: SessionConfig, limits: RunLimits) -> Result<RunReport> {
    let mut session = GameSession::new(config).context("failed to create game session")?;
    let mut events = Vec::new();
    world::apply(&mut session, Command::StartWave { wave: 1 }, &mut events);

    let mut waves_completed = 0;
    let mut defeated = false;
    let delta_scale = limits.frame.as_secs_f32() * 60.0;

    while query::tick_index(&session) < limits.max_ticks {
        events.clear();
        steer(&mut session, &mut events);
        world::apply(
            &mut session,
            Command::Tick {
                dt: limits.frame,
                delta_scale,
            },
            &mut events,
        );

        for event in &events {
            match event {
                Event::WaveCompleted { wave } => {
                    waves_completed += 1;
                    debug!(wave, "autopilot observed wave completion");
                }
                Event::PlayerDefeated => defeated = true,
                _ => {}
            }
        }

        if defeated || waves_completed >= limits.waves {
            break;
        }
    }

    let progress = query::wave_progress_text(&session);
    events.clear();
    let summary = session.finish(&mut events);
    info!(waves_completed, defeated, "headless run finished");

    Ok(RunReport {
        target_waves: limits.waves,
        waves_completed,
        progress,
        summary,
    })
}

fn steer(session: &mut GameSession, events: &mut Vec<Event>) {
    let player = query::player(session).position;
    let enemies = query::enemies(session);
    let Some(nearest) = nearest_enemy(player, &enemies) else {
        return;
    };

    let away = player - nearest.position;
    if away.length() < RETREAT_DISTANCE {
        let position = player + away.normalize_or_zero() * RETREAT_SPEED;
        world::apply(session, Command::MovePlayer { position }, events);
    }

    world::apply(
        session,
        Command::FirePlayerShot {
            direction: nearest.position - query::player(session).position,
        },
        events,
    );
}

fn nearest_enemy(player: Vec2, enemies: &[EnemySnapshot]) -> Option<EnemySnapshot> {
    enemies.iter().copied().min_by(|a, b| {
        a.position
            .distance_squared(player)
            .total_cmp(&b.position.distance_squared(player))
    })
}
