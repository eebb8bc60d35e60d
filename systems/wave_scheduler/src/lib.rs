#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system that rolls enemy compositions and paces waves.
//!
//! The scheduler owns the wave counters for a single play session. Starting a
//! wave rolls a difficulty-scaled enemy total, distributes it across enemy
//! kinds with independent per-slot rolls, and hands every enemy to a
//! [`SpawnSink`]. A single timer slot gates the start of the next wave.

use std::time::Duration;

use arena_combat_core::{
    CompletionPolicy, DifficultyProfile, EnemyCounts, EnemyKind, SpawnSink, WaveComposition,
    WaveProgress, MIN_WAVE_ENEMIES,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

const DEVIL_SHARE: f64 = 0.3;
const SKELETON_SHARE: f64 = 0.7;
const DEVIL_GUARANTEE_WAVE: u32 = 3;
const SKELETON_GUARANTEE_WAVE: u32 = 2;

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    profile: DifficultyProfile,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided difficulty and seed.
    #[must_use]
    pub const fn new(profile: DifficultyProfile, rng_seed: u64) -> Self {
        Self { profile, rng_seed }
    }
}

/// Mutable wave counters owned by the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveState {
    /// Wave most recently started; zero before the first wave.
    pub current_wave: u32,
    /// Kills registered since the current wave started.
    pub enemies_killed_this_wave: u32,
    /// Enemy total rolled for the current wave.
    pub total_enemies_this_wave: u32,
    /// Enemies actually handed to the spawner; the variety correction can
    /// push this above the rolled total.
    pub spawned_this_wave: u32,
    /// Whether the current wave is still running.
    pub in_progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingWave {
    wave: u32,
    remaining: Duration,
}

/// Tracks wave progress and decides the composition of upcoming waves.
#[derive(Debug)]
pub struct WaveScheduler {
    profile: DifficultyProfile,
    rng: ChaCha8Rng,
    state: WaveState,
    pending: Option<PendingWave>,
}

impl WaveScheduler {
    /// Creates a scheduler with all-zero wave state.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            profile: config.profile,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            state: WaveState::default(),
            pending: None,
        }
    }

    /// Difficulty profile driving the scheduler.
    #[must_use]
    pub const fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Current wave counters.
    #[must_use]
    pub const fn state(&self) -> WaveState {
        self.state
    }

    /// Rolls the composition of `wave`, spawns every enemy through `spawner`
    /// and marks the wave as in progress.
    pub fn start_wave<S>(&mut self, wave: u32, spawner: &mut S) -> WaveComposition
    where
        S: SpawnSink + ?Sized,
    {
        let composition = roll_composition(&self.profile, wave, &mut self.rng);

        for (kind, count) in composition.counts.iter() {
            for _ in 0..count {
                spawner.spawn(kind);
            }
        }

        self.state = WaveState {
            current_wave: wave,
            enemies_killed_this_wave: 0,
            total_enemies_this_wave: composition.total,
            spawned_this_wave: composition.counts.total(),
            in_progress: true,
        };

        info!(
            wave,
            total = composition.total,
            spawned = composition.counts.total(),
            slime = composition.counts.get(EnemyKind::Slime),
            skeleton = composition.counts.get(EnemyKind::Skeleton),
            devil = composition.counts.get(EnemyKind::Devil),
            "wave started"
        );
        composition
    }

    /// Records a kill and checks whether the wave is complete.
    ///
    /// Returns `true` when this kill completed the wave.
    pub fn register_kill(&mut self) -> bool {
        if self.state.in_progress {
            self.state.enemies_killed_this_wave =
                self.state.enemies_killed_this_wave.saturating_add(1);
            debug!(
                wave = self.state.current_wave,
                killed = self.state.enemies_killed_this_wave,
                "kill registered"
            );
        }

        let remaining = match self.profile.completion_policy {
            CompletionPolicy::AnyKill => 0,
            CompletionPolicy::RemainingCount => self
                .state
                .spawned_this_wave
                .saturating_sub(self.state.enemies_killed_this_wave),
        };
        self.check_completion(remaining)
    }

    /// Marks the wave complete when no enemies remain.
    ///
    /// Returns `true` only on the call that transitions the wave out of
    /// progress; every later call returns `false` until a new wave starts.
    pub fn check_completion(&mut self, remaining_enemies: u32) -> bool {
        if !self.state.in_progress {
            return false;
        }

        if remaining_enemies != 0 {
            return false;
        }

        self.state.in_progress = false;
        info!(
            wave = self.state.current_wave,
            killed = self.state.enemies_killed_this_wave,
            "wave completed"
        );
        true
    }

    /// Arms the next-wave timer, replacing any timer already pending.
    ///
    /// Returns the wave number the timer will start.
    pub fn schedule_next_wave(&mut self) -> u32 {
        let wave = self.state.current_wave.saturating_add(1);
        if let Some(previous) = self.pending.take() {
            debug!(wave = previous.wave, "pending wave timer cancelled");
        }
        self.pending = Some(PendingWave {
            wave,
            remaining: self.profile.wave_start_delay(),
        });
        debug!(
            wave,
            delay_ms = self.profile.wave_start_delay_ms,
            "next wave scheduled"
        );
        wave
    }

    /// Drops the pending next-wave timer, reporting whether one was armed.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Wave targeted by the pending timer, if any.
    #[must_use]
    pub fn pending_wave(&self) -> Option<u32> {
        self.pending.map(|pending| pending.wave)
    }

    /// Time left before the pending timer fires, if any.
    #[must_use]
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.remaining)
    }

    /// Counts the pending timer down by `dt` and invokes `on_next_wave` once
    /// when it expires.
    pub fn advance_timer<F>(&mut self, dt: Duration, on_next_wave: F) -> bool
    where
        F: FnOnce(u32),
    {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        pending.remaining = pending.remaining.saturating_sub(dt);
        if !pending.remaining.is_zero() {
            return false;
        }

        let wave = pending.wave;
        self.pending = None;
        on_next_wave(wave);
        true
    }

    /// Progress of the current wave for display.
    #[must_use]
    pub const fn progress(&self) -> WaveProgress {
        WaveProgress {
            wave: self.state.current_wave,
            killed: self.state.enemies_killed_this_wave,
            total: self.state.total_enemies_this_wave,
            spawned: self.state.spawned_this_wave,
            in_progress: self.state.in_progress,
        }
    }

    /// Human-readable progress line, e.g. `Wave 3: 4/12`.
    #[must_use]
    pub fn progress_text(&self) -> String {
        format!(
            "Wave {}: {}/{}",
            self.state.current_wave,
            self.state.enemies_killed_this_wave,
            self.state.total_enemies_this_wave
        )
    }
}

/// Rolls the enemy composition for `wave` without touching any scheduler state.
///
/// Only slimes, skeletons and devils are produced; the remaining kinds are
/// never rolled.
pub fn roll_composition<R>(profile: &DifficultyProfile, wave: u32, rng: &mut R) -> WaveComposition
where
    R: Rng,
{
    let total = roll_total(profile, wave, rng);
    let elite_chance = profile.elite_chance(wave);

    let mut counts = EnemyCounts::new();
    for _ in 0..total {
        let roll: f64 = rng.gen();
        let kind = if roll < elite_chance * DEVIL_SHARE {
            EnemyKind::Devil
        } else if roll < elite_chance * SKELETON_SHARE {
            EnemyKind::Skeleton
        } else {
            EnemyKind::Slime
        };
        counts.increment(kind);
    }

    if wave >= DEVIL_GUARANTEE_WAVE && counts.get(EnemyKind::Devil) == 0 {
        let moved = rng.gen_range(1..=2);
        reassign_slimes(&mut counts, EnemyKind::Devil, moved);
    }

    if wave >= SKELETON_GUARANTEE_WAVE && counts.get(EnemyKind::Skeleton) == 0 {
        let moved = rng.gen_range(1..=2);
        reassign_slimes(&mut counts, EnemyKind::Skeleton, moved);
    }

    WaveComposition {
        wave,
        counts,
        total,
    }
}

fn roll_total<R>(profile: &DifficultyProfile, wave: u32, rng: &mut R) -> u32
where
    R: Rng,
{
    let growth = (f64::from(wave) - 1.0) * profile.growth_rate;
    let base = (profile.base_enemy_count + growth).floor();
    let spread: f64 = rng.gen::<f64>() * 2.0 - 1.0;
    let multiplier = 1.0 + spread * profile.variance;
    let rolled = (base * multiplier).floor();
    (rolled as u32).max(MIN_WAVE_ENEMIES)
}

fn reassign_slimes(counts: &mut EnemyCounts, kind: EnemyKind, moved: u32) {
    let slimes = counts.get(EnemyKind::Slime);
    counts.set(EnemyKind::Slime, slimes.saturating_sub(moved));
    counts.set(kind, counts.get(kind).saturating_add(moved));
}
