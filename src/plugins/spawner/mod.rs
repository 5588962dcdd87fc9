//! Enemy spawner: reveals its path, releases a stream of enemies along it, and reports back
//! once every enemy it launched has left the path or been shot.
//!
//! ```text
//!   Inactive ──start──► ShowingPath ──► RemovingPath ──► SpawningEnemy ◄──► SpawnCooldown
//!      ▲                                                      │
//!      │                                                      ▼ (last enemy)
//!      └──────────── SpawnerFinished ◄───────── AwaitingPathingToComplete
//! ```
//!
//! The per-spawner machine never touches the ECS. State callbacks only edit [`SpawnerRun`]
//! and queue [`SpawnerRequest`]s; `apply_spawner_requests` is the single system that talks to
//! the enemy pool.

use std::sync::Arc;

use bevy::ecs::message::{Message, MessageReader};
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::common::waves::WaveTable;
use crate::plugins::GameplaySet;
use crate::plugins::enemies::{EnemyFinished, launch_enemy, retire_enemy};
use crate::utilities::pool::PoolHandle;
use crate::utilities::spline::sample_chain;
use crate::utilities::state_machine::{State, StateMachine};

/// Spline progress between two preview samples.
pub const PREVIEW_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnerState {
    Inactive,
    ShowingPath,
    RemovingPath,
    SpawningEnemy,
    SpawnCooldown,
    AwaitingPathingToComplete,
}

/// Side effects queued by state callbacks, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerRequest {
    SpawnEnemy,
    ReleaseOwned,
    Finished,
}

/// Context the spawner's state callbacks run against.
#[derive(Debug, Clone)]
pub struct SpawnerRun {
    pub path: Arc<[Vec3]>,
    pub spawn_interval: f32,
    pub reveal_secs: f32,
    pub traverse_secs: f32,
    pub num_to_spawn: u32,
    pub num_spawned: u32,
    pub num_finished: u32,
    /// Points of the partially drawn path, empty when nothing is shown.
    pub preview: Vec<Vec3>,
    requests: Vec<SpawnerRequest>,
}

type Machine = StateMachine<SpawnerState, SpawnerRun>;

/// Written once each time a spawner's run completes on its own (not when stopped).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnerFinished {
    pub spawner: Entity,
}

/// `WaveTable::spawners` index to spawner entity, filled at Startup.
#[derive(Resource, Debug, Default, Clone)]
pub struct SpawnerRoster(pub Vec<Entity>);

#[derive(Component, Debug)]
pub struct EnemySpawner {
    machine: Machine,
    run: SpawnerRun,
    owned: Vec<PoolHandle>,
    pub colour: Color,
}

impl EnemySpawner {
    pub fn new(path: impl Into<Arc<[Vec3]>>, colour: Color, tunables: &Tunables) -> Self {
        let mut run = SpawnerRun {
            path: path.into(),
            spawn_interval: tunables.spawn_interval_secs,
            reveal_secs: tunables.path_reveal_secs,
            traverse_secs: 1.0,
            num_to_spawn: 0,
            num_spawned: 0,
            num_finished: 0,
            preview: Vec::new(),
            requests: Vec::new(),
        };
        let machine = Machine::with_initial(&mut run, SpawnerState::Inactive, spawner_states());
        Self { machine, run, owned: Vec::new(), colour }
    }

    /// Begin a run of `num_enemies` (at least one), each taking `traverse_secs` to fly the path.
    pub fn start(&mut self, num_enemies: u32, traverse_secs: f32) {
        self.run.num_spawned = 0;
        self.run.num_finished = 0;
        self.run.num_to_spawn = num_enemies.max(1);
        self.run.traverse_secs = traverse_secs;
        self.machine.transition(&mut self.run, SpawnerState::ShowingPath, false);
    }

    /// Abort the run: every owned enemy goes back to the pool and no `SpawnerFinished` is sent.
    pub fn stop(&mut self) {
        self.run.requests.push(SpawnerRequest::ReleaseOwned);
        self.run.preview.clear();
        self.machine.transition(&mut self.run, SpawnerState::Inactive, false);
    }

    pub fn tick(&mut self, dt: f32) {
        self.machine.tick(&mut self.run, dt);
    }

    pub fn on_enemy_finished(&mut self) {
        self.run.num_finished += 1;
    }

    pub fn state(&self) -> SpawnerState {
        self.machine.current_state().unwrap_or(SpawnerState::Inactive)
    }

    pub fn is_spawning(&self) -> bool {
        self.state() != SpawnerState::Inactive
    }

    pub fn run(&self) -> &SpawnerRun {
        &self.run
    }

    pub fn preview(&self) -> &[Vec3] {
        &self.run.preview
    }

    pub fn owned(&self) -> &[PoolHandle] {
        &self.owned
    }

    pub fn take_requests(&mut self) -> Vec<SpawnerRequest> {
        std::mem::take(&mut self.run.requests)
    }
}

// -----------------------------------------------------------------------------
// States
// -----------------------------------------------------------------------------

fn spawner_states() -> [(SpawnerState, State<SpawnerState, SpawnerRun>); 6] {
    [
        (SpawnerState::Inactive, State::empty()),
        (SpawnerState::ShowingPath, State::empty().on_update(showing_path_update)),
        (
            SpawnerState::RemovingPath,
            State::empty().on_update(removing_path_update).on_exit(removing_path_exit),
        ),
        (SpawnerState::SpawningEnemy, State::empty().on_enter(spawning_enemy_enter)),
        (SpawnerState::SpawnCooldown, State::empty().on_update(spawn_cooldown_update)),
        (
            SpawnerState::AwaitingPathingToComplete,
            State::empty().on_update(awaiting_pathing_update),
        ),
    ]
}

fn reveal_progress(m: &Machine, run: &SpawnerRun) -> f32 {
    m.time_in_current_state() / run.reveal_secs.max(f32::EPSILON)
}

fn showing_path_update(m: &mut Machine, run: &mut SpawnerRun) {
    let t = reveal_progress(m, run);
    sample_chain(&run.path, 0.0, t.min(1.0), PREVIEW_STEP, &mut run.preview);
    if t >= 1.0 {
        m.transition(run, SpawnerState::RemovingPath, false);
    }
}

// Erases from the start of the path: the preview keeps `[t, 1]`, drawn from the end.
fn removing_path_update(m: &mut Machine, run: &mut SpawnerRun) {
    let t = reveal_progress(m, run);
    sample_chain(&run.path, 1.0, t.min(1.0), PREVIEW_STEP, &mut run.preview);
    if m.time_in_current_state() > run.reveal_secs {
        m.transition(run, SpawnerState::SpawningEnemy, false);
    }
}

fn removing_path_exit(_: &mut Machine, run: &mut SpawnerRun) {
    run.preview.clear();
}

fn spawning_enemy_enter(m: &mut Machine, run: &mut SpawnerRun) {
    run.num_spawned += 1;
    run.requests.push(SpawnerRequest::SpawnEnemy);

    let next = if run.num_spawned >= run.num_to_spawn {
        SpawnerState::AwaitingPathingToComplete
    } else {
        SpawnerState::SpawnCooldown
    };
    m.transition(run, next, false);
}

fn spawn_cooldown_update(m: &mut Machine, run: &mut SpawnerRun) {
    if m.time_in_current_state() > run.spawn_interval {
        m.transition(run, SpawnerState::SpawningEnemy, false);
    }
}

fn awaiting_pathing_update(m: &mut Machine, run: &mut SpawnerRun) {
    if run.num_finished >= run.num_to_spawn {
        run.requests.push(SpawnerRequest::ReleaseOwned);
        m.transition(run, SpawnerState::Inactive, false);
        run.requests.push(SpawnerRequest::Finished);
    }
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.init_resource::<SpawnerRoster>()
        .add_message::<SpawnerFinished>()
        .add_systems(Startup, spawn_spawners)
        .add_systems(
            Update,
            (count_finished_enemies, tick_spawners, apply_spawner_requests)
                .chain()
                .in_set(GameplaySet::Spawners),
        );
}

/// Render-only: draw the path preview of every spawner.
pub fn preview_plugin(app: &mut App) {
    app.add_systems(PostUpdate, draw_path_previews);
}

pub fn spawn_spawners(
    mut commands: Commands,
    table: Res<WaveTable>,
    tunables: Res<Tunables>,
    mut roster: ResMut<SpawnerRoster>,
) {
    roster.0.clear();
    for (i, layout) in table.spawners.iter().enumerate() {
        let origin = layout.path.first().copied().unwrap_or(Vec3::ZERO);
        let e = commands
            .spawn((
                Name::new(format!("EnemySpawner({i})")),
                EnemySpawner::new(layout.path.clone(), layout.colour, &tunables),
                Transform::from_translation(origin),
            ))
            .id();
        roster.0.push(e);
    }
}

pub fn count_finished_enemies(
    mut reader: MessageReader<EnemyFinished>,
    mut q: Query<&mut EnemySpawner>,
) {
    for msg in reader.read() {
        if let Ok(mut spawner) = q.get_mut(msg.spawner) {
            spawner.on_enemy_finished();
        }
    }
}

pub fn tick_spawners(time: Res<Time>, mut q: Query<&mut EnemySpawner>) {
    let dt = time.delta_secs();
    for mut spawner in &mut q {
        spawner.tick(dt);
    }
}

/// Exclusive: the only place spawners acquire or release pooled enemies.
pub fn apply_spawner_requests(world: &mut World) {
    let mut pending: Vec<(Entity, Vec<SpawnerRequest>)> = Vec::new();
    let mut q = world.query::<(Entity, &mut EnemySpawner)>();
    for (e, mut spawner) in q.iter_mut(world) {
        if !spawner.run.requests.is_empty() {
            pending.push((e, spawner.take_requests()));
        }
    }

    for (spawner_e, requests) in pending {
        for request in requests {
            match request {
                SpawnerRequest::SpawnEnemy => {
                    let Some(spawner) = world.get::<EnemySpawner>(spawner_e) else {
                        continue;
                    };
                    let path = spawner.run.path.clone();
                    let traverse = spawner.run.traverse_secs;
                    let colour = spawner.colour;

                    let (handle, _) = launch_enemy(world, path, traverse, spawner_e, colour);
                    if let Some(mut spawner) = world.get_mut::<EnemySpawner>(spawner_e) {
                        spawner.owned.push(handle);
                    }
                }
                SpawnerRequest::ReleaseOwned => {
                    let owned = world
                        .get_mut::<EnemySpawner>(spawner_e)
                        .map(|mut s| std::mem::take(&mut s.owned))
                        .unwrap_or_default();
                    for handle in owned {
                        retire_enemy(world, handle);
                    }
                }
                SpawnerRequest::Finished => {
                    debug!("Spawner {spawner_e} finished its run");
                    world.write_message(SpawnerFinished { spawner: spawner_e });
                }
            }
        }
    }
}

fn draw_path_previews(mut gizmos: Gizmos, q: Query<&EnemySpawner>) {
    for spawner in &q {
        let points = spawner.preview();
        if points.len() < 2 {
            continue;
        }
        gizmos.linestrip_gradient_2d(points.iter().enumerate().map(|(i, p)| {
            let fade = 1.0 - 0.5 * i as f32 / (points.len() - 1) as f32;
            (p.truncate(), spawner.colour.with_alpha(fade))
        }));
    }
}

#[cfg(test)]
mod tests;
