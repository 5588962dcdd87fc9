//! Spawner unit tests.
//!
//! The state flow is tested on a bare `EnemySpawner` (no World). Pool side effects go through
//! `apply_spawner_requests` on a small World.

use bevy::ecs::message::Messages;

use super::*;
use crate::common::test_utils::run_system_once;
use crate::plugins::enemies::{EnemyPool, init_enemy_pool};

fn path() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(100.0, 50.0, 0.0),
        Vec3::new(200.0, 0.0, 0.0),
    ]
}

fn spawner() -> EnemySpawner {
    // reveal 2 s, interval 0.5 s
    EnemySpawner::new(path(), Color::WHITE, &Tunables::default())
}

/// From `start` to the first `SpawnEnemy` request: 2 s showing + just over 2 s removing.
fn skip_reveal(s: &mut EnemySpawner) {
    s.tick(1.0);
    s.tick(1.0);
    s.tick(1.0);
    s.tick(1.0);
    s.tick(0.1);
}

// -----------------------------------------------------------------------------
// State flow
// -----------------------------------------------------------------------------

#[test]
fn new_spawner_is_idle() {
    let mut s = spawner();
    assert_eq!(s.state(), SpawnerState::Inactive);
    assert!(!s.is_spawning());

    s.tick(10.0);
    assert_eq!(s.state(), SpawnerState::Inactive);
    assert!(s.take_requests().is_empty());
}

#[test]
fn start_reveals_then_erases_the_path() {
    let mut s = spawner();
    s.start(3, 4.0);
    assert_eq!(s.state(), SpawnerState::ShowingPath);

    s.tick(1.0);
    assert_eq!(s.state(), SpawnerState::ShowingPath);
    // Half the path, 0.01 apart, starting at the first control point.
    assert_eq!(s.preview().len(), 51);
    assert_eq!(s.preview()[0], path()[0]);

    s.tick(1.0);
    assert_eq!(s.state(), SpawnerState::RemovingPath);
    assert_eq!(s.preview().len(), 101);

    s.tick(1.0);
    assert_eq!(s.state(), SpawnerState::RemovingPath);
    // Erasing keeps the tail, drawn back from the last point.
    assert_eq!(s.preview().len(), 51);
    assert_eq!(s.preview()[0], path()[2]);

    s.tick(1.0);
    assert_eq!(s.state(), SpawnerState::RemovingPath);
    assert!(s.take_requests().is_empty());

    s.tick(0.1);
    assert!(s.preview().is_empty());
    assert_eq!(s.take_requests(), vec![SpawnerRequest::SpawnEnemy]);
    assert_eq!(s.state(), SpawnerState::SpawnCooldown);
}

#[test]
fn spawns_at_interval_then_waits() {
    let mut s = spawner();
    s.start(3, 4.0);
    skip_reveal(&mut s);
    assert_eq!(s.run().num_spawned, 1);

    s.tick(0.25);
    assert_eq!(s.run().num_spawned, 1);
    s.tick(0.3);
    assert_eq!(s.run().num_spawned, 2);
    assert_eq!(s.state(), SpawnerState::SpawnCooldown);

    s.tick(0.6);
    assert_eq!(s.run().num_spawned, 3);
    assert_eq!(s.state(), SpawnerState::AwaitingPathingToComplete);
    assert_eq!(s.take_requests(), vec![SpawnerRequest::SpawnEnemy; 3]);

    // Nothing more is spawned while waiting.
    s.tick(5.0);
    assert!(s.take_requests().is_empty());
    assert!(s.is_spawning());
}

#[test]
fn single_enemy_goes_straight_to_waiting() {
    let mut s = spawner();
    s.start(1, 4.0);
    skip_reveal(&mut s);
    assert_eq!(s.state(), SpawnerState::AwaitingPathingToComplete);
}

#[test]
fn start_clamps_to_one_enemy() {
    let mut s = spawner();
    s.start(0, 4.0);
    assert_eq!(s.run().num_to_spawn, 1);
}

#[test]
fn finishes_when_every_enemy_reported() {
    let mut s = spawner();
    s.start(2, 4.0);
    skip_reveal(&mut s);
    s.tick(0.6);
    s.take_requests();

    s.on_enemy_finished();
    s.tick(0.1);
    assert_eq!(s.state(), SpawnerState::AwaitingPathingToComplete);

    s.on_enemy_finished();
    s.tick(0.1);
    assert_eq!(s.state(), SpawnerState::Inactive);
    assert_eq!(
        s.take_requests(),
        vec![SpawnerRequest::ReleaseOwned, SpawnerRequest::Finished]
    );
}

#[test]
fn stop_releases_without_finishing() {
    let mut s = spawner();
    s.start(5, 4.0);
    skip_reveal(&mut s);
    s.take_requests();

    s.stop();

    assert_eq!(s.state(), SpawnerState::Inactive);
    assert_eq!(s.take_requests(), vec![SpawnerRequest::ReleaseOwned]);

    // A stopped run stays stopped.
    s.tick(5.0);
    assert!(s.take_requests().is_empty());
}

#[test]
fn stop_during_reveal_clears_preview() {
    let mut s = spawner();
    s.start(5, 4.0);
    s.tick(1.0);
    assert!(!s.preview().is_empty());

    s.stop();
    assert!(s.preview().is_empty());
}

#[test]
fn restart_resets_counters() {
    let mut s = spawner();
    s.start(1, 4.0);
    skip_reveal(&mut s);
    s.on_enemy_finished();
    s.tick(0.1);
    assert_eq!(s.state(), SpawnerState::Inactive);

    s.start(4, 2.0);
    assert_eq!(s.run().num_spawned, 0);
    assert_eq!(s.run().num_finished, 0);
    assert_eq!(s.run().num_to_spawn, 4);
    assert_eq!(s.run().traverse_secs, 2.0);
}

// -----------------------------------------------------------------------------
// ECS side effects
// -----------------------------------------------------------------------------

fn world_with_spawner() -> (World, Entity) {
    let mut world = World::new();
    world.insert_resource(Tunables { enemy_prealloc: 2, ..Tunables::default() });
    world.init_resource::<EnemyPool>();
    world.init_resource::<Messages<EnemyFinished>>();
    world.init_resource::<Messages<SpawnerFinished>>();
    init_enemy_pool(&mut world);

    let e = world.spawn(spawner()).id();
    (world, e)
}

fn spawner_mut(world: &mut World, e: Entity) -> Mut<'_, EnemySpawner> {
    world.get_mut::<EnemySpawner>(e).unwrap()
}

#[test]
fn apply_requests_launches_and_releases_enemies() {
    let (mut world, e) = world_with_spawner();

    {
        let mut s = spawner_mut(&mut world, e);
        s.start(3, 4.0);
        skip_reveal(&mut s);
        s.tick(0.6);
        s.tick(0.6);
    }
    apply_spawner_requests(&mut world);

    assert_eq!(world.get::<EnemySpawner>(e).unwrap().owned().len(), 3);
    {
        let pool = world.resource::<EnemyPool>();
        assert_eq!(pool.active_count(), 3);
        // Two preallocated plus one grown on demand.
        assert_eq!(pool.total_created_count(), 3);
    }

    {
        let mut s = spawner_mut(&mut world, e);
        for _ in 0..3 {
            s.on_enemy_finished();
        }
        s.tick(0.1);
    }
    apply_spawner_requests(&mut world);

    assert!(world.get::<EnemySpawner>(e).unwrap().owned().is_empty());
    assert_eq!(world.resource::<EnemyPool>().active_count(), 0);

    let finished: Vec<_> = world.resource_mut::<Messages<SpawnerFinished>>().drain().collect();
    assert_eq!(finished, vec![SpawnerFinished { spawner: e }]);
}

#[test]
fn stop_returns_enemies_to_pool_silently() {
    let (mut world, e) = world_with_spawner();
    {
        let mut s = spawner_mut(&mut world, e);
        s.start(2, 4.0);
        skip_reveal(&mut s);
    }
    apply_spawner_requests(&mut world);
    assert_eq!(world.resource::<EnemyPool>().active_count(), 1);

    spawner_mut(&mut world, e).stop();
    apply_spawner_requests(&mut world);

    assert_eq!(world.resource::<EnemyPool>().active_count(), 0);
    assert_eq!(world.resource::<Messages<SpawnerFinished>>().len(), 0);
}

#[test]
fn finished_enemies_are_counted_by_owner() {
    let (mut world, e) = world_with_spawner();
    let other = world.spawn(spawner()).id();
    let enemy = world.spawn_empty().id();

    world.write_message(EnemyFinished { enemy, spawner: e, killed_by_player: true });
    world.write_message(EnemyFinished { enemy, spawner: e, killed_by_player: false });
    // Unknown owner is ignored.
    world.write_message(EnemyFinished { enemy, spawner: enemy, killed_by_player: false });

    run_system_once(&mut world, count_finished_enemies);

    assert_eq!(world.get::<EnemySpawner>(e).unwrap().run().num_finished, 2);
    assert_eq!(world.get::<EnemySpawner>(other).unwrap().run().num_finished, 0);
}

#[test]
fn spawn_spawners_follows_the_wave_table() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(WaveTable::default());
    world.init_resource::<SpawnerRoster>();

    run_system_once(&mut world, spawn_spawners);

    let table = WaveTable::default();
    let roster = world.resource::<SpawnerRoster>().0.clone();
    assert_eq!(roster.len(), table.spawners.len());
    for (e, layout) in roster.iter().zip(&table.spawners) {
        let tf = world.get::<Transform>(*e).unwrap();
        assert_eq!(tf.translation, layout.path[0]);
        assert!(!world.get::<EnemySpawner>(*e).unwrap().is_spawning());
    }
}
