//! Full-session flows in a headless app: waves run to a win or a loss, and bullets score kills.

mod common;

use std::sync::Arc;

use arcade_shooter::common::tunables::Tunables;
use arcade_shooter::common::waves::{EnemySet, SpawnerLayout, WaveData, WaveTable};
use arcade_shooter::plugins::enemies::{EnemyPool, EnemyState, launch_enemy};
use arcade_shooter::plugins::player::PlayerInput;
use arcade_shooter::plugins::spawner::SpawnerRoster;
use arcade_shooter::plugins::stage::{StageBoard, StageLoop, StageState};
use bevy::prelude::*;

/// One spawner flying high above the player, quick reveal and spawn cadence.
fn configure(app: &mut App, waves: Vec<WaveData>) {
    let world = app.world_mut();
    world.insert_resource(Tunables {
        path_reveal_secs: 0.2,
        spawn_interval_secs: 0.1,
        ..Tunables::default()
    });
    world.insert_resource(WaveTable {
        spawners: vec![SpawnerLayout {
            path: vec![Vec3::new(-300.0, 300.0, 1.0), Vec3::new(300.0, 300.0, 1.0)],
            colour: Color::WHITE,
        }],
        waves,
    });
}

fn single_set(required_kills: u32) -> WaveData {
    WaveData {
        required_kills,
        sets: vec![EnemySet { spawner: 0, num_enemies: 3, start_secs: 0.0, traverse_secs: 0.5 }],
    }
}

fn stage_state(app: &App) -> StageState {
    app.world().resource::<StageLoop>().state()
}

#[test]
fn untouched_wave_with_no_kill_requirement_is_won() {
    let mut app = common::app_headless();
    configure(&mut app, vec![single_set(0)]);
    common::enter_game(&mut app);

    let reached = common::run_until(&mut app, 900, |app| stage_state(app) == StageState::PlayingGame);
    assert!(reached);
    assert_eq!(app.world().resource::<StageBoard>().remaining, 3);

    let won = common::run_until(&mut app, 900, |app| stage_state(app) == StageState::Won);
    assert!(won, "stage ended in {:?}", stage_state(&app));

    app.update();
    let board = app.world().resource::<StageBoard>().clone();
    assert_eq!(board.banner, "You Won!");
    assert_eq!(board.remaining, 0);

    // Every enemy went back to the pool.
    app.update();
    assert_eq!(app.world().resource::<EnemyPool>().active_count(), 0);
}

#[test]
fn missing_the_kill_requirement_loses() {
    let mut app = common::app_headless();
    configure(&mut app, vec![single_set(2), single_set(0)]);
    common::enter_game(&mut app);

    let lost = common::run_until(&mut app, 1800, |app| stage_state(app) == StageState::Lost);
    assert!(lost, "stage ended in {:?}", stage_state(&app));

    app.update();
    let board = app.world().resource::<StageBoard>().clone();
    assert_eq!(board.wave, 1);
    assert_eq!(board.banner, "You Lose. You only killed 00 / 02.");
    assert_eq!(board.subtitle, "Press Esc to exit");
}

#[test]
fn player_bullet_kills_an_enemy_and_scores() {
    let mut app = common::app_headless();
    configure(&mut app, vec![single_set(0)]);
    common::enter_game(&mut app);
    app.update();

    // Parked enemy straight above the player.
    let world = app.world_mut();
    let owner = world.resource::<SpawnerRoster>().0[0];
    let path: Arc<[Vec3]> = Arc::from([Vec3::new(0.0, 0.0, 1.0)]);
    let (_, enemy) = launch_enemy(world, path, 100.0, owner, Color::WHITE);

    world.resource_mut::<PlayerInput>().fire = true;
    app.update();
    app.world_mut().resource_mut::<PlayerInput>().fire = false;

    let hit = common::run_until(&mut app, 120, |app| {
        app.world().get::<EnemyState>(enemy) == Some(&EnemyState::Finished)
    });
    assert!(hit);

    app.update();
    let board = app.world().resource::<StageBoard>().clone();
    assert_eq!(board.score, Tunables::default().enemy_score);
    assert_eq!(board.kills, 1);
}
