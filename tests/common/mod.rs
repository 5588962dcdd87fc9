//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `arcade_shooter::game::configure_headless` to install gameplay plugins.
//! - time advances by a fixed step per `update()`, so runs are repeatable.

#![allow(dead_code)]

use std::time::Duration;

use arcade_shooter::common::state::GameState;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

pub const STEP_SECS: f32 = 1.0 / 60.0;

pub fn app_headless() -> App {
    let mut app = App::new();

    // Core ECS + states.
    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        STEP_SECS,
    )));

    arcade_shooter::game::configure_headless(&mut app);
    app
}

/// Request `InGame` and run the frame that performs the transition.
pub fn enter_game(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
}

pub fn current_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Run frames until `done` holds or `max_frames` pass. Returns whether `done` held.
pub fn run_until(app: &mut App, max_frames: usize, mut done: impl FnMut(&mut App) -> bool) -> bool {
    for _ in 0..max_frames {
        app.update();
        if done(app) {
            return true;
        }
    }
    false
}
