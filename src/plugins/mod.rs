//! Feature plugins.

use bevy::prelude::*;

use crate::common::state::GameState;

pub mod core;
pub mod enemies;
pub mod player;
pub mod projectiles;
pub mod spawner;
pub mod stage;
pub mod title;

// Render-only
pub mod camera;

/// Per-frame gameplay order. Each set sees the results of the ones before it.
///
/// ```text
///   Input -> Player -> Projectiles -> Enemies -> Spawners -> Stage
/// ```
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    /// Device input into `PlayerInput` (render app only).
    Input,
    Player,
    Projectiles,
    Enemies,
    Spawners,
    Stage,
}

fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameplaySet::Input,
            GameplaySet::Player,
            GameplaySet::Projectiles,
            GameplaySet::Enemies,
            GameplaySet::Spawners,
            GameplaySet::Stage,
        )
            .chain(),
    );
    // Enemies and spawners also run on the title screen (attract mode).
    app.configure_sets(
        Update,
        (GameplaySet::Player, GameplaySet::Projectiles, GameplaySet::Stage)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    configure_sets(app);
    core::plugin(app);
    enemies::plugin(app);
    spawner::plugin(app);
    player::plugin(app);
    app.add_plugins(projectiles::ProjectilesPlugin);
    stage::plugin(app);
    title::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
    player::input_plugin(app);
    spawner::preview_plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
