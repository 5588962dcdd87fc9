//! Tunable gameplay constants.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub player_speed: f32,
    /// Lerp factor per frame toward the target velocity (0 = never, 1 = instant).
    pub player_smoothing: f32,
    pub player_radius: f32,
    /// Half size of the playable area around the origin.
    pub arena_half_extents: Vec2,

    pub bullet_speed: f32,
    pub bullet_lifetime_secs: f32,
    pub bullet_radius: f32,
    pub bullet_prealloc: usize,

    pub enemy_radius: f32,
    /// Degrees per second around the (1, 1, 0) axis.
    pub enemy_rotation_speed: f32,
    pub enemy_score: u32,
    pub enemy_prealloc: usize,

    pub spawn_interval_secs: f32,
    /// How long a spawner takes to draw (and then erase) its path before spawning.
    pub path_reveal_secs: f32,

    pub stage_setup_secs: f32,
    pub wave_banner_secs: f32,

    /// Fixed seed for the title screen's spawner picks. `None` seeds from the OS.
    pub attract_seed: Option<u64>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            player_speed: 420.0,
            player_smoothing: 0.8,
            player_radius: 13.0,
            arena_half_extents: Vec2::new(620.0, 340.0),

            bullet_speed: 900.0,
            bullet_lifetime_secs: 2.0,
            bullet_radius: 4.0,
            bullet_prealloc: 64,

            enemy_radius: 16.0,
            enemy_rotation_speed: 200.0,
            enemy_score: 100,
            enemy_prealloc: 50,

            spawn_interval_secs: 0.5,
            path_reveal_secs: 2.0,

            stage_setup_secs: 1.0,
            wave_banner_secs: 3.0,

            attract_seed: None,
        }
    }
}
