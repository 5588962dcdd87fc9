//! Wave layout: where spawners sit, and which of them fire in each wave.

use bevy::prelude::*;

/// One spawner's flight path (Bézier control chain) and tint.
#[derive(Debug, Clone)]
pub struct SpawnerLayout {
    pub path: Vec<Vec3>,
    pub colour: Color,
}

/// A group of enemies released by one spawner during a wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySet {
    /// Index into `WaveTable::spawners`.
    pub spawner: usize,
    pub num_enemies: u32,
    /// Seconds into `PlayingGame` before this set kicks off.
    pub start_secs: f32,
    /// Seconds an enemy needs to reach the end of the path.
    pub traverse_secs: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveData {
    pub required_kills: u32,
    /// Kicked off in order; `start_secs` should be non-decreasing.
    pub sets: Vec<EnemySet>,
}

impl WaveData {
    pub fn total_enemies(&self) -> u32 {
        self.sets.iter().map(|s| s.num_enemies).sum()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct WaveTable {
    pub spawners: Vec<SpawnerLayout>,
    pub waves: Vec<WaveData>,
}

impl Default for WaveTable {
    fn default() -> Self {
        let left = SpawnerLayout {
            path: vec![
                Vec3::new(-700.0, 250.0, 1.0),
                Vec3::new(-300.0, 300.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(300.0, -200.0, 1.0),
                Vec3::new(700.0, -100.0, 1.0),
            ],
            colour: Color::srgb(0.9, 0.3, 0.3),
        };
        let right = SpawnerLayout {
            path: left.path.iter().map(|p| Vec3::new(-p.x, p.y, p.z)).collect(),
            colour: Color::srgb(0.3, 0.6, 0.95),
        };
        let dive = SpawnerLayout {
            path: vec![
                Vec3::new(0.0, 420.0, 1.0),
                Vec3::new(-250.0, 200.0, 1.0),
                Vec3::new(250.0, 0.0, 1.0),
                Vec3::new(-250.0, -200.0, 1.0),
                Vec3::new(0.0, -420.0, 1.0),
            ],
            colour: Color::srgb(0.95, 0.8, 0.25),
        };

        let set = |spawner, num_enemies, start_secs, traverse_secs| EnemySet {
            spawner,
            num_enemies,
            start_secs,
            traverse_secs,
        };

        Self {
            spawners: vec![left, right, dive],
            waves: vec![
                WaveData { required_kills: 6, sets: vec![set(0, 8, 0.0, 5.0)] },
                WaveData {
                    required_kills: 12,
                    sets: vec![set(0, 8, 0.0, 5.0), set(1, 8, 3.0, 5.0)],
                },
                WaveData {
                    required_kills: 18,
                    sets: vec![set(2, 10, 0.0, 6.0), set(0, 6, 4.0, 5.0), set(1, 6, 6.0, 5.0)],
                },
            ],
        }
    }
}
