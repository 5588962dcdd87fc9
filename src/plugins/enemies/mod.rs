//! Enemies plugin: pooled enemies that fly along a spline and report when they are done.
//!
//! ---------------------------
//! LIFECYCLE
//! ---------------------------
//! ```text
//!   EnemyPool.acquire ──► launch_enemy ──► Moving ──► Finished ──► retire_enemy ──► pool
//!                                             │  (end of path, or hit by a bullet)
//!                                             └──► EnemyFinished message
//! ```
//!
//! - Enemies are created by the pool (up front at Startup, or when it runs dry) and are
//!   never despawned. Inactive enemies are hidden and skipped by every gameplay query.
//! - Position is re-evaluated from the path every frame (`elapsed / duration`), so long
//!   traversals do not accumulate drift.
//! - The owning spawner hears about a finished enemy through `EnemyFinished` and decides
//!   when to hand it back to the pool.

use std::sync::Arc;

use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::GameplaySet;
use crate::utilities::pool::{ObjectPool, PoolHandle};
use crate::utilities::spline::evaluate_chain;

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyState {
    /// Sitting in the pool.
    #[default]
    Inactive,
    Moving,
    /// Left the path or got shot; waiting for the owner to release it.
    Finished,
}

/// Path traversal data. Always present on pooled enemies; reset on launch.
#[derive(Component, Debug, Clone)]
pub struct PathFollower {
    pub points: Arc<[Vec3]>,
    pub elapsed: f32,
    pub duration: f32,
    pub owner: Entity,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self {
            points: Arc::from([]),
            elapsed: 0.0,
            duration: 1.0,
            owner: Entity::PLACEHOLDER,
        }
    }
}

impl PathFollower {
    #[inline]
    pub fn progress(&self) -> f32 {
        self.elapsed / self.duration.max(f32::EPSILON)
    }
}

// -----------------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------------

/// Written exactly once per launch, when the enemy stops moving.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyFinished {
    pub enemy: Entity,
    pub spawner: Entity,
    pub killed_by_player: bool,
}

// -----------------------------------------------------------------------------
// Pool
// -----------------------------------------------------------------------------

#[derive(Resource, Deref, DerefMut)]
pub struct EnemyPool(pub ObjectPool<Entity, World>);

impl Default for EnemyPool {
    fn default() -> Self {
        let pool = ObjectPool::new(spawn_pooled_enemy).with_on_created(
            |e: &mut Entity, world: &mut World| {
                world.entity_mut(*e).insert((EnemyState::Inactive, Visibility::Hidden));
            },
        );
        Self(pool)
    }
}

fn spawn_pooled_enemy(world: &mut World) -> Entity {
    world
        .spawn((
            Name::new("Enemy(Pooled)"),
            Enemy,
            PathFollower::default(),
            Sprite {
                color: Color::srgb(0.9, 0.25, 0.25),
                custom_size: Some(Vec2::splat(32.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 1.0),
        ))
        .id()
}

/// Pre-spawn pooled enemies (hidden).
pub fn init_enemy_pool(world: &mut World) {
    let n = world.resource::<Tunables>().enemy_prealloc;
    world.resource_scope(|world, mut pool: Mut<EnemyPool>| pool.preallocate_in(n, world));
}

/// Acquire an enemy (growing the pool if needed) and put it on `points`.
pub fn launch_enemy(
    world: &mut World,
    points: Arc<[Vec3]>,
    duration: f32,
    owner: Entity,
    colour: Color,
) -> (PoolHandle, Entity) {
    let (handle, e) = world.resource_scope(|world, mut pool: Mut<EnemyPool>| {
        let h = pool.acquire_in(world);
        let e = *pool.get(h).expect("EnemyPool returned a handle it does not own");
        (h, e)
    });

    let start = points.first().copied().unwrap_or(Vec3::ZERO);
    let mut ent = world.entity_mut(e);
    ent.insert((
        PathFollower { points, elapsed: 0.0, duration, owner },
        EnemyState::Moving,
        Transform::from_translation(start),
        Visibility::Visible,
    ));
    if let Some(mut sprite) = ent.get_mut::<Sprite>() {
        sprite.color = colour;
    }

    (handle, e)
}

/// Hide the enemy and hand it back to the pool.
pub fn retire_enemy(world: &mut World, handle: PoolHandle) {
    let e = world.resource::<EnemyPool>().get(handle).copied();
    if let Some(e) = e {
        if let Ok(mut ent) = world.get_entity_mut(e) {
            ent.insert((EnemyState::Inactive, Visibility::Hidden));
        }
    }
    world.resource_mut::<EnemyPool>().release(handle);
}

/// Stop a moving enemy and notify its owner. No-op for enemies that are not moving.
pub fn finish_enemy(
    state: &mut EnemyState,
    visibility: &mut Visibility,
    enemy: Entity,
    owner: Entity,
    killed_by_player: bool,
) -> Option<EnemyFinished> {
    if *state != EnemyState::Moving {
        return None;
    }
    *state = EnemyState::Finished;
    *visibility = Visibility::Hidden;
    Some(EnemyFinished { enemy, spawner: owner, killed_by_player })
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.init_resource::<EnemyPool>()
        .add_message::<EnemyFinished>()
        .add_systems(Startup, init_enemy_pool)
        .add_systems(
            Update,
            follow_paths.in_set(GameplaySet::Enemies),
        );
}

// -----------------------------------------------------------------------------
// Movement
// -----------------------------------------------------------------------------

/// Advance every moving enemy along its path; finish the ones that ran out of time.
pub fn follow_paths(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut writer: MessageWriter<EnemyFinished>,
    mut q: Query<
        (Entity, &mut PathFollower, &mut EnemyState, &mut Transform, &mut Visibility),
        With<Enemy>,
    >,
) {
    let dt = time.delta_secs();
    let spin = Quat::from_axis_angle(
        Vec3::new(1.0, 1.0, 0.0).normalize(),
        tunables.enemy_rotation_speed.to_radians() * dt,
    );

    for (e, mut path, mut state, mut tf, mut vis) in &mut q {
        if *state != EnemyState::Moving {
            continue;
        }

        path.elapsed += dt;
        if path.elapsed > path.duration {
            if let Some(msg) = finish_enemy(&mut state, &mut vis, e, path.owner, false) {
                writer.write(msg);
            }
            continue;
        }

        tf.translation = evaluate_chain(&path.points, path.progress());
        tf.rotation *= spin;
    }
}
