use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::utilities::pool::ObjectPool;

use super::components::{Bullet, BulletState, PooledBullet};

pub const BULLET_Z: f32 = 2.0;

/// Bullet entities are spawned once (up front, or when the pool runs dry) and recycled
/// forever after. Inactive bullets are hidden and skipped by every query that moves or
/// collides bullets.
#[derive(Resource, Deref, DerefMut)]
pub struct BulletPool(pub ObjectPool<Entity, World>);

impl Default for BulletPool {
    fn default() -> Self {
        Self(ObjectPool::new(spawn_pooled_bullet))
    }
}

fn spawn_pooled_bullet(world: &mut World) -> Entity {
    world
        .spawn((
            Name::new("Bullet(Pooled)"),
            PooledBullet,
            BulletState::Inactive,
            Bullet::default(),
            Sprite {
                color: Color::srgb(1.0, 0.85, 0.3),
                custom_size: Some(Vec2::new(4.0, 12.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, BULLET_Z),
            Visibility::Hidden,
        ))
        .id()
}

/// Pre-spawn pooled bullets (inactive).
pub fn init_bullet_pool(world: &mut World) {
    let n = world.resource::<Tunables>().bullet_prealloc;
    world.resource_scope(|world, mut pool: Mut<BulletPool>| pool.preallocate_in(n, world));
}
