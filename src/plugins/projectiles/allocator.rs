//! Spawn consumer: activate bullets from the pool.
//!
//! The pool grows when it runs dry, so every request is honoured.
//!
//! # Fail-fast invariants
//! - Handles returned by `acquire_in` belong to the pool, so `get` cannot miss.
//! - Pooled entities are never despawned while the pool resource lives.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

use super::components::{Bullet, BulletSlot, BulletState};
use super::messages::SpawnBulletRequest;
use super::pool::{BULLET_Z, BulletPool};

pub fn allocate_bullets_from_pool(world: &mut World) {
    let requests: Vec<SpawnBulletRequest> =
        world.resource_mut::<Messages<SpawnBulletRequest>>().drain().collect();
    if requests.is_empty() {
        return;
    }

    let (speed, lifetime) = {
        let t = world.resource::<Tunables>();
        (t.bullet_speed, t.bullet_lifetime_secs)
    };

    for req in requests {
        let (handle, e) = world.resource_scope(|world, mut pool: Mut<BulletPool>| {
            let h = pool.acquire_in(world);
            let e = *pool.get(h).expect("BulletPool returned a handle it does not own");
            (h, e)
        });

        let mut ent = world.entity_mut(e);
        ent.insert((
            BulletSlot(handle),
            BulletState::Active,
            Transform::from_translation(req.pos.extend(BULLET_Z)),
            Visibility::Visible,
        ));
        ent.get_mut::<Bullet>()
            .expect("pooled bullet is missing its Bullet component")
            .reset_for_fire(Vec2::Y * speed, lifetime, req.owner);
    }
}
