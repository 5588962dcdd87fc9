//! Return commit: recycle bullets back into the pool.
//!
//! This system is the "owner" of the *Inactive invariants*.
//!
//! Invariant: Inactive bullets must be:
//! - hidden
//! - at rest (velocity = 0, no lifetime left)
//! - free in `BulletPool`

use bevy::prelude::*;

use crate::utilities::pool::PoolHandle;

use super::components::{Bullet, BulletSlot, BulletState, PooledBullet};
use super::pool::BulletPool;

pub fn return_to_pool_commit(
    mut pool: ResMut<BulletPool>,
    mut q: Query<
        (&BulletSlot, &mut BulletState, &mut Bullet, &mut Visibility),
        With<PooledBullet>,
    >,
) {
    for (slot, mut state, mut bullet, mut vis) in &mut q {
        if *state != BulletState::PendingReturn {
            continue;
        }

        *state = BulletState::Inactive;
        *vis = Visibility::Hidden;
        bullet.velocity = Vec2::ZERO;
        bullet.lifetime_remaining = 0.0;

        pool.release(slot.0);
    }
}

/// Exclusive: hand every bullet `owner` still has in the pool straight back, in flight or not.
///
/// For owners that go away outside the projectile pipeline (leaving the game), where
/// `recall_bullets_of_inactive_players` will not run again. Returns how many were recalled.
pub fn recall_bullets_owned_by(world: &mut World, owner: Entity) -> usize {
    let in_pool: Vec<(PoolHandle, Entity)> = world
        .resource::<BulletPool>()
        .iter_active()
        .map(|(h, e)| (h, *e))
        .collect();

    let mut recalled = 0;
    for (handle, e) in in_pool {
        let Ok(mut ent) = world.get_entity_mut(e) else {
            continue;
        };
        let Some(mut bullet) = ent.get_mut::<Bullet>() else {
            continue;
        };
        if bullet.owner != owner {
            continue;
        }
        bullet.velocity = Vec2::ZERO;
        bullet.lifetime_remaining = 0.0;
        ent.insert((BulletState::Inactive, Visibility::Hidden));

        world.resource_mut::<BulletPool>().release(handle);
        recalled += 1;
    }

    if recalled > 0 {
        debug!("Recalled {recalled} bullets of {owner}");
    }
    recalled
}
