//! Flight and expiry of active bullets.

use bevy::prelude::*;

use crate::plugins::player::{Player, PlayerLife};

use super::components::{Bullet, BulletState, PooledBullet};

/// Move active bullets and retire the ones whose lifetime ran out.
pub fn advance_bullets(
    time: Res<Time>,
    mut q: Query<(&mut Transform, &mut Bullet, &mut BulletState, &mut Visibility), With<PooledBullet>>,
) {
    let dt = time.delta_secs();

    for (mut tf, mut bullet, mut state, mut vis) in &mut q {
        if *state != BulletState::Active {
            continue;
        }

        tf.translation += (bullet.velocity * dt).extend(0.0);

        bullet.lifetime_remaining -= dt;
        if bullet.is_expired() {
            *state = BulletState::PendingReturn;
            *vis = Visibility::Hidden;
        }
    }
}

/// A player that stops being `Active` takes its bullets off the field.
pub fn recall_bullets_of_inactive_players(
    q_players: Query<(Entity, &PlayerLife), (With<Player>, Changed<PlayerLife>)>,
    mut q_bullets: Query<(&Bullet, &mut BulletState, &mut Visibility), With<PooledBullet>>,
) {
    for (player, life) in &q_players {
        if *life == PlayerLife::Active {
            continue;
        }

        for (bullet, mut state, mut vis) in &mut q_bullets {
            if bullet.owner == player && *state == BulletState::Active {
                *state = BulletState::PendingReturn;
                *vis = Visibility::Hidden;
            }
        }
    }
}
