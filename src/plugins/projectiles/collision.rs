//! Bullet vs enemy hit test.
//!
//! Both shapes are circles (`bullet_radius`, `enemy_radius`). A bullet hits at most one
//! enemy; an enemy is finished by the first bullet that reaches it.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::enemies::{Enemy, EnemyFinished, EnemyState, PathFollower, finish_enemy};

use super::components::{BulletState, PooledBullet};

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) <= r * r
}

pub fn process_bullet_enemy_hits(
    tunables: Res<Tunables>,
    mut writer: MessageWriter<EnemyFinished>,
    mut q_bullets: Query<(&Transform, &mut BulletState), With<PooledBullet>>,
    mut q_enemies: Query<
        (Entity, &Transform, &PathFollower, &mut EnemyState, &mut Visibility),
        (With<Enemy>, Without<PooledBullet>),
    >,
) {
    for (bullet_tf, mut bullet_state) in &mut q_bullets {
        if *bullet_state != BulletState::Active {
            continue;
        }
        let bullet_pos = bullet_tf.translation.truncate();

        for (e, enemy_tf, path, mut enemy_state, mut vis) in &mut q_enemies {
            if *enemy_state != EnemyState::Moving {
                continue;
            }
            if !circles_overlap(
                bullet_pos,
                tunables.bullet_radius,
                enemy_tf.translation.truncate(),
                tunables.enemy_radius,
            ) {
                continue;
            }

            if let Some(msg) = finish_enemy(&mut enemy_state, &mut vis, e, path.owner, true) {
                writer.write(msg);
            }
            *bullet_state = BulletState::PendingReturn;
            break;
        }
    }
}
