use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::plugins::player::{Player, PlayerInput, PlayerLife};

use super::messages::SpawnBulletRequest;

/// Producer: turn the fire button into a `SpawnBulletRequest` at the player's position.
///
/// This system intentionally does **not** access BulletPool.
pub fn request_player_bullets(
    input: Res<PlayerInput>,
    q_player: Query<(Entity, &Transform, &PlayerLife), With<Player>>,
    mut writer: MessageWriter<SpawnBulletRequest>,
) {
    if !input.fire {
        return;
    }

    let (player_e, player_tf, life) = match q_player.single() {
        Ok(v) => v,
        Err(e) => {
            debug!("No single Player Transform: {e:?}");
            return;
        }
    };
    if *life != PlayerLife::Active {
        return;
    }

    writer.write(SpawnBulletRequest {
        pos: player_tf.translation.truncate(),
        owner: player_e,
    });
}
