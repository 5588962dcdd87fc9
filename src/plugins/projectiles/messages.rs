//! Buffered spawn requests.
//!
//! Producers (the player's fire system) only write intent; the allocator is the single
//! consumer that touches `BulletPool`.

use bevy::ecs::message::Message;
use bevy::prelude::*;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnBulletRequest {
    pub pos: Vec2,
    pub owner: Entity,
}
