use bevy::prelude::*;

use crate::utilities::pool::PoolHandle;

/// Marker for every bullet entity owned by `BulletPool`.
#[derive(Component)]
pub struct PooledBullet;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletState {
    #[default]
    Inactive,
    Active,
    /// Hit something or ran out of time; `return_to_pool_commit` hands it back.
    PendingReturn,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Bullet {
    pub velocity: Vec2,
    pub lifetime_remaining: f32,
    /// Player entity that fired it.
    pub owner: Entity,
}

impl Default for Bullet {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            lifetime_remaining: 0.0,
            owner: Entity::PLACEHOLDER,
        }
    }
}

impl Bullet {
    /// Below this a bullet counts as expired.
    pub const EXPIRY_EPSILON: f32 = 0.00001;

    #[inline]
    pub fn reset_for_fire(&mut self, velocity: Vec2, lifetime: f32, owner: Entity) {
        self.velocity = velocity;
        self.lifetime_remaining = lifetime;
        self.owner = owner;
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.lifetime_remaining < Self::EXPIRY_EPSILON
    }
}

/// Pool handle of a fired bullet, written by the allocator.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletSlot(pub PoolHandle);
