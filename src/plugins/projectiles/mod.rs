//! Projectiles plugin: **Message-based producer → consumer** spawning + pooled bullets.
//!
//! # Data flow (one frame, `GameplaySet::Projectiles`)
//! ```text
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (A) Producer: request_player_bullets                                      │
//!│      - reads: PlayerInput.fire, Player Transform + PlayerLife              │
//!│      - writes: SpawnBulletRequest message                                  │
//!│                                                                            │
//!│  (B) Consumer: allocate_bullets_from_pool (exclusive)                      │
//!│      - drains: SpawnBulletRequest messages                                 │
//!│      - mutates: BulletPool (acquire, grows when empty)                     │
//!│      - writes: BulletSlot, BulletState::Active, Bullet, Transform          │
//!│                                                                            │
//!│  (C) advance_bullets                                                       │
//!│      - straight up at bullet_speed; expired → PendingReturn                │
//!│                                                                            │
//!│  (D) process_bullet_enemy_hits                                             │
//!│      - circle overlap vs Moving enemies                                    │
//!│      - writes: EnemyFinished { killed_by_player: true }                    │
//!│      - mutates: BulletState → PendingReturn                                │
//!│                                                                            │
//!│  (E) recall_bullets_of_inactive_players                                    │
//!│      - player left Active → its bullets → PendingReturn                    │
//!│                                                                            │
//!│  (F) Commit returns: return_to_pool_commit                                 │
//!│      - writes invariants for Inactive state                                │
//!│      - mutates: BulletPool.release(BulletSlot)                             │
//!└────────────────────────────────────────────────────────────────────────────┘
//!
//! Feedback loop:
//!   commit releases the slot back into BulletPool
//!   allocator acquires it again (LIFO)
//! ```
//!
//! Producers do **not** borrow `BulletPool`. The allocator and the commit are the only
//! writers, so the free list is never touched from two places in one frame.

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod lifetime;
pub mod messages;
pub mod pool;
pub mod request;

use bevy::prelude::*;

use crate::plugins::GameplaySet;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<pool::BulletPool>()
            .add_message::<messages::SpawnBulletRequest>()
            .add_systems(Startup, pool::init_bullet_pool);

        app.add_systems(
            Update,
            (
                request::request_player_bullets,
                allocator::allocate_bullets_from_pool,
                lifetime::advance_bullets,
                collision::process_bullet_enemy_hits,
                lifetime::recall_bullets_of_inactive_players,
                commit::return_to_pool_commit,
            )
                .chain()
                .in_set(GameplaySet::Projectiles),
        );
    }
}
