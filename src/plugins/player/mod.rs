//! Player plugin.
//!
//! Pipeline:
//! - `GameplaySet::Input` (render app only): sample keyboard, write `PlayerInput`
//! - `GameplaySet::Player`: smooth velocity toward the input, move, check enemy contact
//!
//! Headless apps have no keyboard; tests write `PlayerInput` directly.
//!
//! API note (Bevy >= 0.18):
//! - Prefer `single()` / `single_mut()` for single-entity access and handle the error
//!   explicitly; the player only exists while `InGame`.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::GameplaySet;
use crate::plugins::enemies::{Enemy, EnemyState};
use crate::plugins::projectiles::collision::circles_overlap;

pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, -250.0, 1.0);

#[derive(Component, Debug, Default)]
pub struct Player {
    /// Smoothed velocity, units per second.
    pub velocity: Vec2,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerLife {
    #[default]
    Active,
    /// Touched an enemy.
    Dead,
    /// Switched off by the stage (leaving to the title screen).
    Disabled,
}

/// Device-independent controls, refreshed every frame.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    /// Fire pressed this frame.
    pub fire: bool,
    /// Back to the title screen pressed this frame.
    pub quit: bool,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(
            Update,
            (apply_movement, enemy_contact, sync_visibility)
                .chain()
                .in_set(GameplaySet::Player),
        );
}

/// Render-only: keyboard → `PlayerInput`.
pub fn input_plugin(app: &mut App) {
    app.add_systems(Update, gather_input.in_set(GameplaySet::Input));
}

fn spawn(mut commands: Commands) {
    commands.spawn((
        Name::new("Player"),
        Player::default(),
        PlayerLife::Active,
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(26.0)),
            ..default()
        },
        Transform::from_translation(PLAYER_SPAWN),
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut axis = Vec2::ZERO;

    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }

    input.move_axis = axis;
    input.fire = keys.any_just_pressed([KeyCode::Space, KeyCode::KeyZ]);
    input.quit = keys.just_pressed(KeyCode::Escape);
}

/// `velocity = lerp(velocity, target, smoothing)` once per frame, then integrate.
fn apply_movement(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut Player, &mut Transform, &PlayerLife)>,
) {
    let Ok((mut player, mut tf, life)) = q_player.single_mut() else {
        return;
    };
    if *life != PlayerLife::Active {
        return;
    }

    let target = input.move_axis.normalize_or_zero() * tunables.player_speed;
    player.velocity = player.velocity.lerp(target, tunables.player_smoothing);

    let bounds = tunables.arena_half_extents;
    let next = tf.translation.truncate() + player.velocity * time.delta_secs();
    let clamped = next.clamp(-bounds, bounds);
    tf.translation.x = clamped.x;
    tf.translation.y = clamped.y;
}

/// Touching a moving enemy kills the player.
fn enemy_contact(
    tunables: Res<Tunables>,
    mut q_player: Query<(&Transform, &mut PlayerLife), With<Player>>,
    q_enemies: Query<(&Transform, &EnemyState), (With<Enemy>, Without<Player>)>,
) {
    let Ok((tf, mut life)) = q_player.single_mut() else {
        return;
    };
    if *life != PlayerLife::Active {
        return;
    }

    let pos = tf.translation.truncate();
    let hit = q_enemies.iter().any(|(enemy_tf, state)| {
        *state == EnemyState::Moving
            && circles_overlap(
                pos,
                tunables.player_radius,
                enemy_tf.translation.truncate(),
                tunables.enemy_radius,
            )
    });

    if hit {
        info!("Player hit by an enemy");
        *life = PlayerLife::Dead;
    }
}

fn sync_visibility(mut q: Query<(&PlayerLife, &mut Visibility), (With<Player>, Changed<PlayerLife>)>) {
    for (life, mut vis) in &mut q {
        *vis = match life {
            PlayerLife::Active => Visibility::Inherited,
            PlayerLife::Dead | PlayerLife::Disabled => Visibility::Hidden,
        };
    }
}

#[cfg(test)]
mod tests;
