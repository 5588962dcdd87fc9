use bevy::prelude::*;

use crate::common::test_utils::{run_system_once, set_frame_delta};
use crate::common::tunables::Tunables;
use crate::plugins::enemies::{Enemy, EnemyState};

use super::{Player, PlayerInput, PlayerLife};

fn world_with_player(input: PlayerInput) -> (World, Entity) {
    let mut world = World::new();
    world.insert_resource(Tunables {
        player_speed: 100.0,
        player_smoothing: 0.5,
        ..Tunables::default()
    });
    world.insert_resource(input);
    set_frame_delta(&mut world, 0.1);

    let e = world
        .spawn((
            Player::default(),
            PlayerLife::Active,
            Transform::default(),
            Visibility::Inherited,
        ))
        .id();
    (world, e)
}

#[test]
fn spawn_creates_player() {
    let mut world = World::new();
    run_system_once(&mut world, super::spawn);

    let mut q = world.query::<(&Player, &PlayerLife, &Transform)>();
    let (_, life, tf) = q.single(&world).unwrap();
    assert_eq!(*life, PlayerLife::Active);
    assert_eq!(tf.translation, super::PLAYER_SPAWN);
}

#[test]
fn apply_movement_lerps_toward_target_velocity() {
    let (mut world, e) = world_with_player(PlayerInput {
        move_axis: Vec2::new(1.0, 0.0),
        ..default()
    });

    run_system_once(&mut world, super::apply_movement);
    assert_eq!(world.get::<Player>(e).unwrap().velocity, Vec2::new(50.0, 0.0));
    assert!((world.get::<Transform>(e).unwrap().translation.x - 5.0).abs() < 1e-4);

    run_system_once(&mut world, super::apply_movement);
    assert_eq!(world.get::<Player>(e).unwrap().velocity, Vec2::new(75.0, 0.0));
}

#[test]
fn diagonal_input_is_normalized() {
    let (mut world, e) = world_with_player(PlayerInput {
        move_axis: Vec2::new(1.0, 1.0),
        ..default()
    });
    world.resource_mut::<Tunables>().player_smoothing = 1.0;

    run_system_once(&mut world, super::apply_movement);

    let v = world.get::<Player>(e).unwrap().velocity;
    assert!((v.length() - 100.0).abs() < 1e-3);
}

#[test]
fn movement_stays_inside_the_arena() {
    let (mut world, e) = world_with_player(PlayerInput {
        move_axis: Vec2::new(-1.0, 0.0),
        ..default()
    });
    world.resource_mut::<Tunables>().arena_half_extents = Vec2::new(2.0, 2.0);

    for _ in 0..10 {
        run_system_once(&mut world, super::apply_movement);
    }

    assert_eq!(world.get::<Transform>(e).unwrap().translation.x, -2.0);
}

#[test]
fn dead_player_does_not_move() {
    let (mut world, e) = world_with_player(PlayerInput {
        move_axis: Vec2::new(1.0, 0.0),
        ..default()
    });
    *world.get_mut::<PlayerLife>(e).unwrap() = PlayerLife::Dead;

    run_system_once(&mut world, super::apply_movement);

    assert_eq!(world.get::<Transform>(e).unwrap().translation, Vec3::ZERO);
}

#[test]
fn touching_a_moving_enemy_kills_the_player() {
    let (mut world, e) = world_with_player(PlayerInput::default());
    world.spawn((Enemy, EnemyState::Inactive, Transform::default()));
    run_system_once(&mut world, super::enemy_contact);
    assert_eq!(*world.get::<PlayerLife>(e).unwrap(), PlayerLife::Active);

    world.spawn((Enemy, EnemyState::Moving, Transform::from_xyz(20.0, 0.0, 0.0)));
    run_system_once(&mut world, super::enemy_contact);
    assert_eq!(*world.get::<PlayerLife>(e).unwrap(), PlayerLife::Dead);

    run_system_once(&mut world, super::sync_visibility);
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);
}

#[test]
fn distant_enemy_is_harmless() {
    let (mut world, e) = world_with_player(PlayerInput::default());
    world.spawn((Enemy, EnemyState::Moving, Transform::from_xyz(200.0, 0.0, 0.0)));

    run_system_once(&mut world, super::enemy_contact);

    assert_eq!(*world.get::<PlayerLife>(e).unwrap(), PlayerLife::Active);
}
