//! World plugin: the walkable floor, the two end walls and a tiled backdrop.
//!
//! The world spans `0..=width` on x; the floor's top edge is `floor_top`.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};

const TILE: i32 = 64;
const THICKNESS: f32 = 40.0;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), (spawn_geometry, spawn_backdrop));
}

fn spawn_geometry(mut commands: Commands, tunables: Res<Tunables>) {
    let world = &tunables.world;
    let color = Color::srgb(0.25, 0.27, 0.33);

    let layers = CollisionLayers::new(
        Layer::World,
        [
            Layer::Avatar,
            Layer::Adversary,
            Layer::AvatarSpell,
            Layer::AdversarySpell,
        ],
    );

    let mut spawn_block = |name: &str, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name.to_owned()),
            Sprite {
                color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    spawn_block(
        "Floor",
        Vec2::new(world.width * 0.5, world.floor_top - THICKNESS * 0.5),
        Vec2::new(world.width + THICKNESS * 2.0, THICKNESS),
    );
    for (name, x) in [("WallLeft", -THICKNESS * 0.5), ("WallRight", world.width + THICKNESS * 0.5)] {
        spawn_block(
            name,
            Vec2::new(x, world.floor_top + world.wall_height * 0.5),
            Vec2::new(THICKNESS, world.wall_height),
        );
    }
}

/// Solid-color tiles behind the play area, so the game needs no assets.
fn spawn_backdrop(mut commands: Commands, tunables: Res<Tunables>) {
    let world = &tunables.world;
    let cols = (world.width / TILE as f32).ceil() as i32;
    let rows = (world.wall_height / TILE as f32).ceil() as i32;

    (0..rows)
        .flat_map(|y| (0..cols).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let pos = Vec3::new(
                (x as f32 + 0.5) * TILE as f32,
                world.floor_top + (y as f32 + 0.5) * TILE as f32,
                -1.0,
            );
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE as f32)),
                Transform::from_translation(pos),
                DespawnOnExit(GameState::InGame),
            ));
        });
}
