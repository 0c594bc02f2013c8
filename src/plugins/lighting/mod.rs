//! Lighting plugin (Firefly) (render-only).

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::adversaries::Adversary;
use crate::plugins::avatar::Avatar;

#[derive(Component)]
pub struct AvatarLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup)
        .add_systems(
            Update,
            (follow_avatar_light, occlude_adversaries).run_if(in_state(GameState::InGame)),
        );
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("AvatarLight"),
        AvatarLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            range: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_avatar_light(
    q_avatar: Query<&Transform, (With<Avatar>, Without<AvatarLight>)>,
    mut q_light: Query<&mut Transform, (With<AvatarLight>, Without<Avatar>)>,
) {
    let Ok(tf_avatar) = q_avatar.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_avatar.translation.x;
    tf_light.translation.y = tf_avatar.translation.y;
}

/// Adversaries cast shadows.
fn occlude_adversaries(mut commands: Commands, q_new: Query<Entity, Added<Adversary>>) {
    for e in &q_new {
        commands.entity(e).insert(Occluder2d::circle(14.0));
    }
}
