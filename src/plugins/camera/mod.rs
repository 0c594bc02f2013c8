//! Camera plugin (render-only).
//!
//! One camera for the whole app, so the menu screens have something to render
//! through. In a run it eases toward the avatar and never shows past the ends
//! of the world.
//!
//! The key subtlety: **B0001**.
//! A system cannot have `Query<&Transform>` and `Query<&mut Transform>` at the same time
//! unless Bevy can prove those queries are disjoint; the `Without<...>` filters below do that.

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::avatar::Avatar;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera)
        .add_systems(OnEnter(GameState::InGame), snap_to_avatar_spawn)
        .add_systems(
            PostUpdate,
            follow_avatar
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, 999.0),
    ));
}

/// Horizontal range the camera centre may take so the view stays inside `0..=width`.
pub fn clamp_center(x: f32, half_view: f32, width: f32) -> f32 {
    if half_view * 2.0 >= width {
        width * 0.5
    } else {
        x.clamp(half_view, width - half_view)
    }
}

fn snap_to_avatar_spawn(tunables: Res<Tunables>, mut q_cam: Query<&mut Transform, With<MainCamera>>) {
    let Ok(mut tf) = q_cam.single_mut() else {
        return;
    };
    tf.translation.x = tunables.avatar.spawn_x;
    tf.translation.y = tunables.world.floor_top + tunables.world.wall_height * 0.4;
}

fn follow_avatar(
    time: Res<Time>,
    tunables: Res<Tunables>,
    // Disjointness proof: Avatar entities are not MainCamera entities.
    q_avatar: Query<&Transform, (With<Avatar>, Without<MainCamera>)>,
    // Disjointness proof: MainCamera entities are not Avatar entities.
    mut q_cam: Query<(&mut Transform, &MainCamera, &Camera), Without<Avatar>>,
) {
    let Ok(tf_avatar) = q_avatar.single() else {
        return;
    };
    let Ok((mut tf_cam, main_cam, camera)) = q_cam.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-main_cam.responsiveness * dt).exp();
    let half_view = camera.logical_viewport_size().map_or(0.0, |s| s.x * 0.5);
    let target_x = clamp_center(tf_avatar.translation.x, half_view, tunables.world.width);

    tf_cam.translation.x += (target_x - tf_cam.translation.x) * alpha;
}
