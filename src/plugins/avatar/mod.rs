//! Avatar plugin.
//!
//! Pipeline:
//! - OnEnter(InGame): spawn a fresh avatar (full health, level 1)
//! - Update: sample keyboard + pointer into the `AvatarInput` resource
//! - FixedUpdate (`SimSet::Movement`): run/jump velocity and facing
//! - FixedUpdate (`SimSet::Attack`): cast a volley while attack is held
//!
//! A missing keyboard is not fatal: it is reported once and control falls back
//! to the pointer (pointer side sets facing, pointer down attacks).

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::window::PrimaryWindow;

use crate::common::error::InputError;
use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::plugins::camera::MainCamera;
use crate::plugins::clock::GameScheduler;
use crate::plugins::combat::{ActionGate, Faction, Facing, Invincibility, Lifecycle, Vitals};
use crate::plugins::feedback::{Clip, Cue, SoundCue};
use crate::plugins::physics::is_grounded;
use crate::plugins::progression::{LevelUpEffect, Progression};
use crate::plugins::projectiles::{cast_projectile, spawn_projectile};
use crate::plugins::run::SimSet;

#[derive(Component, Debug)]
pub struct Avatar;

/// Control intents for the current frame.
#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct AvatarInput {
    /// -1, 0 or 1.
    pub move_axis: f32,
    pub jump: bool,
    pub attack: bool,
    /// Pointer in world coordinates, when over the window.
    pub pointer: Option<Vec2>,
    pub pointer_down: bool,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<AvatarInput>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(OnExit(GameState::InGame), clear_input)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedUpdate,
            (
                apply_movement.in_set(SimSet::Movement),
                cast_spells.in_set(SimSet::Attack),
            )
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let cfg = &tunables.avatar;
    let layers = CollisionLayers::new(Layer::Avatar, [Layer::World, Layer::AdversarySpell]);
    let feet_clearance = 1.0;

    commands.spawn((
        (
            Name::new("Avatar"),
            Avatar,
            Faction::Avatar,
            Vitals::new(cfg.max_health),
            Invincibility::default(),
            ActionGate::default(),
            Lifecycle::Active,
            Facing::Right,
            Progression::new(&tunables.progression),
            LevelUpEffect::default(),
        ),
        (
            Sprite {
                color: Color::srgb(0.2, 0.75, 0.9),
                custom_size: Some(cfg.half_size * 2.0),
                ..default()
            },
            Transform::from_xyz(
                cfg.spawn_x,
                tunables.world.floor_top + cfg.half_size.y + feet_clearance,
                1.0,
            ),
            RigidBody::Dynamic,
            Collider::rectangle(cfg.half_size.x * 2.0, cfg.half_size.y * 2.0),
            LockedAxes::ROTATION_LOCKED,
            GravityScale(cfg.gravity_scale),
            layers,
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
        ),
    ));
    debug!("avatar spawned with {} health", cfg.max_health);
}

fn clear_input(mut input: ResMut<AvatarInput>) {
    *input = AvatarInput::default();
}

fn pointer_world_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Vec2> {
    let cursor = windows.single().ok()?.cursor_position()?;
    let (camera, camera_tf) = cameras.single().ok()?;
    match camera.viewport_to_world_2d(camera_tf, cursor) {
        Ok(p) => Some(p),
        Err(e) => {
            debug!("viewport_to_world_2d failed: {e:?}");
            None
        }
    }
}

pub fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut input: ResMut<AvatarInput>,
    mut reported: Local<bool>,
) {
    let pointer_down = buttons.is_some_and(|b| b.pressed(MouseButton::Left));
    let pointer = pointer_world_position(&windows, &cameras);

    let Some(keys) = keys else {
        if !*reported {
            warn!("{}", InputError::KeyboardUnavailable);
            *reported = true;
        }
        *input = AvatarInput {
            move_axis: 0.0,
            jump: false,
            attack: pointer_down,
            pointer,
            pointer_down,
        };
        return;
    };

    let mut axis = 0.0;
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis += 1.0;
    }

    *input = AvatarInput {
        move_axis: axis,
        jump: keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::Space]),
        attack: pointer_down || keys.any_pressed([KeyCode::KeyF, KeyCode::KeyJ]),
        pointer,
        pointer_down,
    };
}

pub fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<AvatarInput>,
    mut q_avatar: Query<(Entity, &Transform, &mut LinearVelocity, &mut Facing, &Lifecycle), With<Avatar>>,
    mut cues: MessageWriter<Cue>,
) {
    let Ok((e, tf, mut vel, mut facing, life)) = q_avatar.single_mut() else {
        return;
    };
    if !life.is_active() {
        return;
    }
    let cfg = &tunables.avatar;

    vel.x = input.move_axis * cfg.speed;

    let look = if input.move_axis != 0.0 {
        input.move_axis
    } else {
        input.pointer.map_or(0.0, |p| p.x - tf.translation.x)
    };
    if let Some(f) = Facing::toward(look) {
        *facing = f;
    }

    let feet = tf.translation.y - cfg.half_size.y;
    if input.jump && is_grounded(feet, vel.y, tunables.world.floor_top) {
        vel.y = cfg.jump_speed;
        cues.write(Cue::Animation { entity: e, clip: Clip::Jump });
        cues.write(Cue::Sound(SoundCue::Jump));
    }
}

pub fn cast_spells(
    mut commands: Commands,
    tunables: Res<Tunables>,
    input: Res<AvatarInput>,
    mut scheduler: ResMut<GameScheduler>,
    mut q_avatar: Query<(Entity, &Transform, &Facing, &Progression, &mut ActionGate), With<Avatar>>,
    mut cues: MessageWriter<Cue>,
) {
    if !input.attack {
        return;
    }
    let Ok((e, tf, facing, progression, mut gate)) = q_avatar.single_mut() else {
        return;
    };

    let volley = cast_projectile(
        &mut gate,
        e,
        tf.translation.truncate(),
        Faction::Avatar,
        *facing,
        tunables.spells.volley_for_level(progression.level),
        &tunables.spells.avatar,
        &mut scheduler,
    );
    if volley.is_empty() {
        trace!("cast rejected: cooling down");
        return;
    }

    for spec in &volley {
        spawn_projectile(&mut commands, spec, &mut scheduler);
    }
    cues.write(Cue::Animation { entity: e, clip: Clip::Cast });
    cues.write(Cue::Sound(SoundCue::Cast));
    trace!("avatar cast {} projectiles", volley.len());
}
