//! Run plugin: tick ordering, end-of-run evaluation and the menu loop.
//!
//! ```text
//! FixedUpdate (InGame)
//!   Timers -> Callbacks -> Terminal -> Movement -> Attack -> Ai -> Hud -> Bounds
//!
//! FixedPostUpdate (InGame), after avian publishes CollisionStart
//!   Detect -> Resolve -> Progress
//!
//! MainMenu --confirm--> InGame --avatar down--> GameOver --confirm--> MainMenu
//! ```
//!
//! A lethal hit only raises `RunStatus::terminal`; the transition happens at
//! the next `Terminal` step, which also catches a health forced to zero by the
//! out-of-bounds check.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::avatar::Avatar;
use crate::plugins::combat::Vitals;
use crate::plugins::feedback::{Cue, SoundCue};
use crate::plugins::progression::Progression;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Timers,
    Callbacks,
    Terminal,
    Movement,
    Attack,
    Ai,
    Hud,
    Bounds,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Detect,
    Resolve,
    Progress,
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Raised by the resolver when the avatar is defeated.
    pub terminal: bool,
    /// The run already handed over to `GameOver`.
    pub finished: bool,
}

/// Payload for the end screen.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub level_reached: u32,
}

/// Read-only view for the HUD.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub health: i32,
    pub max_health: i32,
    pub experience: u32,
    pub to_next: u32,
    pub level: u32,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<RunStatus>()
        .init_resource::<HudSnapshot>()
        .configure_sets(
            FixedUpdate,
            (
                SimSet::Timers,
                SimSet::Callbacks,
                SimSet::Terminal,
                SimSet::Movement,
                SimSet::Attack,
                SimSet::Ai,
                SimSet::Hud,
                SimSet::Bounds,
            )
                .chain(),
        )
        .configure_sets(
            FixedPostUpdate,
            (CombatSet::Detect, CombatSet::Resolve, CombatSet::Progress)
                .chain()
                .after(CollisionEventSystems),
        )
        .add_systems(
            FixedUpdate,
            (
                evaluate_terminal.in_set(SimSet::Terminal),
                refresh_hud.in_set(SimSet::Hud),
                check_bounds.in_set(SimSet::Bounds),
            )
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(OnEnter(GameState::InGame), begin_run)
        .add_systems(OnExit(GameState::InGame), reset_run)
        .add_systems(
            Update,
            (
                start_from_menu.run_if(in_state(GameState::MainMenu)),
                return_to_menu.run_if(in_state(GameState::GameOver)),
            ),
        );
}

fn begin_run(mut commands: Commands, mut status: ResMut<RunStatus>) {
    *status = RunStatus::default();
    commands.remove_resource::<RunSummary>();
    info!("run started");
}

fn reset_run(mut status: ResMut<RunStatus>, mut hud: ResMut<HudSnapshot>) {
    *status = RunStatus::default();
    *hud = HudSnapshot::default();
}

pub fn evaluate_terminal(
    mut commands: Commands,
    mut status: ResMut<RunStatus>,
    mut next: ResMut<NextState<GameState>>,
    q_avatar: Query<(&Vitals, &Progression), With<Avatar>>,
    mut cues: MessageWriter<Cue>,
) {
    if status.finished {
        return;
    }
    let Ok((vitals, progression)) = q_avatar.single() else {
        return;
    };
    if !status.terminal && !vitals.is_depleted() {
        return;
    }

    status.finished = true;
    info!(
        "run over: level {} (health {})",
        progression.level, vitals.health
    );
    commands.insert_resource(RunSummary { level_reached: progression.level });
    cues.write(Cue::Sound(SoundCue::Defeat));
    next.set(GameState::GameOver);
}

pub fn refresh_hud(
    mut hud: ResMut<HudSnapshot>,
    q_avatar: Query<(&Vitals, &Progression), With<Avatar>>,
) {
    let Ok((vitals, progression)) = q_avatar.single() else {
        return;
    };
    hud.set_if_neq(HudSnapshot {
        health: vitals.health,
        max_health: vitals.max_health,
        experience: progression.experience,
        to_next: progression.to_next,
        level: progression.level,
    });
}

/// Feet below the kill plane count as a lethal fall.
pub fn check_bounds(
    tunables: Res<Tunables>,
    mut q_avatar: Query<(&Transform, &mut Vitals), With<Avatar>>,
) {
    let Ok((tf, mut vitals)) = q_avatar.single_mut() else {
        return;
    };
    let feet = tf.translation.y - tunables.avatar.half_size.y;
    if feet < tunables.world.kill_plane && vitals.health > 0 {
        info!("avatar fell out of the world at y {feet:.1}");
        vitals.health = 0;
    }
}

fn confirm_pressed(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
) -> bool {
    let key = keys.is_some_and(|k| k.any_just_pressed([KeyCode::Enter, KeyCode::Space]));
    let click = buttons.is_some_and(|b| b.just_pressed(MouseButton::Left));
    key || click
}

fn start_from_menu(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if confirm_pressed(keys, buttons) {
        next.set(GameState::InGame);
    }
}

fn return_to_menu(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if confirm_pressed(keys, buttons) {
        next.set(GameState::MainMenu);
    }
}
