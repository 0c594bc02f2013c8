//! Presentation plugin (render-only): HUD, menus and sprite feedback.
//!
//! Reads gameplay state and never writes it back.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::adversaries::{Adversary, AdversaryBrain};
use crate::plugins::avatar::Avatar;
use crate::plugins::combat::Invincibility;
use crate::plugins::progression::LevelUpEffect;
use crate::plugins::run::{HudSnapshot, RunSummary};

/// Blink toggles per second while invincible.
const BLINK_RATE: f32 = 12.0;

const LEVEL_UP_TINT: Color = Color::srgb(1.0, 0.85, 0.3);
const SWING_TINT: Color = Color::srgb(1.0, 0.25, 0.2);

#[derive(Component)]
struct HudText;

/// Sprite colour chosen at spawn, restored when a tint ends.
#[derive(Component, Clone, Copy)]
struct BaseTint(Color);

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::MainMenu), spawn_menu)
        .add_systems(OnEnter(GameState::GameOver), spawn_game_over)
        .add_systems(OnEnter(GameState::InGame), spawn_hud)
        .add_systems(
            Update,
            (remember_base_tint, blink_invincible, tint_sprites, update_hud_text)
                .chain()
                .run_if(in_state(GameState::InGame)),
        );
}

pub fn blink_visible(invincible: bool, elapsed_secs: f32) -> bool {
    !invincible || ((elapsed_secs * BLINK_RATE) as u32).is_multiple_of(2)
}

pub fn hud_line(hud: &HudSnapshot) -> String {
    format!(
        "HP {}/{}   LV {}   XP {}/{}",
        hud.health.max(0),
        hud.max_health,
        hud.level,
        hud.experience,
        hud.to_next
    )
}

fn overlay(text: String, state: GameState) -> impl Bundle {
    (
        Node {
            width: percent(100),
            height: percent(100),
            display: Display::Flex,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        DespawnOnExit(state),
        children![(
            Text::new(text),
            TextFont { font_size: 32.0, ..default() },
            TextColor(Color::srgba(0.95, 0.92, 0.85, 1.0)),
            TextLayout::new_with_justify(Justify::Center),
        )],
    )
}

fn spawn_menu(mut commands: Commands) {
    commands.spawn((
        Name::new("MainMenu"),
        overlay(
            "BOLT BRAWLER\n\nMove A/D  Jump W  Cast F\n\nPress Enter or click to start.".into(),
            GameState::MainMenu,
        ),
    ));
}

fn spawn_game_over(mut commands: Commands, summary: Option<Res<RunSummary>>) {
    let level = summary.map_or(1, |s| s.level_reached);
    commands.spawn((
        Name::new("GameOver"),
        overlay(
            format!("DEFEATED\n\nLevel reached: {level}\n\nPress Enter or click to return."),
            GameState::GameOver,
        ),
    ));
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("Hud"),
        HudText,
        Text::new(hud_line(&HudSnapshot::default())),
        TextFont { font_size: 22.0, ..default() },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: px(12.0),
            left: px(12.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
}

fn update_hud_text(hud: Res<HudSnapshot>, mut q_text: Query<&mut Text, With<HudText>>) {
    if !hud.is_changed() {
        return;
    }
    for mut text in &mut q_text {
        text.0 = hud_line(&hud);
    }
}

fn remember_base_tint(
    mut commands: Commands,
    q_new: Query<(Entity, &Sprite), (Without<BaseTint>, Or<(With<Avatar>, With<Adversary>)>)>,
) {
    for (e, sprite) in &q_new {
        commands.entity(e).insert(BaseTint(sprite.color));
    }
}

fn blink_invincible(
    time: Res<Time>,
    mut q_avatar: Query<(&Invincibility, &mut Visibility), With<Avatar>>,
) {
    for (inv, mut visibility) in &mut q_avatar {
        let shown = blink_visible(inv.is_active(), time.elapsed_secs());
        visibility.set_if_neq(if shown { Visibility::Inherited } else { Visibility::Hidden });
    }
}

fn tint_sprites(
    mut q_avatar: Query<(&LevelUpEffect, &BaseTint, &mut Sprite), (With<Avatar>, Without<Adversary>)>,
    mut q_adversaries: Query<(&AdversaryBrain, &BaseTint, &mut Sprite), (With<Adversary>, Without<Avatar>)>,
) {
    for (effect, base, mut sprite) in &mut q_avatar {
        sprite.color = if effect.is_active() { LEVEL_UP_TINT } else { base.0 };
    }
    for (brain, base, mut sprite) in &mut q_adversaries {
        sprite.color = if brain.is_attacking() { SWING_TINT } else { base.0 };
    }
}
