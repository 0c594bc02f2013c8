//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `bolt_brawler::game::configure_headless` to install gameplay plugins.
//! - every `app.update()` advances time by exactly one fixed step.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use bolt_brawler::common::state::GameState;
use bolt_brawler::plugins::avatar::Avatar;

/// One `FixedUpdate` step at the default 64 Hz.
pub const STEP: Duration = Duration::from_micros(15_625);

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));

    bolt_brawler::game::configure_headless(&mut app);
    app
}

pub fn enter(app: &mut App, state: GameState) {
    app.world_mut().resource_mut::<NextState<GameState>>().set(state);
    app.update();
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Updates until `done` holds, at most `max` frames. Returns whether it held.
pub fn update_until(app: &mut App, max: usize, mut done: impl FnMut(&mut App) -> bool) -> bool {
    for _ in 0..max {
        if done(app) {
            return true;
        }
        app.update();
    }
    done(app)
}

pub fn avatar(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Avatar>>()
        .single(app.world())
        .expect("exactly one avatar")
}
