//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod adversaries;
pub mod avatar;
pub mod clock;
pub mod combat;
pub mod core;
pub mod feedback;
pub mod physics;
pub mod progression;
pub mod projectiles;
pub mod run;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;
pub mod presentation;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    // Tunables first: physics reads them while building.
    core::plugin(app);
    clock::plugin(app);
    combat::plugin(app);
    feedback::plugin(app);
    run::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    avatar::plugin(app);
    adversaries::plugin(app);
    progression::plugin(app);
    app.add_plugins(ProjectilesPlugin);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
    presentation::plugin(app);
}
