//! Core plugin: shared resources and global settings.
//!
//! Resources inserted before this plugin runs (a test's pinned `Tunables` or
//! seeded `GameRng`) are kept.

use crate::common::{rng::GameRng, tunables::Tunables};
use bevy::prelude::*;

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>();
    app.init_resource::<GameRng>();
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
    app.add_systems(Startup, validate_tunables);
}

fn validate_tunables(tunables: Res<Tunables>) {
    match tunables.validate() {
        Ok(()) => debug!("tunables ok"),
        Err(e) => error!("invalid tunables: {e}"),
    }
}

#[cfg(test)]
mod tests;
