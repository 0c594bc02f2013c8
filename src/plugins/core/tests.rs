use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<GameRng>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn keeps_pinned_tunables() {
    let mut app = App::new();
    let mut pinned = Tunables::default();
    pinned.spawn.cap = 3;
    app.insert_resource(pinned);
    core::plugin(&mut app);
    assert_eq!(app.world().resource::<Tunables>().spawn.cap, 3);
}
