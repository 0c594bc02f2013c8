//! Physics plugin: avian2d with side-view gravity.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

/// How far above the floor top a body's feet may hover and still count as standing.
pub const GROUND_TOLERANCE: f32 = 2.0;
/// Vertical speed below which a body on the floor is at rest.
pub const REST_SPEED: f32 = 5.0;

pub fn plugin(app: &mut App) {
    let (ppm, gravity) = {
        let tunables = app.world().resource::<Tunables>();
        (tunables.pixels_per_meter, tunables.world.gravity)
    };
    app.add_plugins(PhysicsPlugins::default().with_length_unit(ppm));
    app.insert_resource(Gravity(Vec2::NEG_Y * gravity));
}

/// Standing on the walkable surface: feet at the floor top and not moving vertically.
#[inline]
pub fn is_grounded(feet_y: f32, vertical_speed: f32, floor_top: f32) -> bool {
    (feet_y - floor_top).abs() <= GROUND_TOLERANCE && vertical_speed.abs() <= REST_SPEED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounded_needs_both_contact_and_rest() {
        assert!(is_grounded(0.5, 0.0, 0.0));
        assert!(is_grounded(-1.5, 3.0, 0.0));
        assert!(!is_grounded(10.0, 0.0, 0.0));
        assert!(!is_grounded(0.0, 300.0, 0.0));
        assert!(!is_grounded(0.0, -300.0, 0.0));
    }
}
