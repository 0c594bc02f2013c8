//! Crate error types.
//!
//! Gameplay never surfaces these to the player; they are logged.

use thiserror::Error;

/// Rejected configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TunablesError {
    #[error("{name} range is empty ({start}..={end})")]
    EmptyRange { name: &'static str, start: f32, end: f32 },
    #[error("damage ordering violated: {lower} rolls must stay below {upper} rolls")]
    DamageOrdering { lower: &'static str, upper: &'static str },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("adversary near threshold {near} exceeds far threshold {far}")]
    Thresholds { near: f32, far: f32 },
    #[error("volley needs at least one offset and a base volley of at least one")]
    EmptyVolley,
}

/// Input subsystem failures. Control degrades instead of halting the run.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("keyboard input unavailable, falling back to pointer-only control")]
    KeyboardUnavailable,
}
