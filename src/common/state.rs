//! Global state machine.
//!
//! `MainMenu -> InGame -> GameOver -> MainMenu`. A run never resumes: leaving
//! `InGame` tears down every run-scoped entity and the next entry starts fresh.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    MainMenu,
    InGame,
    GameOver,
}
