//! Presentation hints.
//!
//! Gameplay writes `Cue`s and never reads anything back: animation and audio
//! playback live outside the simulation. Headless builds just trace them.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Hit,
    Jump,
    Cast,
    LevelUp,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    Idle,
    Run,
    Jump,
    Attack,
    Cast,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Animation { entity: Entity, clip: Clip },
    Sound(SoundCue),
    StopSound(SoundCue),
}

pub fn plugin(app: &mut App) {
    app.add_message::<Cue>().add_systems(Update, trace_cues);
}

fn trace_cues(mut cues: MessageReader<Cue>) {
    for cue in cues.read() {
        trace!("cue: {cue:?}");
    }
}
