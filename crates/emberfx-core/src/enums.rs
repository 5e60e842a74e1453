//! Enumeration types used throughout the engine.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Geometric shape particles are spawned from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmissionShape {
    #[default]
    Circle,
    Cone,
    Edge,
    Rectangle,
}

/// How successive spawns pick their spread value in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadMode {
    /// Independent uniform draw per spawn.
    #[default]
    Random,
    /// Sweeps forward and wraps around.
    Loop,
    /// Sweeps forward to 1, then back to 0.
    PingPong,
    /// Distributes the particles of one burst evenly.
    BurstSpread,
}

/// Particle lifecycle event that fires a sub-emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubEmitterKind {
    /// Parent spawned. The child session follows the live parent.
    #[default]
    Birth,
    /// Parent died. The child session stays where the parent died.
    Death,
}

/// Driver-facing playback state of a system's own timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Why an emission session stopped emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEndReason {
    /// Non-looping session ran past its duration.
    Expired,
    /// The tracked parent particle died or its slot was reused.
    ParentLost,
    /// The owning system was stopped, cleared or rebuilt.
    Stopped,
}

bitflags! {
    /// Parent attributes a sub-emitter session inherits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InheritFlags: u8 {
        const POSITION = 1 << 0;
        const VELOCITY = 1 << 1;
        const COLOR = 1 << 2;
        /// Size as a ratio against the parent's configured base size.
        const SIZE = 1 << 3;
        const ROTATION = 1 << 4;
    }
}

impl Default for InheritFlags {
    fn default() -> Self {
        InheritFlags::POSITION
    }
}
