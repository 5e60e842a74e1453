//! Read-only snapshots handed to renderer and UI collaborators.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::enums::PlaybackState;
use crate::events::ParticleEvent;
use crate::types::{Color, SimTime, SystemId};

/// One live particle as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub slot: u32,
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    /// Radians.
    pub rotation: f32,
    /// -1 for the default batch.
    pub sprite_slot: i32,
    pub uv_rect: Vec4,
    pub normalized_age: f32,
}

/// State of one system after a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub id: SystemId,
    pub name: String,
    pub playback: PlaybackState,
    /// Non-zero while the system hosts sub-emitter sessions.
    pub depth: u8,
    /// Own timeline position in seconds.
    pub play_time: f32,
    pub capacity: usize,
    pub active_count: usize,
    /// Hosted sub-emitter sessions.
    pub session_count: usize,
    pub particles: Vec<ParticleView>,
    pub events: Vec<ParticleEvent>,
}

/// State of every system in an engine after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub time: SimTime,
    pub systems: Vec<SystemSnapshot>,
}

impl EngineSnapshot {
    pub fn total_active(&self) -> usize {
        self.systems.iter().map(|s| s.active_count).sum()
    }

    pub fn system(&self, name: &str) -> Option<&SystemSnapshot> {
        self.systems.iter().find(|s| s.name == name)
    }
}
