//! Driver commands sent to a particle system.
//!
//! Commands are synchronous and return nothing; results are observed by
//! polling snapshots.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::types::{Color, WHITE};

/// Fully specified particle for `Emit`, bypassing shape and main module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitParams {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    /// Seconds.
    pub lifetime: f32,
    /// Radians.
    pub rotation: f32,
    /// Radians per second.
    pub rotation_speed: f32,
}

impl Default for EmitParams {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            color: WHITE,
            size: 10.0,
            lifetime: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }
}

/// All driver actions on a system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemCommand {
    // --- Playback ---
    /// Start the system's own timeline from zero.
    Play,
    /// Freeze the system (and the systems it feeds) in place.
    Pause,
    Resume,
    /// Stop own emission and drop sessions hosted by this system.
    Stop { clear_particles: bool },
    /// Stop with clear, then play.
    Restart,
    /// Kill every particle. Sessions keep running.
    Clear,
    /// Advance `time` seconds in fixed sub-steps, optionally from a fresh start.
    Simulate { time: f32, restart: bool },

    // --- Manual emission ---
    /// One particle from shape and main module.
    EmitSingle,
    /// `count` particles from shape and main module.
    EmitBurst { count: u32 },
    /// One explicitly described particle.
    Emit { params: EmitParams },
    /// `count` particles stamped with a renderer-assigned sprite slot.
    /// With a positive `interval` they leave one at a time, `interval`
    /// seconds apart, the first one immediately.
    EmitSprite {
        sprite_slot: i32,
        uv_rect: Vec4,
        count: u32,
        #[serde(default)]
        interval: f32,
    },

    // --- Runtime settings ---
    /// Rebuild the particle store with a new capacity.
    SetMaxParticles { max_particles: usize },
    /// Point attraction pulls toward, in system space.
    SetAttractionTarget { target: Option<Vec2> },
}
