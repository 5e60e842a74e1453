//! Fundamental geometric and simulation types.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// RGBA color, components nominally in 0..=1.
pub type Color = Vec4;

/// Opaque white.
pub const WHITE: Color = Vec4::ONE;

/// UV rect covering the whole texture (x, y, width, height).
pub const FULL_UV_RECT: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// Handle to a particle system owned by an engine.
///
/// Carries the generation of the underlying slot, so a handle to a system
/// that was removed never resolves to a system created later in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SystemId(pub u64);

impl std::fmt::Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "system#{:x}", self.0)
    }
}

/// Simulation time tracking for an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks run so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt as f64;
    }
}

/// Linear interpolation between `a` and `b`. `t` is not clamped.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector pointing at `radians` (0 = +X, counter-clockwise).
pub fn direction(radians: f32) -> Vec2 {
    Vec2::from_angle(radians)
}

/// Rotate `v` counter-clockwise by `radians`.
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}
