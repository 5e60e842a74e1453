//! Spawn geometry: where a particle starts and which way it first moves.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use emberfx_core::constants::{CENTER_SPREAD, SPREAD_SPEED_SCALE};
use emberfx_core::enums::{EmissionShape, SpreadMode};
use emberfx_core::modules::ShapeModule;
use emberfx_core::types::{direction, lerp, rotate};

/// Runtime cursor for the Loop and PingPong spread modes.
///
/// Lives next to the shape config in the owning system, never inside it,
/// so it can be reset without touching settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpreadCursor {
    pub progress: f32,
    /// PingPong is sweeping back toward 0.
    pub reverse: bool,
}

impl SpreadCursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Position within the current emission call, used by BurstSpread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstIndex {
    pub index: u32,
    pub count: u32,
}

/// Local spawn point produced by [`sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    /// Unit vector.
    pub direction: Vec2,
}

/// Next spread value for `mode`, advancing `cursor` where the mode has one.
pub fn spread_value<R: Rng>(
    mode: SpreadMode,
    cursor: &mut SpreadCursor,
    speed: f32,
    burst: Option<BurstIndex>,
    rng: &mut R,
) -> f32 {
    let step = speed * SPREAD_SPEED_SCALE;
    match mode {
        SpreadMode::Random => rng.gen::<f32>(),
        SpreadMode::Loop => {
            let value = cursor.progress;
            cursor.progress = (cursor.progress + step).rem_euclid(1.0);
            value
        }
        SpreadMode::PingPong => {
            let value = cursor.progress;
            if cursor.reverse {
                cursor.progress -= step;
                if cursor.progress <= 0.0 {
                    cursor.progress = 0.0;
                    cursor.reverse = false;
                }
            } else {
                cursor.progress += step;
                if cursor.progress >= 1.0 {
                    cursor.progress = 1.0;
                    cursor.reverse = true;
                }
            }
            value
        }
        SpreadMode::BurstSpread => match burst {
            Some(BurstIndex { index, count }) if count > 1 => index as f32 / (count - 1) as f32,
            _ => CENTER_SPREAD,
        },
    }
}

/// Sample a spawn point in the shape's local frame.
///
/// A disabled shape spawns at the origin moving up. Degenerate sizes collapse
/// onto the center.
pub fn sample<R: Rng>(shape: &ShapeModule, spread: f32, rng: &mut R) -> SpawnPoint {
    if !shape.enabled {
        return SpawnPoint {
            position: Vec2::ZERO,
            direction: Vec2::Y,
        };
    }

    let base = shape.emission_angle.to_radians();
    let pos_blend = shape.position_randomness;
    let dir_blend = shape.direction_randomness;

    match shape.shape {
        EmissionShape::Circle => {
            let angle = spread * TAU;
            let distance = lerp(0.0, rng.gen::<f32>() * shape.radius, pos_blend);
            let dir_angle = lerp(angle, rng.gen::<f32>() * TAU, dir_blend);
            SpawnPoint {
                position: rotate(direction(angle) * distance, base),
                direction: direction(dir_angle + base),
            }
        }
        EmissionShape::Cone => {
            let cone = shape.angle.to_radians();
            let total = base + (spread - 0.5) * cone;
            let distance = lerp(0.0, rng.gen::<f32>() * shape.radius, pos_blend);
            let jitter = (rng.gen::<f32>() * 2.0 - 1.0) * cone * 0.5;
            let dir_angle = lerp(total, base + jitter, dir_blend);
            SpawnPoint {
                position: direction(total) * distance,
                direction: direction(dir_angle),
            }
        }
        EmissionShape::Edge => {
            let perpendicular = Vec2::new(-base.sin(), base.cos());
            let dir_angle = lerp(base, rng.gen::<f32>() * TAU, dir_blend);
            SpawnPoint {
                position: perpendicular * (spread - 0.5) * shape.size.x,
                direction: direction(dir_angle),
            }
        }
        EmissionShape::Rectangle => {
            let angle = spread * TAU;
            let max_distance = (shape.size.x * 0.5).min(shape.size.y * 0.5);
            let distance = lerp(0.0, rng.gen::<f32>() * max_distance, pos_blend);
            let dir_angle = lerp(angle, rng.gen::<f32>() * TAU, dir_blend);
            SpawnPoint {
                position: rotate(direction(angle) * distance, base),
                direction: direction(dir_angle + base),
            }
        }
    }
}
