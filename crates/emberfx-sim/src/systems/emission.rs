//! Spawn construction: turns a shape sample and the main module into a particle.

use glam::{Vec2, Vec4};
use rand::Rng;

use emberfx_core::commands::EmitParams;
use emberfx_core::constants::NOISE_OFFSET_RANGE;
use emberfx_core::enums::InheritFlags;
use emberfx_core::modules::SystemModules;
use emberfx_core::types::FULL_UV_RECT;

use crate::session::Inherited;
use crate::shape::{self, BurstIndex, SpreadCursor};
use crate::store::Particle;

/// Where and on whose clock a spawn happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrigin {
    /// Normalized time of the emitting session, for main-module curves.
    pub normalized_time: f32,
    pub base_position: Vec2,
    /// Set for spawns from a sub-emitter session.
    pub inherit: Option<(InheritFlags, Inherited)>,
}

impl SpawnOrigin {
    pub fn at(base_position: Vec2, normalized_time: f32) -> Self {
        Self {
            normalized_time,
            base_position,
            inherit: None,
        }
    }
}

/// Renderer stamp for sprite emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteStamp {
    pub sprite_slot: i32,
    pub uv_rect: Vec4,
}

/// Build a particle from shape, main module and any inherited attributes.
pub fn build_particle<R: Rng>(
    modules: &SystemModules,
    cursor: &mut SpreadCursor,
    origin: &SpawnOrigin,
    burst: Option<BurstIndex>,
    sprite: Option<SpriteStamp>,
    rng: &mut R,
) -> Particle {
    let shape = &modules.shape;
    let spread = shape::spread_value(shape.spread_mode, cursor, shape.spread_speed, burst, rng);
    let point = shape::sample(shape, spread, rng);

    let main = &modules.main;
    let t = origin.normalized_time;
    let speed = main.start_speed.evaluate(t, rng.gen());
    let mut size = main.start_size.evaluate(t, rng.gen());
    let lifetime = main.start_lifetime.evaluate(t, rng.gen());
    let mut color = main.start_color.evaluate(t, rng.gen());
    let mut rotation = main.start_rotation.evaluate(t, rng.gen()).to_radians();
    let rotation_speed = main.angular_velocity.evaluate(t, rng.gen()).to_radians();

    let position = origin.base_position + point.position;
    let mut velocity = point.direction * speed;

    if let Some((flags, inherited)) = origin.inherit {
        if flags.contains(InheritFlags::VELOCITY) {
            velocity += inherited.velocity;
        }
        if flags.contains(InheritFlags::COLOR) {
            color *= inherited.color;
        }
        if flags.contains(InheritFlags::SIZE) {
            size *= inherited.size_ratio;
        }
        if flags.contains(InheritFlags::ROTATION) {
            rotation += inherited.rotation;
        }
    }

    let (sprite_slot, uv_rect) = match sprite {
        Some(stamp) => (stamp.sprite_slot, stamp.uv_rect),
        None => (-1, FULL_UV_RECT),
    };

    Particle {
        position,
        velocity,
        simulated_position: position,
        color,
        start_color: color,
        size,
        start_size: size,
        rotation,
        rotation_speed,
        max_lifetime: lifetime,
        noise_offset: random_noise_offset(rng),
        seed: rng.gen(),
        sprite_slot,
        uv_rect,
        ..Default::default()
    }
}

/// Build a particle exactly as described by `params`.
pub fn particle_from_params<R: Rng>(params: &EmitParams, rng: &mut R) -> Particle {
    Particle {
        position: params.position,
        velocity: params.velocity,
        simulated_position: params.position,
        color: params.color,
        start_color: params.color,
        size: params.size,
        start_size: params.size,
        rotation: params.rotation,
        rotation_speed: params.rotation_speed,
        max_lifetime: params.lifetime,
        noise_offset: random_noise_offset(rng),
        seed: rng.gen(),
        ..Default::default()
    }
}

fn random_noise_offset<R: Rng>(rng: &mut R) -> Vec2 {
    Vec2::new(
        (rng.gen::<f32>() - 0.5) * NOISE_OFFSET_RANGE,
        (rng.gen::<f32>() - 0.5) * NOISE_OFFSET_RANGE,
    )
}
