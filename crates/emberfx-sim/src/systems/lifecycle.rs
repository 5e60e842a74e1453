//! Per-particle update pass: aging, velocity fields, noise, attraction,
//! rotation and over-lifetime curves.

use glam::Vec2;

use emberfx_core::modules::SystemModules;

use crate::noise;
use crate::store::{Particle, ParticleStore};

/// Update every live particle by `dt`.
///
/// Particles that reach their lifetime are killed and pushed onto `deaths`
/// with their last state, in slot order. The caller fires death triggers
/// from that buffer.
pub fn run(
    store: &mut ParticleStore,
    modules: &SystemModules,
    attraction_target: Option<Vec2>,
    dt: f32,
    deaths: &mut Vec<(usize, Particle)>,
) {
    for slot in 0..store.capacity() {
        let Some(particle) = store.get_mut(slot) else {
            continue;
        };

        if update_particle(particle, modules, attraction_target, dt) {
            let last_state = *particle;
            particle.sprite_slot = -1;
            store.kill(slot);
            deaths.push((slot, last_state));
        }
    }
}

/// Returns true if the particle died this tick.
fn update_particle(
    p: &mut Particle,
    modules: &SystemModules,
    attraction_target: Option<Vec2>,
    dt: f32,
) -> bool {
    p.age += dt;
    if p.age >= p.max_lifetime {
        return true;
    }

    let t = p.normalized_age();
    let seed = p.seed;

    let vol = &modules.velocity_over_lifetime;
    if vol.enabled {
        p.velocity += Vec2::new(vol.x.evaluate(t, seed), vol.y.evaluate(t, seed)) * dt;
    }

    p.simulated_position += p.velocity * dt;

    let noise = &modules.noise;
    if noise.enabled {
        let sample = (p.noise_offset + noise.scroll_speed * p.age) * noise.frequency;
        let strength = noise.strength.evaluate(t, seed);
        p.simulated_position += noise::sample2(sample) * strength * dt;
    }

    let attraction = &modules.attraction;
    p.position = match attraction_target {
        Some(target) if attraction.enabled => {
            let amount = attraction.amount.evaluate(t, seed).clamp(0.0, 1.0);
            p.simulated_position.lerp(target, amount)
        }
        _ => p.simulated_position,
    };

    p.rotation += p.rotation_speed * dt;

    if modules.size_over_lifetime.enabled {
        p.size = p.start_size * modules.size_over_lifetime.size.evaluate(t, seed);
    }
    if modules.color_over_lifetime.enabled {
        p.color = p.start_color * modules.color_over_lifetime.color.evaluate(t, seed);
    }

    false
}
