//! Snapshot builder: reads a system and produces the renderer/UI view.

use emberfx_core::events::ParticleEvent;
use emberfx_core::state::{ParticleView, SystemSnapshot};

use crate::particle_system::ParticleSystem;

/// Build a snapshot of `system`. `events` are the events drained this tick.
pub fn build_snapshot(
    name: &str,
    system: &ParticleSystem,
    events: Vec<ParticleEvent>,
) -> SystemSnapshot {
    let particles = system
        .store()
        .iter_alive()
        .map(|(slot, p)| ParticleView {
            slot: slot as u32,
            id: p.id,
            position: p.position,
            velocity: p.velocity,
            color: p.color,
            size: p.size,
            rotation: p.rotation,
            sprite_slot: p.sprite_slot,
            uv_rect: p.uv_rect,
            normalized_age: p.normalized_age(),
        })
        .collect();

    SystemSnapshot {
        id: system.id(),
        name: name.to_string(),
        playback: system.playback(),
        depth: system.depth(),
        play_time: system.play_time(),
        capacity: system.capacity(),
        active_count: system.active_count(),
        session_count: system.sessions().len(),
        particles,
        events,
    }
}
