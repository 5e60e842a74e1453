//! Fixed-capacity particle pool.
//!
//! Slots are addressed by index. Every spawn stamps a fresh `id`, so a holder
//! of a `(slot, id)` pair can tell whether the slot still carries the particle
//! it saw, or one spawned later into the same slot.

use glam::{Vec2, Vec4};

use emberfx_core::types::{Color, FULL_UV_RECT, WHITE};

/// A single particle slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Stamp assigned at spawn. Never 0 for a spawned particle.
    pub id: u32,
    /// Rendered position (after attraction).
    pub position: Vec2,
    pub velocity: Vec2,
    /// Integrated position before attraction is blended in.
    pub simulated_position: Vec2,
    pub color: Color,
    pub start_color: Color,
    pub size: f32,
    pub start_size: f32,
    /// Radians.
    pub rotation: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    pub age: f32,
    pub max_lifetime: f32,
    pub is_alive: bool,
    /// Per-particle sample origin in the noise field.
    pub noise_offset: Vec2,
    /// Lerp factor for two-valued over-lifetime curves, in `[0, 1)`.
    pub seed: f32,
    /// Renderer-assigned sprite, -1 for the default batch.
    pub sprite_slot: i32,
    pub uv_rect: Vec4,
}

impl Particle {
    /// `age / max_lifetime`, or 0 when the lifetime is not positive.
    pub fn normalized_age(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.age / self.max_lifetime).min(1.0)
        } else {
            0.0
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            simulated_position: Vec2::ZERO,
            color: WHITE,
            start_color: WHITE,
            size: 0.0,
            start_size: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            age: 0.0,
            max_lifetime: 0.0,
            is_alive: false,
            noise_offset: Vec2::ZERO,
            seed: 0.0,
            sprite_slot: -1,
            uv_rect: FULL_UV_RECT,
        }
    }
}

/// Owns all particle slots of one system.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    /// Where the next free-slot search starts.
    cursor: usize,
    next_id: u32,
    active: usize,
}

impl ParticleStore {
    /// Create a store. A zero capacity is coerced to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity.max(1)],
            cursor: 0,
            next_id: 1,
            active: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Install `particle` in the next free slot.
    ///
    /// The particle's `id` and `is_alive` are overwritten. Returns `None`
    /// when every slot is taken; the spawn is simply dropped.
    pub fn try_spawn(&mut self, mut particle: Particle) -> Option<usize> {
        let capacity = self.particles.len();
        for offset in 0..capacity {
            let slot = (self.cursor + offset) % capacity;
            if self.particles[slot].is_alive {
                continue;
            }

            particle.id = self.next_id;
            particle.is_alive = true;
            self.next_id = self.next_id.wrapping_add(1).max(1);
            self.particles[slot] = particle;
            self.cursor = (slot + 1) % capacity;
            self.active += 1;
            return Some(slot);
        }

        log::trace!("particle store full ({capacity}), spawn dropped");
        None
    }

    /// Mark a slot dead. Returns false if it was not alive.
    pub fn kill(&mut self, slot: usize) -> bool {
        match self.particles.get_mut(slot) {
            Some(particle) if particle.is_alive => {
                particle.is_alive = false;
                self.active -= 1;
                true
            }
            _ => false,
        }
    }

    /// Live particle at `slot`.
    pub fn get(&self, slot: usize) -> Option<&Particle> {
        self.particles.get(slot).filter(|p| p.is_alive)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Particle> {
        self.particles.get_mut(slot).filter(|p| p.is_alive)
    }

    /// Whether `slot` still holds the live particle stamped `id`.
    pub fn is_valid(&self, slot: usize, id: u32) -> bool {
        self.get(slot).is_some_and(|p| p.id == id)
    }

    /// Kill every particle. The id counter keeps counting.
    pub fn clear(&mut self) {
        for particle in &mut self.particles {
            particle.is_alive = false;
        }
        self.active = 0;
        self.cursor = 0;
    }

    /// Drop every slot and reallocate at `capacity` (coerced to at least 1).
    ///
    /// Ids stay monotonic across the rebuild so stale `(slot, id)` pairs held
    /// elsewhere never match a particle spawned afterwards.
    pub fn rebuild(&mut self, capacity: usize) {
        let next_id = self.next_id;
        *self = Self::new(capacity);
        self.next_id = next_id;
    }

    /// Iterate live particles with their slots.
    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_alive)
    }
}
