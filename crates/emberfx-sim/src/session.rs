//! Emission sessions and the per-tick scheduler step.
//!
//! A system runs one own session while playing, plus one session per
//! sub-emitter trigger installed into it by a parent system. Each session has
//! an independent clock, rate accumulator and burst state.

use glam::Vec2;
use rand::Rng;

use emberfx_core::enums::{InheritFlags, SubEmitterKind};
use emberfx_core::modules::{BurstEntry, EmissionModule};
use emberfx_core::types::{Color, SystemId, WHITE};

/// Firing clock of one configured burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstState {
    pub current_cycle: u32,
    /// Session time of the last firing, negative before the first.
    pub last_burst_time: f32,
}

impl Default for BurstState {
    fn default() -> Self {
        Self {
            current_cycle: 0,
            last_burst_time: -1.0,
        }
    }
}

impl BurstState {
    /// Whether the burst fires at `play_time`. Updates the clock when it does.
    fn poll(&mut self, entry: &BurstEntry, play_time: f32) -> bool {
        if self.last_burst_time < 0.0 {
            if play_time >= entry.time {
                self.last_burst_time = play_time;
                self.current_cycle = 1;
                return true;
            }
            return false;
        }

        let cycles_left = entry.cycles == 0 || self.current_cycle < entry.cycles;
        if cycles_left && play_time >= self.last_burst_time + entry.interval {
            self.last_burst_time = play_time;
            self.current_cycle += 1;
            return true;
        }
        false
    }
}

/// A (system, slot, id) reference to a particle in another system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub system: SystemId,
    pub slot: usize,
    pub id: u32,
}

/// Parent attributes captured when a sub-emitter fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inherited {
    /// Already scaled by the entry's velocity multiplier.
    pub velocity: Vec2,
    pub color: Color,
    /// Parent size over its configured base size, scaled by the size multiplier.
    pub size_ratio: f32,
    /// Radians.
    pub rotation: f32,
}

impl Default for Inherited {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            color: WHITE,
            size_ratio: 1.0,
            rotation: 0.0,
        }
    }
}

/// Sub-emitter side of a session hosted for a parent system.
#[derive(Debug, Clone, PartialEq)]
pub struct SubEmitterLink {
    pub session_id: u32,
    pub kind: SubEmitterKind,
    pub parent: ParentRef,
    pub flags: InheritFlags,
    /// Spawn origin. Frozen for Death sessions, tracked for Birth sessions.
    pub base_position: Vec2,
    pub inherited: Inherited,
}

impl SubEmitterLink {
    /// Birth sessions follow a live parent; Death sessions have none to follow.
    pub fn tracks_parent(&self) -> bool {
        self.kind == SubEmitterKind::Birth
    }
}

/// Particles to emit this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionStep {
    /// From rate-over-time, emitted one at a time.
    pub rate: u32,
    /// One entry per burst that fired, emitted as a group.
    pub bursts: Vec<u32>,
}

impl EmissionStep {
    pub fn total(&self) -> u32 {
        self.rate + self.bursts.iter().sum::<u32>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmissionSession {
    pub play_time: f32,
    pub duration: f32,
    pub looping: bool,
    /// Fractional particles carried to the next tick.
    pub rate_accumulator: f32,
    pub bursts: Vec<BurstState>,
    /// `None` for a system's own session.
    pub link: Option<SubEmitterLink>,
}

impl EmissionSession {
    /// A system's own session.
    pub fn own(duration: f32, looping: bool) -> Self {
        Self {
            play_time: 0.0,
            duration,
            looping,
            rate_accumulator: 0.0,
            bursts: Vec::new(),
            link: None,
        }
    }

    pub fn sub_emitter(duration: f32, looping: bool, link: SubEmitterLink) -> Self {
        Self {
            link: Some(link),
            ..Self::own(duration, looping)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.looping || self.play_time < self.duration
    }

    /// Session clock over duration, 0 for a non-positive duration.
    pub fn normalized_time(&self) -> f32 {
        if self.duration > 0.0 {
            (self.play_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Start every burst over from its first firing.
    pub fn reset_bursts(&mut self) {
        for state in &mut self.bursts {
            *state = BurstState::default();
        }
    }

    /// Advance the clock by `dt` and work out what to emit.
    ///
    /// Returns `None` once a non-looping session has run past its duration.
    /// Rate emission is gated by `emission.enabled`, bursts are not.
    pub fn step<R: Rng>(
        &mut self,
        dt: f32,
        emission: &EmissionModule,
        rng: &mut R,
    ) -> Option<EmissionStep> {
        self.play_time += dt;
        if self.play_time >= self.duration {
            if !self.looping {
                return None;
            }
            self.play_time = 0.0;
            self.reset_bursts();
        }

        let mut step = EmissionStep::default();

        if emission.enabled {
            self.rate_accumulator += emission.rate_over_time.max(0.0) * dt;
            let whole = self.rate_accumulator.floor();
            self.rate_accumulator -= whole;
            step.rate = whole as u32;
        }

        // Config is edited externally; keep one clock per entry.
        self.bursts
            .resize(emission.bursts.len(), BurstState::default());

        let t = self.normalized_time();
        for (entry, state) in emission.bursts.iter().zip(self.bursts.iter_mut()) {
            if state.poll(entry, self.play_time) {
                let count = entry.count.evaluate(t, rng.gen::<f32>()).round().max(0.0) as u32;
                if count > 0 {
                    step.bursts.push(count);
                }
            }
        }

        Some(step)
    }
}
