//! Per-system module configuration.
//!
//! Modules are plain data owned by the configuration collaborator. The
//! simulation reads them every tick and never writes them back; runtime
//! cursors (spread progress, burst clocks) live next to the config in the
//! simulation crate instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::curves::{Curve, Gradient, MinMaxCurve, MinMaxGradient};
use crate::enums::*;
use crate::types::SystemId;

/// Timeline and spawn-time attributes of a system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainModule {
    /// Length of one playback cycle in seconds.
    pub duration: f32,
    pub looping: bool,
    /// Start playing as soon as the system is added to an engine.
    pub play_on_start: bool,
    /// Particle lifetime in seconds.
    pub start_lifetime: MinMaxCurve,
    pub start_size: MinMaxCurve,
    pub start_speed: MinMaxCurve,
    /// Degrees.
    pub start_rotation: MinMaxCurve,
    /// Degrees per second.
    pub angular_velocity: MinMaxCurve,
    pub start_color: MinMaxGradient,
}

impl Default for MainModule {
    fn default() -> Self {
        Self {
            duration: 5.0,
            looping: true,
            play_on_start: true,
            start_lifetime: MinMaxCurve::between(1.0, 3.0),
            start_size: MinMaxCurve::between(10.0, 20.0),
            start_speed: MinMaxCurve::between(50.0, 150.0),
            start_rotation: MinMaxCurve::between(0.0, 360.0),
            angular_velocity: MinMaxCurve::between(-180.0, 180.0),
            start_color: MinMaxGradient::default(),
        }
    }
}

/// A timed burst on a session's clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstEntry {
    /// Session time of the first firing, in seconds.
    pub time: f32,
    /// Particles per firing, evaluated at the session's normalized time.
    pub count: MinMaxCurve,
    /// Number of firings. 0 repeats forever.
    pub cycles: u32,
    /// Seconds between firings.
    pub interval: f32,
}

impl BurstEntry {
    pub fn new(time: f32, count: f32, cycles: u32, interval: f32) -> Self {
        Self {
            time,
            count: MinMaxCurve::constant(count),
            cycles,
            interval,
        }
    }
}

impl Default for BurstEntry {
    fn default() -> Self {
        Self::new(0.0, 10.0, 1, 0.01)
    }
}

/// Continuous and burst emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionModule {
    /// Gates rate-over-time only. Bursts always run.
    pub enabled: bool,
    /// Particles per second.
    pub rate_over_time: f32,
    pub bursts: Vec<BurstEntry>,
}

impl Default for EmissionModule {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_over_time: 10.0,
            bursts: Vec::new(),
        }
    }
}

/// Spawn geometry. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeModule {
    pub enabled: bool,
    /// Spawn origin for the system's own emissions, in system space.
    pub pivot: Option<Vec2>,
    pub shape: EmissionShape,
    /// Rotation applied to every shape.
    pub emission_angle: f32,
    /// Circle and cone radius.
    pub radius: f32,
    /// Cone opening.
    pub angle: f32,
    /// Rectangle extents; `x` is the edge length.
    pub size: Vec2,
    pub spread_mode: SpreadMode,
    /// Cursor speed for Loop and PingPong.
    pub spread_speed: f32,
    /// 0 spawns at the center, 1 at a random distance.
    pub position_randomness: f32,
    /// 0 follows the spawn angle, 1 picks a random direction.
    pub direction_randomness: f32,
}

impl Default for ShapeModule {
    fn default() -> Self {
        Self {
            enabled: true,
            pivot: None,
            shape: EmissionShape::Circle,
            emission_angle: 90.0,
            radius: 50.0,
            angle: 45.0,
            size: Vec2::new(100.0, 100.0),
            spread_mode: SpreadMode::Random,
            spread_speed: 1.0,
            position_randomness: 1.0,
            direction_randomness: 0.0,
        }
    }
}

/// Acceleration over a particle's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityOverLifetimeModule {
    pub enabled: bool,
    pub x: MinMaxCurve,
    pub y: MinMaxCurve,
}

impl Default for VelocityOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            x: MinMaxCurve::constant(0.0),
            y: MinMaxCurve::constant(0.0),
        }
    }
}

/// Gradient-noise displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseModule {
    pub enabled: bool,
    pub strength: MinMaxCurve,
    pub frequency: f32,
    /// Drift of the sample point per second of particle age.
    pub scroll_speed: Vec2,
}

impl Default for NoiseModule {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: MinMaxCurve::between(0.0, 10.0),
            frequency: 1.0,
            scroll_speed: Vec2::ZERO,
        }
    }
}

/// Size multiplier over lifetime, applied to the spawn size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOverLifetimeModule {
    pub enabled: bool,
    pub size: MinMaxCurve,
}

impl Default for SizeOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            size: MinMaxCurve::curve(Curve::linear(1.0, 0.0), 1.0),
        }
    }
}

/// Color multiplier over lifetime, applied to the spawn color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOverLifetimeModule {
    pub enabled: bool,
    pub color: MinMaxGradient,
}

impl Default for ColorOverLifetimeModule {
    fn default() -> Self {
        Self {
            enabled: false,
            color: MinMaxGradient::Gradient {
                gradient: Gradient::fade_out(),
            },
        }
    }
}

/// Pulls particles toward a runtime target point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractionModule {
    pub enabled: bool,
    /// 0 keeps the simulated position, 1 snaps onto the target.
    pub amount: MinMaxCurve,
}

impl Default for AttractionModule {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: MinMaxCurve::curve(Curve::linear(0.0, 1.0), 1.0),
        }
    }
}

/// One child system fired by a parent particle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubEmitterEntry {
    pub kind: SubEmitterKind,
    pub target: Option<SystemId>,
    pub inherit: InheritFlags,
    /// Scale on the inherited velocity, 0..=1.
    pub velocity_multiplier: f32,
    /// Scale on the inherited size ratio, 0..=2.
    pub size_multiplier: f32,
}

impl SubEmitterEntry {
    pub fn new(kind: SubEmitterKind, target: SystemId) -> Self {
        Self {
            kind,
            target: Some(target),
            ..Default::default()
        }
    }

    pub fn inherit(mut self, flags: InheritFlags) -> Self {
        self.inherit = flags;
        self
    }
}

impl Default for SubEmitterEntry {
    fn default() -> Self {
        Self {
            kind: SubEmitterKind::Birth,
            target: None,
            inherit: InheritFlags::POSITION | InheritFlags::COLOR,
            velocity_multiplier: 0.5,
            size_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubEmitterModule {
    pub enabled: bool,
    pub entries: Vec<SubEmitterEntry>,
}

/// The complete configuration of one particle system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemModules {
    pub main: MainModule,
    pub emission: EmissionModule,
    pub shape: ShapeModule,
    pub velocity_over_lifetime: VelocityOverLifetimeModule,
    pub noise: NoiseModule,
    pub size_over_lifetime: SizeOverLifetimeModule,
    pub color_over_lifetime: ColorOverLifetimeModule,
    pub attraction: AttractionModule,
    pub sub_emitters: SubEmitterModule,
}

impl SystemModules {
    /// Clamp every field into the range the simulation expects.
    ///
    /// Idempotent. The simulation itself never clamps; callers that accept
    /// user-edited configuration run this first.
    pub fn sanitize(&mut self) {
        self.main.duration = self.main.duration.max(MIN_DURATION);
        self.emission.rate_over_time = self.emission.rate_over_time.max(0.0);
        for burst in &mut self.emission.bursts {
            burst.time = burst.time.max(0.0);
            burst.interval = burst.interval.max(0.0);
        }

        let shape = &mut self.shape;
        shape.radius = shape.radius.max(0.0);
        shape.angle = shape.angle.max(0.0);
        shape.size = shape.size.max(Vec2::ZERO);
        shape.spread_speed = shape.spread_speed.clamp(MIN_SPREAD_SPEED, MAX_SPREAD_SPEED);
        shape.position_randomness = shape.position_randomness.clamp(0.0, 1.0);
        shape.direction_randomness = shape.direction_randomness.clamp(0.0, 1.0);

        self.noise.frequency = self
            .noise
            .frequency
            .clamp(MIN_NOISE_FREQUENCY, MAX_NOISE_FREQUENCY);

        for entry in &mut self.sub_emitters.entries {
            entry.velocity_multiplier = entry.velocity_multiplier.clamp(0.0, 1.0);
            entry.size_multiplier = entry.size_multiplier.clamp(0.0, 2.0);
        }
    }

    /// Builder-style sanitize.
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}
