//! Scene descriptions: a set of named systems wired together by
//! sub-emitter entries that refer to each other by name.
//!
//! Scenes are loaded from JSON or built from the presets below.

use std::collections::HashMap;
use std::path::Path;

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use emberfx_core::constants::{DEFAULT_MAX_PARTICLES, DEFAULT_SEED};
use emberfx_core::curves::{Curve, Gradient, MinMaxCurve, MinMaxGradient};
use emberfx_core::enums::{EmissionShape, InheritFlags, SpreadMode, SubEmitterKind};
use emberfx_core::modules::{BurstEntry, SubEmitterEntry, SystemModules};
use emberfx_core::types::SystemId;

use crate::engine::{EngineConfig, ParticleEngine};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read scene: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("system '{system}' has a sub-emitter targeting unknown system '{target}'")]
    UnknownTarget { system: String, target: String },

    #[error("duplicate system name '{0}'")]
    DuplicateName(String),
}

/// A sub-emitter entry whose target is a system name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSubEmitter {
    pub kind: SubEmitterKind,
    pub target: String,
    pub inherit: InheritFlags,
    pub velocity_multiplier: f32,
    pub size_multiplier: f32,
}

impl Default for SceneSubEmitter {
    fn default() -> Self {
        let entry = SubEmitterEntry::default();
        Self {
            kind: entry.kind,
            target: String::new(),
            inherit: entry.inherit,
            velocity_multiplier: entry.velocity_multiplier,
            size_multiplier: entry.size_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSystem {
    pub name: String,
    pub max_particles: usize,
    /// Its `sub_emitters.entries` are replaced by the resolved `sub_emitters` below.
    pub modules: SystemModules,
    pub sub_emitters: Vec<SceneSubEmitter>,
}

impl Default for SceneSystem {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_particles: DEFAULT_MAX_PARTICLES,
            modules: SystemModules::default(),
            sub_emitters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub seed: u64,
    pub systems: Vec<SceneSystem>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            systems: Vec::new(),
        }
    }
}

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Rockets that burst into sparks when they die.
    Fireworks,
    /// A single head dragging a trail that follows it.
    Comet,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Fireworks, Preset::Comet];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Fireworks => "fireworks",
            Preset::Comet => "comet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Fireworks => build_fireworks(),
            Preset::Comet => build_comet(),
        }
    }

    /// Create an engine seeded from the scene and instantiate the scene in it.
    pub fn build(&self) -> Result<(ParticleEngine, Vec<SystemId>), SceneError> {
        let mut engine = ParticleEngine::new(EngineConfig {
            seed: self.seed,
            ..Default::default()
        });
        let ids = self.instantiate(&mut engine)?;
        Ok((engine, ids))
    }

    /// Add every system to `engine`, resolving sub-emitter targets by name.
    /// Returns the new ids in scene order.
    pub fn instantiate(&self, engine: &mut ParticleEngine) -> Result<Vec<SystemId>, SceneError> {
        let mut names: HashMap<&str, usize> = HashMap::new();
        for (index, system) in self.systems.iter().enumerate() {
            if names.insert(system.name.as_str(), index).is_some() {
                return Err(SceneError::DuplicateName(system.name.clone()));
            }
        }
        for system in &self.systems {
            for sub in &system.sub_emitters {
                if !names.contains_key(sub.target.as_str()) {
                    return Err(SceneError::UnknownTarget {
                        system: system.name.clone(),
                        target: sub.target.clone(),
                    });
                }
            }
        }

        let ids: Vec<SystemId> = self
            .systems
            .iter()
            .map(|system| {
                let mut modules = system.modules.clone();
                modules.sub_emitters.entries.clear();
                engine.add_system(system.name.clone(), modules, system.max_particles)
            })
            .collect();

        for (system, &id) in self.systems.iter().zip(&ids) {
            if system.sub_emitters.is_empty() {
                continue;
            }
            let mut modules = system.modules.clone();
            modules.sub_emitters.enabled = true;
            modules.sub_emitters.entries = system
                .sub_emitters
                .iter()
                .map(|sub| SubEmitterEntry {
                    kind: sub.kind,
                    target: names.get(sub.target.as_str()).map(|&index| ids[index]),
                    inherit: sub.inherit,
                    velocity_multiplier: sub.velocity_multiplier,
                    size_multiplier: sub.size_multiplier,
                })
                .collect();
            // Ids come straight from add_system above.
            if let Err(err) = engine.reconfigure(id, modules) {
                log::warn!("scene system '{}' vanished: {err}", system.name);
            }
        }

        log::info!("instantiated scene with {} systems", ids.len());
        Ok(ids)
    }
}

/// Fireworks: rockets launched upward, slowed by gravity, each bursting
/// into a ring of sparks when it dies.
fn build_fireworks() -> SceneConfig {
    let mut rockets = SystemModules::default();
    rockets.main.duration = 2.0;
    rockets.main.start_lifetime = MinMaxCurve::between(1.2, 1.6);
    rockets.main.start_size = MinMaxCurve::between(6.0, 8.0);
    rockets.main.start_speed = MinMaxCurve::between(220.0, 280.0);
    rockets.main.start_rotation = MinMaxCurve::constant(0.0);
    rockets.main.angular_velocity = MinMaxCurve::constant(0.0);
    rockets.main.start_color = MinMaxGradient::TwoColors {
        min: Vec4::new(1.0, 0.4, 0.2, 1.0),
        max: Vec4::new(0.3, 0.6, 1.0, 1.0),
    };
    rockets.emission.enabled = true;
    rockets.emission.rate_over_time = 2.0;
    rockets.shape.shape = EmissionShape::Cone;
    rockets.shape.angle = 20.0;
    rockets.shape.radius = 5.0;
    rockets.velocity_over_lifetime.enabled = true;
    rockets.velocity_over_lifetime.y = MinMaxCurve::constant(-120.0);

    let mut sparks = SystemModules::default();
    sparks.main.play_on_start = false;
    sparks.main.duration = 1.0;
    sparks.main.looping = false;
    sparks.main.start_lifetime = MinMaxCurve::between(0.6, 1.2);
    sparks.main.start_size = MinMaxCurve::between(3.0, 5.0);
    sparks.main.start_speed = MinMaxCurve::between(60.0, 160.0);
    sparks.emission.bursts = vec![BurstEntry::new(0.0, 40.0, 1, 0.01)];
    sparks.shape.radius = 2.0;
    sparks.shape.position_randomness = 0.2;
    sparks.shape.spread_mode = SpreadMode::BurstSpread;
    sparks.velocity_over_lifetime.enabled = true;
    sparks.velocity_over_lifetime.y = MinMaxCurve::constant(-60.0);
    sparks.noise.enabled = true;
    sparks.noise.strength = MinMaxCurve::between(0.0, 20.0);
    sparks.size_over_lifetime.enabled = true;
    sparks.color_over_lifetime.enabled = true;

    SceneConfig {
        seed: DEFAULT_SEED,
        systems: vec![
            SceneSystem {
                name: "rockets".into(),
                max_particles: 64,
                modules: rockets,
                sub_emitters: vec![SceneSubEmitter {
                    kind: SubEmitterKind::Death,
                    target: "sparks".into(),
                    inherit: InheritFlags::POSITION | InheritFlags::COLOR,
                    ..Default::default()
                }],
            },
            SceneSystem {
                name: "sparks".into(),
                max_particles: 2000,
                modules: sparks,
                sub_emitters: Vec::new(),
            },
        ],
    }
}

/// Comet: one head per cycle, trailed by a Birth sub-emitter that follows it
/// and scales with it.
fn build_comet() -> SceneConfig {
    let mut head = SystemModules::default();
    head.main.duration = 4.0;
    head.main.start_lifetime = MinMaxCurve::constant(3.5);
    head.main.start_size = MinMaxCurve::constant(24.0);
    head.main.start_speed = MinMaxCurve::constant(120.0);
    head.main.start_rotation = MinMaxCurve::constant(0.0);
    head.main.angular_velocity = MinMaxCurve::constant(0.0);
    head.main.start_color = MinMaxGradient::color(Vec4::new(0.8, 0.9, 1.0, 1.0));
    head.emission.bursts = vec![BurstEntry::new(0.0, 1.0, 1, 0.01)];
    head.shape.shape = EmissionShape::Edge;
    head.shape.emission_angle = 30.0;
    head.shape.size = Vec2::ZERO;
    head.size_over_lifetime.enabled = true;
    head.size_over_lifetime.size =
        MinMaxCurve::curve(Curve::linear(1.0, 0.4).with_key(0.2, 1.2), 1.0);

    let mut tail = SystemModules::default();
    tail.main.play_on_start = false;
    tail.main.duration = 4.0;
    tail.main.looping = false;
    tail.main.start_lifetime = MinMaxCurve::between(0.5, 0.9);
    tail.main.start_size = MinMaxCurve::between(8.0, 12.0);
    tail.main.start_speed = MinMaxCurve::between(5.0, 20.0);
    tail.emission.enabled = true;
    tail.emission.rate_over_time = 40.0;
    tail.shape.radius = 4.0;
    tail.size_over_lifetime.enabled = true;
    tail.color_over_lifetime.enabled = true;
    tail.color_over_lifetime.color = MinMaxGradient::Gradient {
        gradient: Gradient::fade_out().with_key(0.1, Vec4::new(1.0, 1.0, 1.0, 0.9)),
    };

    SceneConfig {
        seed: DEFAULT_SEED,
        systems: vec![
            SceneSystem {
                name: "head".into(),
                max_particles: 8,
                modules: head,
                sub_emitters: vec![SceneSubEmitter {
                    kind: SubEmitterKind::Birth,
                    target: "tail".into(),
                    inherit: InheritFlags::POSITION | InheritFlags::COLOR | InheritFlags::SIZE,
                    ..Default::default()
                }],
            },
            SceneSystem {
                name: "tail".into(),
                max_particles: 512,
                modules: tail,
                sub_emitters: Vec::new(),
            },
        ],
    }
}
