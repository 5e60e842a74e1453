//! Simulation engine for emberfx.
//!
//! Owns particle stores and emission sessions, runs the per-tick passes and
//! produces snapshots for renderers. Completely headless.

pub mod engine;
pub mod noise;
pub mod particle_system;
pub mod scene;
pub mod session;
pub mod shape;
pub mod store;
pub mod sub_emitter;
pub mod systems;

pub use emberfx_core as core;
pub use engine::{EngineConfig, EngineError, ParticleEngine};
pub use particle_system::ParticleSystem;
pub use scene::{Preset, SceneConfig, SceneError};

#[cfg(test)]
mod tests;
