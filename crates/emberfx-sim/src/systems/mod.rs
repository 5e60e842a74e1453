//! Pure per-tick passes run by a particle system.

pub mod emission;
pub mod lifecycle;
pub mod snapshot;
