//! Engine constants and tuning parameters.

/// Default store capacity for a new system.
pub const DEFAULT_MAX_PARTICLES: usize = 1000;

/// Default RNG seed for engines.
pub const DEFAULT_SEED: u64 = 42;

/// Smallest session duration accepted from configuration (seconds).
pub const MIN_DURATION: f32 = 0.01;

/// Fixed sub-step used by `Simulate` (50 steps per second).
pub const SIMULATE_STEP: f32 = 0.02;

/// Largest `dt` a driver should feed a single tick (seconds).
/// The core does not clamp; drivers do.
pub const MAX_DELTA: f32 = 0.1;

/// Default driver tick rate (Hz) for the preview tool.
pub const PREVIEW_TICK_RATE: u32 = 60;

// --- Shape / spread ---

/// Converts `spread_speed` into cursor advance per spawn.
pub const SPREAD_SPEED_SCALE: f32 = 0.01;

pub const MIN_SPREAD_SPEED: f32 = 0.01;
pub const MAX_SPREAD_SPEED: f32 = 10.0;

/// Spread value for spawns that are not part of a multi-particle burst.
pub const CENTER_SPREAD: f32 = 0.5;

// --- Noise ---

/// Per-particle noise offsets are drawn from +/- half of this range.
pub const NOISE_OFFSET_RANGE: f32 = 2000.0;

/// Sample offset between the X and Y noise channels.
pub const NOISE_AXIS_OFFSET: f32 = 100.0;

pub const MIN_NOISE_FREQUENCY: f32 = 0.1;
pub const MAX_NOISE_FREQUENCY: f32 = 10.0;

// --- Sub-emitters ---

/// Depth a system runs at while it hosts sub-emitter sessions.
/// Systems at this depth never fire sub-emitters themselves.
pub const SUB_EMITTER_DEPTH: u8 = 1;

/// Hop limit for the advisory sub-emitter cycle check.
pub const MAX_CYCLE_CHECK_DEPTH: usize = 10;
