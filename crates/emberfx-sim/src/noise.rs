//! Hash-based 2D gradient noise.
//!
//! Stateless and deterministic: the same sample point always yields the same
//! value, so particles with the same noise offset follow the same path.

use std::f32::consts::TAU;

use glam::Vec2;

use emberfx_core::constants::NOISE_AXIS_OFFSET;

fn hash(n: u32) -> u32 {
    let mut x = n;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

fn hash2(x: i32, y: i32) -> u32 {
    hash((x as u32).wrapping_add(hash(y as u32)))
}

/// Unit gradient at a lattice point.
fn gradient(x: i32, y: i32) -> Vec2 {
    let h = hash2(x, y);
    Vec2::from_angle((h >> 8) as f32 / (1u32 << 24) as f32 * TAU)
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Gradient noise at `p`, roughly in `[-1, 1]`. Zero on lattice points.
pub fn perlin(p: Vec2) -> f32 {
    let cell = p.floor();
    let f = p - cell;
    let (ix, iy) = (cell.x as i32, cell.y as i32);

    let n00 = gradient(ix, iy).dot(f);
    let n10 = gradient(ix.wrapping_add(1), iy).dot(f - Vec2::X);
    let n01 = gradient(ix, iy.wrapping_add(1)).dot(f - Vec2::Y);
    let n11 = gradient(ix.wrapping_add(1), iy.wrapping_add(1)).dot(f - Vec2::ONE);

    let u = fade(f.x);
    let v = fade(f.y);
    let nx0 = n00 + (n10 - n00) * u;
    let nx1 = n01 + (n11 - n01) * u;
    (nx0 + (nx1 - nx0) * v) * std::f32::consts::SQRT_2
}

/// Two decorrelated noise channels sampled around `p`.
pub fn sample2(p: Vec2) -> Vec2 {
    Vec2::new(perlin(p), perlin(p + Vec2::splat(NOISE_AXIS_OFFSET)))
}
