//! Keyframed curves and gradients, plus their min/max wrappers.
//!
//! All evaluation is pure. `t` is a normalized time in `[0, 1]` (clamped),
//! `lerp` picks a point between the min and max variants of a two-valued
//! curve and is usually a random draw or a per-particle seed.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::types::{lerp, Color, WHITE};

/// Piecewise-linear curve over normalized time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Keyframes as (time, value), sorted by time.
    pub keys: Vec<(f32, f32)>,
}

impl Curve {
    /// Flat curve.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![(0.0, value), (1.0, value)],
        }
    }

    /// Straight line from `start` at t=0 to `end` at t=1.
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            keys: vec![(0.0, start), (1.0, end)],
        }
    }

    /// Add a keyframe, keeping keys sorted.
    pub fn with_key(mut self, time: f32, value: f32) -> Self {
        self.keys.push((time, value));
        self.keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }

    /// Evaluate at `t`. An empty curve evaluates to 1.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 1.0,
        };

        let t = t.clamp(0.0, 1.0);
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t >= t0 && t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return v1;
                }
                return lerp(v0, v1, (t - t0) / span);
            }
        }

        last.1
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

/// A scalar that is constant, random between two constants, or driven by
/// one or two curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MinMaxCurve {
    Constant {
        value: f32,
    },
    TwoConstants {
        min: f32,
        max: f32,
    },
    Curve {
        curve: Curve,
        multiplier: f32,
    },
    TwoCurves {
        min: Curve,
        max: Curve,
        multiplier: f32,
    },
}

impl MinMaxCurve {
    pub fn constant(value: f32) -> Self {
        MinMaxCurve::Constant { value }
    }

    pub fn between(min: f32, max: f32) -> Self {
        MinMaxCurve::TwoConstants { min, max }
    }

    pub fn curve(curve: Curve, multiplier: f32) -> Self {
        MinMaxCurve::Curve { curve, multiplier }
    }

    /// Evaluate at normalized time `t`, blending min/max by `lerp_factor`.
    pub fn evaluate(&self, t: f32, lerp_factor: f32) -> f32 {
        match self {
            MinMaxCurve::Constant { value } => *value,
            MinMaxCurve::TwoConstants { min, max } => lerp(*min, *max, lerp_factor),
            MinMaxCurve::Curve { curve, multiplier } => curve.evaluate(t) * multiplier,
            MinMaxCurve::TwoCurves {
                min,
                max,
                multiplier,
            } => lerp(min.evaluate(t), max.evaluate(t), lerp_factor) * multiplier,
        }
    }
}

impl Default for MinMaxCurve {
    fn default() -> Self {
        MinMaxCurve::constant(1.0)
    }
}

/// Piecewise-linear RGBA gradient over normalized time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Color keys as (time, rgba), sorted by time.
    pub keys: Vec<(f32, Color)>,
}

impl Gradient {
    pub fn solid(color: Color) -> Self {
        Self {
            keys: vec![(0.0, color), (1.0, color)],
        }
    }

    /// Two-key gradient from `start` to `end`.
    pub fn linear(start: Color, end: Color) -> Self {
        Self {
            keys: vec![(0.0, start), (1.0, end)],
        }
    }

    /// White that fades to fully transparent.
    pub fn fade_out() -> Self {
        Self::linear(WHITE, Vec4::new(1.0, 1.0, 1.0, 0.0))
    }

    pub fn with_key(mut self, time: f32, color: Color) -> Self {
        self.keys.push((time, color));
        self.keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }

    /// Evaluate at `t`. An empty gradient evaluates to white.
    pub fn evaluate(&self, t: f32) -> Color {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return WHITE,
        };

        let t = t.clamp(0.0, 1.0);
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.keys.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t >= t0 && t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return c1;
                }
                return c0.lerp(c1, (t - t0) / span);
            }
        }

        last.1
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::solid(WHITE)
    }
}

/// A color that is fixed, random between two colors, or driven by one or
/// two gradients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MinMaxGradient {
    Color { color: Color },
    TwoColors { min: Color, max: Color },
    Gradient { gradient: Gradient },
    TwoGradients { min: Gradient, max: Gradient },
}

impl MinMaxGradient {
    pub fn color(color: Color) -> Self {
        MinMaxGradient::Color { color }
    }

    pub fn evaluate(&self, t: f32, lerp_factor: f32) -> Color {
        match self {
            MinMaxGradient::Color { color } => *color,
            MinMaxGradient::TwoColors { min, max } => min.lerp(*max, lerp_factor),
            MinMaxGradient::Gradient { gradient } => gradient.evaluate(t),
            MinMaxGradient::TwoGradients { min, max } => {
                min.evaluate(t).lerp(max.evaluate(t), lerp_factor)
            }
        }
    }
}

impl Default for MinMaxGradient {
    fn default() -> Self {
        MinMaxGradient::color(WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_interpolates_between_keys() {
        let curve = Curve::linear(0.0, 10.0).with_key(0.5, 2.0);
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert!((curve.evaluate(0.25) - 1.0).abs() < 1e-5);
        assert!((curve.evaluate(0.75) - 6.0).abs() < 1e-5);
        assert_eq!(curve.evaluate(2.0), 10.0, "t is clamped");
    }

    #[test]
    fn empty_curve_is_identity_scale() {
        let curve = Curve { keys: Vec::new() };
        assert_eq!(curve.evaluate(0.3), 1.0);
    }

    #[test]
    fn coincident_keys_do_not_divide_by_zero() {
        let curve = Curve {
            keys: vec![(0.0, 0.0), (0.5, 1.0), (0.5, 3.0), (1.0, 3.0)],
        };
        assert!(curve.evaluate(0.5).is_finite());
    }

    #[test]
    fn two_constants_use_lerp_factor() {
        let c = MinMaxCurve::between(10.0, 20.0);
        assert_eq!(c.evaluate(0.9, 0.0), 10.0);
        assert_eq!(c.evaluate(0.9, 1.0), 20.0);
        assert_eq!(c.evaluate(0.1, 0.5), 15.0);
    }

    #[test]
    fn curve_mode_applies_multiplier() {
        let c = MinMaxCurve::curve(Curve::linear(1.0, 0.0), 4.0);
        assert_eq!(c.evaluate(0.0, 0.7), 4.0);
        assert_eq!(c.evaluate(1.0, 0.7), 0.0);
    }

    #[test]
    fn gradient_fades_alpha() {
        let g = Gradient::fade_out();
        let mid = g.evaluate(0.5);
        assert_eq!(mid.x, 1.0);
        assert!((mid.w - 0.5).abs() < 1e-5);
    }
}
