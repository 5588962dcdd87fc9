//! Cubic Bézier path evaluation.
//!
//! A path is a chain of control points. Between each consecutive pair we build one cubic
//! Bézier segment whose inner control points come from Catmull-Rom style tangents, so the
//! curve passes exactly through every supplied point.
//!
//! ```text
//!   points:   P0 ────── P1 ────── P2 ────── P3
//!   segment:     seg 0     seg 1     seg 2
//!   progress: 0.0                         1.0
//! ```
//!
//! Everything here is pure: callers re-evaluate from scratch each frame with the current
//! progress, so there is no integration drift no matter how many frames a traversal takes.

use std::ops::{Add, Mul, Sub};

use bevy::log::error;
use bevy::math::{Vec2, Vec3, Vec3A};

/// How far along the neighbour tangent the inner control points sit.
pub const TANGENT_SCALE: f32 = 0.8;

/// Anything we can blend along a path.
pub trait PathPoint: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> {
    /// Returned when there is nothing to evaluate.
    const ZERO: Self;
}

impl PathPoint for Vec2 {
    const ZERO: Self = Vec2::ZERO;
}

impl PathPoint for Vec3 {
    const ZERO: Self = Vec3::ZERO;
}

impl PathPoint for Vec3A {
    const ZERO: Self = Vec3A::ZERO;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineError {
    /// Tried to interpolate a chain with no control points.
    EmptyChain,
}

impl std::fmt::Display for SplineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplineError::EmptyChain => write!(f, "Cannot interpolate an empty set of points"),
        }
    }
}

impl std::error::Error for SplineError {}

/// Point on a single cubic Bézier curve at `t` (clamped to [0, 1]).
///
/// `B(t) = (1-t)^3 p0 + 3(1-t)^2 t p1 + 3(1-t) t^2 p2 + t^3 p3`
#[inline]
pub fn evaluate_cubic_bezier<P: PathPoint>(p0: P, p1: P, p2: P, p3: P, t: f32) -> P {
    let t = t.clamp(0.0, 1.0);

    let t_sqr = t * t;
    let inv = 1.0 - t;
    let inv_sqr = inv * inv;

    let b0 = inv_sqr * inv;
    let b1 = 3.0 * inv_sqr * t;
    let b2 = 3.0 * inv * t_sqr;
    let b3 = t_sqr * t;

    p0 * b0 + p1 * b1 + p2 * b2 + p3 * b3
}

/// Point on the interpolated chain at normalized progress `global_t`.
///
/// Fails only for an empty chain.
pub fn try_evaluate_chain<P: PathPoint>(points: &[P], global_t: f32) -> Result<P, SplineError> {
    let (&first, &last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SplineError::EmptyChain),
    };

    if points.len() == 1 || global_t <= 0.0 {
        return Ok(first);
    }
    if global_t >= 1.0 {
        return Ok(last);
    }

    let num_segments = points.len() - 1;
    let split = global_t * num_segments as f32;
    let i = (split as usize).min(num_segments - 1);
    let local_t = split - i as f32;

    let now = points[i];
    let next = points[i + 1];

    let tangent1 = if i == 0 {
        points[1] - points[0]
    } else {
        (points[i + 1] - points[i - 1]) * 0.5
    };

    let tangent2 = if i + 1 == num_segments {
        last - points[num_segments - 1]
    } else {
        (points[i + 2] - points[i]) * 0.5
    };

    Ok(evaluate_cubic_bezier(
        now,
        now + tangent1 * TANGENT_SCALE,
        next - tangent2 * TANGENT_SCALE,
        next,
        local_t,
    ))
}

/// Like [`try_evaluate_chain`], but reports an empty chain and returns `P::ZERO`.
///
/// This is the per-frame entry point: a bad path must not stop the loop.
pub fn evaluate_chain<P: PathPoint>(points: &[P], global_t: f32) -> P {
    match try_evaluate_chain(points, global_t) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            P::ZERO
        }
    }
}

/// Fill `out` with chain samples walking from progress `from` toward `to` in `step` increments.
///
/// `from` is always included; the walk stops at the last sample that does not pass `to`.
/// Used to grow or shrink a path preview polyline.
pub fn sample_chain<P: PathPoint>(points: &[P], from: f32, to: f32, step: f32, out: &mut Vec<P>) {
    out.clear();

    if points.is_empty() {
        error!("{}", SplineError::EmptyChain);
        return;
    }
    if step <= 0.0 || !step.is_finite() {
        out.push(evaluate_chain(points, from));
        return;
    }

    let span = to - from;
    // Small slack so 0.3 / 0.01 does not lose its last sample to rounding.
    let count = (span.abs() / step + 1e-4).floor() as usize;
    let dir = if span < 0.0 { -1.0 } else { 1.0 };

    out.reserve(count + 1);
    for k in 0..=count {
        out.push(evaluate_chain(points, from + dir * step * k as f32));
    }
}
