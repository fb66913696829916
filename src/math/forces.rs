//! Stateless vector helpers and force generators.
//!
//! Everything here is a pure function of its inputs, so UI code can compute
//! one-off forces (wind, a click explosion, a magnetic pull) without owning a
//! [`CollisionSystem`](crate::world::CollisionSystem) and feed the result to
//! `apply_force`.

use serde::{Deserialize, Serialize};

use super::vec2::Vec2;

/// Standard gravitational acceleration used when callers have no preference.
pub const EARTH_GRAVITY: f64 = 9.8;

/// Inverse-square falloff for [`magnetic_force`].
pub const DEFAULT_MAGNETIC_FALLOFF: f64 = 2.0;

/// Physical constants of a damped spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self { mass: 1.0, stiffness: 170.0, damping: 26.0 }
    }
}

pub fn add_vectors(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

pub fn subtract_vectors(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

pub fn multiply_vector(v: Vec2, scalar: f64) -> Vec2 {
    v * scalar
}

pub fn vector_magnitude(v: Vec2) -> f64 {
    v.magnitude()
}

/// Unit vector of `v`; the zero vector maps to itself.
pub fn normalize_vector(v: Vec2) -> Vec2 {
    v.normalize()
}

/// Shrinks `v` to `max` length when it is longer, keeping its direction.
pub fn limit_vector(v: Vec2, max: f64) -> Vec2 {
    v.limit(max)
}

pub fn dot_product(a: Vec2, b: Vec2) -> f64 {
    a.dot(b)
}

pub fn vector_distance(a: Vec2, b: Vec2) -> f64 {
    a.distance(b)
}

/// Hooke's law plus linear damping: `-k·(pos − target) − c·velocity`.
pub fn spring_force(
    position: Vec2,
    target: Vec2,
    config: &SpringConfig,
    velocity: Option<Vec2>,
) -> Vec2 {
    let displacement = position - target;
    let spring = displacement * -config.stiffness;
    let damping = velocity.map_or(Vec2::ZERO, |v| v * -config.damping);
    spring + damping
}

pub fn damping_force(velocity: Vec2, coefficient: f64) -> Vec2 {
    velocity * -coefficient
}

/// Weight of `mass` under gravity `g`, pointing down in y-down screen space.
pub fn gravity_force(mass: f64, g: f64) -> Vec2 {
    Vec2::new(0.0, mass * g)
}

pub fn friction_force(velocity: Vec2, coefficient: f64) -> Vec2 {
    velocity * -coefficient
}

/// Inverse-power pull towards `center` with magnitude `strength / distance^falloff`.
///
/// Returns zero when `position` coincides with `center`.
pub fn magnetic_force(position: Vec2, center: Vec2, strength: f64, falloff: f64) -> Vec2 {
    let offset = center - position;
    let distance = offset.magnitude();
    if distance == 0.0 {
        return Vec2::ZERO;
    }
    let magnitude = strength / distance.powf(falloff);
    offset * (magnitude / distance)
}

/// Outward push from `center`, fading linearly to zero at `radius`.
pub fn explosion_force(position: Vec2, center: Vec2, strength: f64, radius: f64) -> Vec2 {
    let offset = position - center;
    let distance = offset.magnitude();
    if distance == 0.0 || distance >= radius {
        return Vec2::ZERO;
    }
    let falloff = 1.0 - distance / radius;
    offset * (strength * falloff / distance)
}

/// Inward pull towards `target`, strongest at the target and zero beyond `max_distance`.
pub fn attraction_force(position: Vec2, target: Vec2, strength: f64, max_distance: f64) -> Vec2 {
    let offset = target - position;
    let distance = offset.magnitude();
    if distance == 0.0 || distance >= max_distance {
        return Vec2::ZERO;
    }
    let falloff = 1.0 - distance / max_distance;
    offset * (strength * falloff / distance)
}

/// Constant push along `direction`.
pub fn wind_force(direction: Vec2, strength: f64) -> Vec2 {
    direction.normalize() * strength
}

pub fn clamp_scalar(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
