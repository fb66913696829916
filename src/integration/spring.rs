//! Turns perceptual animation goals into spring constants, and steps a spring
//! for properties animated outside the collision engine.

pub use crate::math::forces::SpringConfig;
use crate::math::forces::spring_force;
use crate::math::vec2::Vec2;

/// Lowest damping ratio `design_spring` will produce, so the spring always settles.
const MIN_DAMPING_RATIO: f64 = 0.05;
/// Settling criterion: the envelope `e^(-ζ·ωn·t)` drops below ~2% at `ζ·ωn·t = 4`.
const SETTLING_CONSTANT: f64 = 4.0;
const MIN_POSITIVE: f64 = 1e-6;

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Damping at which the spring returns fastest without oscillating.
pub fn critical_damping(mass: f64, stiffness: f64) -> f64 {
    2.0 * (mass * stiffness).sqrt()
}

/// `damping / critical_damping`; 1.0 is critically damped.
pub fn damping_ratio(config: &SpringConfig) -> f64 {
    let critical = critical_damping(config.mass, config.stiffness);
    if critical > 0.0 {
        config.damping / critical
    } else {
        0.0
    }
}

/// Derives spring constants that settle within `settling_time` seconds with
/// the given fractional `overshoot`.
///
/// The damping ratio is `1 − overshoot` (clamped), so a small overshoot gives
/// near-critical damping. Stiffness grows as the settling time shrinks.
/// Non-positive inputs are replaced by safe minima so the result is always
/// strictly positive.
pub fn design_spring(mass: f64, settling_time: f64, overshoot: f64) -> SpringConfig {
    let mass = positive_or(mass, 1.0);
    let settling_time = positive_or(settling_time, MIN_POSITIVE);
    let overshoot = if overshoot.is_finite() { overshoot } else { 0.0 };

    let zeta = (1.0 - overshoot).clamp(MIN_DAMPING_RATIO, 1.0);
    let natural_frequency = SETTLING_CONSTANT / (zeta * settling_time);
    let stiffness = mass * natural_frequency * natural_frequency;
    let damping = zeta * critical_damping(mass, stiffness);

    SpringConfig {
        mass,
        stiffness: stiffness.max(MIN_POSITIVE),
        damping: damping.max(MIN_POSITIVE),
    }
}

/// A point mass on a spring, for animating a single property such as an
/// indicator position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpringState {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl SpringState {
    pub fn new(position: Vec2) -> Self {
        Self { position, velocity: Vec2::ZERO }
    }

    /// Advances one semi-implicit Euler step towards `target`.
    pub fn step(&mut self, target: Vec2, config: &SpringConfig, dt: f64) {
        let force = spring_force(self.position, target, config, Some(self.velocity));
        let mass = positive_or(config.mass, 1.0);
        self.velocity += force / mass * dt;
        self.position += self.velocity * dt;
    }

    /// True once both the distance to `target` and the speed are within `tolerance`.
    pub fn is_settled(&self, target: Vec2, tolerance: f64) -> bool {
        self.position.distance(target) <= tolerance && self.velocity.magnitude() <= tolerance
    }
}
