use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;
use crate::objects::{Body, BodyId};
use super::Constraint;

/// Keeps an anchor point on each of two bodies at a fixed distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConstraint {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Anchor point on body A, in local coordinates.
    pub anchor_a_local: Vec2,
    /// Anchor point on body B, in local coordinates.
    pub anchor_b_local: Vec2,
    /// The target distance to maintain between the anchor points.
    pub distance: f64,
    /// Fraction of the error corrected per solve, in (0, 1].
    pub stiffness: f64,
}

impl DistanceConstraint {
    /// Rigid constraint between the bodies' centres.
    pub fn new(body_a: impl Into<BodyId>, body_b: impl Into<BodyId>, distance: f64) -> Result<Self> {
        if !(distance.is_finite() && distance >= 0.0) {
            return Err(PhysicsError::Config(format!(
                "constraint distance must be finite and non-negative, got {}",
                distance
            )));
        }
        Ok(Self {
            body_a: body_a.into(),
            body_b: body_b.into(),
            anchor_a_local: Vec2::ZERO,
            anchor_b_local: Vec2::ZERO,
            distance,
            stiffness: 1.0,
        })
    }

    pub fn with_anchors(mut self, anchor_a_local: Vec2, anchor_b_local: Vec2) -> Self {
        self.anchor_a_local = anchor_a_local;
        self.anchor_b_local = anchor_b_local;
        self
    }

    /// Softens the constraint. Values outside (0, 1] are clamped.
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = if stiffness.is_finite() { stiffness.clamp(f64::EPSILON, 1.0) } else { 1.0 };
        self
    }

    pub fn anchors_world(&self, body_a: &Body, body_b: &Body) -> (Vec2, Vec2) {
        (
            body_a.position + self.anchor_a_local.rotate(body_a.rotation),
            body_b.position + self.anchor_b_local.rotate(body_b.rotation),
        )
    }
}

impl Constraint for DistanceConstraint {
    fn bodies(&self) -> (&BodyId, &BodyId) {
        (&self.body_a, &self.body_b)
    }

    /// Moves both bodies along the anchor line, in proportion to inverse mass.
    fn solve_position(&self, body_a: &mut Body, body_b: &mut Body) {
        let (anchor_a_world, anchor_b_world) = self.anchors_world(body_a, body_b);

        let delta = anchor_b_world - anchor_a_world;
        let current_dist = delta.magnitude();
        if current_dist < 1e-10 {
            return;
        }

        let error = current_dist - self.distance;
        if error.abs() < 1e-10 {
            return;
        }

        let inv_mass_a = body_a.inv_mass();
        let inv_mass_b = body_b.inv_mass();
        let total_inv_mass = inv_mass_a + inv_mass_b;
        if total_inv_mass == 0.0 {
            return;
        }

        let direction = delta * (1.0 / current_dist);
        let correction_scalar = error / total_inv_mass * self.stiffness;

        if inv_mass_a > 0.0 {
            body_a.position += direction * correction_scalar * inv_mass_a;
        }
        if inv_mass_b > 0.0 {
            body_b.position -= direction * correction_scalar * inv_mass_b;
        }
    }
}
