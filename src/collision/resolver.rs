//! Impulse-based collision response and positional correction.

use crate::collision::result::CollisionResult;
use crate::math::vec2::Vec2;
use crate::objects::Body;

/// Below this tangential speed the contact is treated as head-on.
const TANGENT_EPSILON: f64 = 1e-9;

/// Impulse magnitudes applied by [`resolve_collision_with_impulse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    /// Along the collision normal, always `>= 0`.
    pub normal: f64,
    /// Signed friction impulse along the contact tangent.
    pub tangent: f64,
}

/// Applies a normal impulse with restitution, then a Coulomb friction impulse.
///
/// `result.normal` must point from `a` towards `b`. Returns `None` when
/// nothing was applied: no collision, both bodies static, or the bodies are
/// already separating.
///
/// With no relative tangential motion, friction still acts along the left
/// perpendicular of the normal with magnitude `μ·j`.
pub fn resolve_collision_with_impulse(
    a: &mut Body,
    b: &mut Body,
    result: &CollisionResult,
    restitution_override: Option<f64>,
) -> Option<Impulse> {
    let normal = match (result.collision, result.normal) {
        (true, Some(n)) => n,
        _ => return None,
    };

    let inv_mass_a = a.inv_mass();
    let inv_mass_b = b.inv_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum <= 0.0 {
        return None;
    }

    // --- Normal impulse --- //
    let relative_velocity = b.velocity - a.velocity;
    let velocity_along_normal = relative_velocity.dot(normal);
    if velocity_along_normal > 0.0 {
        return None;
    }

    let restitution = restitution_override
        .unwrap_or_else(|| a.material.restitution.min(b.material.restitution))
        .clamp(0.0, 1.0);
    let j = -(1.0 + restitution) * velocity_along_normal / inv_mass_sum;
    apply_impulse(a, b, normal * j);

    // --- Friction impulse --- //
    let mu = (a.material.friction * b.material.friction).sqrt();
    let mut jt = 0.0;
    if mu > 0.0 && j > 0.0 {
        let tangential = relative_velocity - normal * velocity_along_normal;
        let speed = tangential.magnitude();
        let max_friction = mu * j;
        let (tangent, raw) = if speed > TANGENT_EPSILON {
            let tangent = tangential * (1.0 / speed);
            (tangent, -relative_velocity.dot(tangent) / inv_mass_sum)
        } else {
            (normal.perpendicular(), max_friction)
        };
        jt = raw.clamp(-max_friction, max_friction);
        apply_impulse(a, b, tangent * jt);
    }

    Some(Impulse { normal: j, tangent: jt })
}

/// Impulse pushes `b` along `impulse` and `a` the opposite way.
fn apply_impulse(a: &mut Body, b: &mut Body, impulse: Vec2) {
    if !a.is_static {
        a.velocity -= impulse * a.inv_mass();
    }
    if !b.is_static {
        b.velocity += impulse * b.inv_mass();
    }
}

/// Moves overlapping bodies apart along the normal, in proportion to inverse
/// mass. Only the part of the penetration beyond `slop` is corrected, scaled
/// by `percent`.
pub fn correct_positions(a: &mut Body, b: &mut Body, result: &CollisionResult, percent: f64, slop: f64) {
    let (Some(normal), Some(depth)) = (result.normal, result.penetration) else {
        return;
    };
    let inv_mass_a = a.inv_mass();
    let inv_mass_b = b.inv_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum <= 0.0 {
        return;
    }

    let excess = depth - slop;
    if excess <= 0.0 {
        return;
    }
    let correction = normal * (excess / inv_mass_sum * percent);
    if !a.is_static {
        a.position -= correction * inv_mass_a;
    }
    if !b.is_static {
        b.position += correction * inv_mass_b;
    }
}
