use crate::math::vec2::Vec2;
use crate::objects::BodyId;

/// Outcome of a narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionResult {
    pub collision: bool,
    /// Unit normal from the first body towards the second; `None` when not colliding.
    pub normal: Option<Vec2>,
    /// Overlap depth along `normal`; `None` when not colliding.
    pub penetration: Option<f64>,
}

impl CollisionResult {
    pub const NONE: CollisionResult = CollisionResult {
        collision: false,
        normal: None,
        penetration: None,
    };

    pub fn hit(normal: Vec2, penetration: f64) -> Self {
        CollisionResult {
            collision: true,
            normal: Some(normal),
            penetration: Some(penetration),
        }
    }

    /// Same contact seen from the other body.
    pub fn flipped(self) -> Self {
        CollisionResult {
            normal: self.normal.map(|n| -n),
            ..self
        }
    }
}

/// A collision detected during a step, with the bodies it involves.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub result: CollisionResult,
    /// Magnitude of the normal impulse applied, if the resolver acted.
    pub impulse: Option<f64>,
}
