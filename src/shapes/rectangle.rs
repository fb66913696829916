use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;

/// A rectangle centred on its body's position. Orientation comes from the body's rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::geometry(format!(
                    "rectangle {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(Self { width, height })
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Corners in local space, counter-clockwise starting bottom-left.
    pub fn local_vertices(&self) -> [Vec2; 4] {
        let h = self.half_extents();
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
    }
}
