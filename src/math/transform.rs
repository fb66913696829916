use super::vec2::Vec2;

/// Rigid placement of a body's local frame in the world: rotation first, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Angle in radians.
    pub rotation: f64,
    sin: f64,
    cos: f64,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self { position, rotation, sin, cos }
    }

    pub fn identity() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }

    /// Maps a local-space point to world space.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.rotate(point) + self.position
    }

    /// Maps a world-space point back into local space.
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        self.unrotate(point - self.position)
    }

    /// Rotates a local direction into world space (no translation).
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.cos - v.y * self.sin, v.x * self.sin + v.y * self.cos)
    }

    /// Rotates a world direction into local space (no translation).
    pub fn unrotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.cos + v.y * self.sin, -v.x * self.sin + v.y * self.cos)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_transform_apply_combined() {
        let t = Transform::new(Vec2::new(10.0, 5.0), PI / 2.0);
        // (1,0) rotates to (0,1), then translates to (10,6).
        let tp = t.apply(Vec2::new(1.0, 0.0));
        assert!((tp.x - 10.0).abs() < EPSILON);
        assert!((tp.y - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_transform_inverse_round_trip() {
        let t = Transform::new(Vec2::new(-3.0, 7.5), PI / 3.0);
        let local = Vec2::new(1.5, -2.0);
        let back = t.apply_inverse(t.apply(local));
        assert!((back.x - local.x).abs() < EPSILON);
        assert!((back.y - local.y).abs() < EPSILON);
    }

    #[test]
    fn test_transform_directions_ignore_translation() {
        let t = Transform::new(Vec2::new(100.0, 100.0), PI);
        let d = t.rotate(Vec2::X);
        assert!((d.x + 1.0).abs() < EPSILON);
        assert!(d.y.abs() < EPSILON);
        let u = t.unrotate(d);
        assert!((u.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_transform_identity_is_noop() {
        let p = Vec2::new(5.0, -3.0);
        assert_eq!(Transform::identity().apply(p), p);
        assert_eq!(Transform::default().apply_inverse(p), p);
    }
}
