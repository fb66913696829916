use crate::error::{PhysicsError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    /// Creates a circle. The radius must be positive and finite.
    pub fn new(radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::geometry(format!(
                "circle radius must be positive, got {}",
                radius
            )));
        }
        Ok(Self { radius })
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_new() {
        let c = Circle::new(5.0).unwrap();
        assert_eq!(c.radius, 5.0);
        assert!((c.area() - 25.0 * std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_circle_rejects_non_positive_radius() {
        assert!(matches!(Circle::new(-1.0), Err(PhysicsError::MalformedGeometry(_))));
        assert!(Circle::new(0.0).is_err());
        assert!(Circle::new(f64::NAN).is_err());
    }
}
