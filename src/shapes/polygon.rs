use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;

const DEGENERATE_AREA: f64 = 1e-10;

/// A convex polygon with vertices in the owning body's local frame.
/// Either winding order is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Validates and builds a polygon.
    ///
    /// Rejects fewer than three vertices, non-finite coordinates, zero area
    /// and concave outlines.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::geometry(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::geometry("polygon vertex is not finite"));
        }
        let polygon = Polygon { vertices };
        if polygon.area() < DEGENERATE_AREA {
            return Err(PhysicsError::geometry("polygon has zero area"));
        }
        if !polygon.is_convex() {
            return Err(PhysicsError::geometry("polygon is not convex"));
        }
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            area += self.vertices[i].cross(self.vertices[(i + 1) % n]);
        }
        area / 2.0
    }

    /// Area by the shoelace formula.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Centroid for uniform density, by triangle fan from the first vertex.
    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        let origin = self.vertices[0];
        let mut centroid = Vec2::ZERO;
        let mut signed_area_sum = 0.0;

        for i in 1..(n - 1) {
            let v2 = self.vertices[i];
            let v3 = self.vertices[i + 1];
            let triangle_area = (v2 - origin).cross(v3 - origin) / 2.0;
            signed_area_sum += triangle_area;
            centroid += (origin + v2 + v3) / 3.0 * triangle_area;
        }

        if signed_area_sum.abs() < DEGENERATE_AREA {
            let mut avg = Vec2::ZERO;
            for v in &self.vertices {
                avg += *v;
            }
            avg / n as f64
        } else {
            centroid / signed_area_sum
        }
    }

    /// True when every turn along the outline has the same handedness and the
    /// outline winds around exactly once, which rules out stars like a pentagram.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        let mut sign = 0.0;
        let mut total_turn = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let (incoming, outgoing) = (b - a, c - b);
            let turn = incoming.cross(outgoing);
            total_turn += turn.atan2(incoming.dot(outgoing));
            if turn.abs() < 1e-12 {
                continue;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        (total_turn.abs() - std::f64::consts::TAU).abs() < 1e-6
    }

    /// Unit normals of each edge in local space. Only their axes matter for SAT,
    /// so the winding order does not affect the result.
    pub fn edge_normals(&self) -> Vec<Vec2> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| (self.vertices[(i + 1) % n] - self.vertices[i]).perpendicular().normalize())
            .collect()
    }
}
