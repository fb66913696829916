pub mod circle;
pub mod polygon;
pub mod rectangle;

pub use circle::Circle;
pub use polygon::Polygon;
pub use rectangle::Rectangle;

use crate::error::{PhysicsError, Result};
use crate::math::{Transform, Vec2};

/// Radius below which a [`Point`] is considered a true point.
pub const POINT_RADIUS: f64 = 1e-6;

/// A (near) zero-size probe, e.g. a pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub radius: f64,
}

impl Point {
    pub fn new() -> Self {
        Self { radius: POINT_RADIUS }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry of a body in its local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Point(Point),
    Polygon(Polygon),
}

impl Shape {
    /// Re-runs the constructor checks. Shape fields are public, so a shape
    /// built by hand may skip them.
    pub fn validate(&self) -> Result<()> {
        match self {
            Shape::Circle(c) => Circle::new(c.radius).map(drop),
            Shape::Rectangle(r) => Rectangle::new(r.width, r.height).map(drop),
            Shape::Point(p) if p.radius.is_finite() && p.radius > 0.0 => Ok(()),
            Shape::Point(p) => Err(PhysicsError::geometry(format!(
                "point radius must be positive, got {}",
                p.radius
            ))),
            // Polygons can only be built through `Polygon::new`.
            Shape::Polygon(_) => Ok(()),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Shape::Circle(c) => c.area(),
            Shape::Rectangle(r) => r.area(),
            Shape::Point(_) => 0.0,
            Shape::Polygon(p) => p.area(),
        }
    }

    /// Radius if the shape behaves as a circle in narrow phase.
    pub fn round_radius(&self) -> Option<f64> {
        match self {
            Shape::Circle(c) => Some(c.radius),
            Shape::Point(p) => Some(p.radius),
            Shape::Rectangle(_) | Shape::Polygon(_) => None,
        }
    }

    /// World-space outline of polygonal shapes; `None` for round ones.
    pub fn world_vertices(&self, transform: &Transform) -> Option<Vec<Vec2>> {
        match self {
            Shape::Rectangle(r) => Some(r.local_vertices().iter().map(|v| transform.apply(*v)).collect()),
            Shape::Polygon(p) => Some(p.vertices().iter().map(|v| transform.apply(*v)).collect()),
            Shape::Circle(_) | Shape::Point(_) => None,
        }
    }

    /// Edge normals of polygonal shapes rotated into world space.
    pub fn world_axes(&self, transform: &Transform) -> Vec<Vec2> {
        match self {
            // Opposite edges share an axis.
            Shape::Rectangle(_) => vec![transform.rotate(Vec2::X), transform.rotate(Vec2::Y)],
            Shape::Polygon(p) => p.edge_normals().into_iter().map(|n| transform.rotate(n)).collect(),
            Shape::Circle(_) | Shape::Point(_) => Vec::new(),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Rectangle> for Shape {
    fn from(r: Rectangle) -> Self {
        Shape::Rectangle(r)
    }
}

impl From<Point> for Shape {
    fn from(p: Point) -> Self {
        Shape::Point(p)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}
