use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collision::AABB;
use crate::common::{CollisionFilter, Material};
use crate::error::{PhysicsError, Result};
use crate::math::{Transform, Vec2};
use crate::shapes::{Circle, Point, Polygon, Rectangle, Shape};

/// Layer value that opts a body out of the legacy layer check.
pub const DEFAULT_LAYER: i32 = 0;

/// Stable identifier of a body within one collision system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        BodyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(id: &str) -> Self {
        BodyId(id.to_owned())
    }
}

impl From<String> for BodyId {
    fn from(id: String) -> Self {
        BodyId(id)
    }
}

/// A simulated entity. Position and velocity may be written directly by the
/// caller between steps; the broad phase re-indexes at the next update.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub shape: Shape,

    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians. Orients rectangles and polygons.
    pub rotation: f64,
    pub angular_velocity: f64,

    /// Force accumulated since the last step; cleared by integration.
    pub force: Vec2,

    pub mass: f64,
    /// Static bodies have infinite mass and are never moved by the engine.
    pub is_static: bool,
    pub material: Material,

    pub collision_enabled: bool,
    pub collision_layer: i32,
    pub filter: CollisionFilter,

    /// Caller-owned payload, e.g. the id of the UI element this body drives.
    pub user_data: Option<serde_json::Value>,

    pub(crate) is_sleeping: bool,
    pub(crate) sleep_timer: f64,
}

impl Body {
    /// `0.0` for static bodies.
    pub fn inv_mass(&self) -> f64 {
        if self.is_static {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !self.is_static
    }

    pub fn is_sleeping(&self) -> bool {
        self.is_sleeping
    }

    pub fn wake(&mut self) {
        self.is_sleeping = false;
        self.sleep_timer = 0.0;
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    pub fn momentum(&self) -> Vec2 {
        if self.is_static {
            Vec2::ZERO
        } else {
            self.velocity * self.mass
        }
    }

    /// Adds to the force accumulator. Static bodies ignore forces.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_static {
            return;
        }
        self.force += force;
        self.wake();
    }

    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
    }

    /// World-space bounding box of the shape.
    pub fn aabb(&self) -> AABB {
        let transform = self.transform();
        match self.shape.world_vertices(&transform) {
            Some(vertices) => AABB::from_points(&vertices)
                .unwrap_or_else(|| AABB::new(self.position, self.position)),
            None => {
                let r = self.shape.round_radius().unwrap_or(0.0);
                AABB::from_center(self.position, Vec2::new(r, r))
            }
        }
    }
}

/// Builder describing a body to add to a [`CollisionSystem`](crate::world::CollisionSystem).
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    id: Option<BodyId>,
    shape: Shape,
    position: Vec2,
    velocity: Vec2,
    rotation: f64,
    angular_velocity: f64,
    mass: Option<f64>,
    is_static: bool,
    material: Material,
    collision_enabled: bool,
    collision_layer: i32,
    filter: CollisionFilter,
    user_data: Option<serde_json::Value>,
}

impl BodyDesc {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            id: None,
            shape: shape.into(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            mass: None,
            is_static: false,
            material: Material::default(),
            collision_enabled: true,
            collision_layer: DEFAULT_LAYER,
            filter: CollisionFilter::default(),
            user_data: None,
        }
    }

    pub fn circle(radius: f64) -> Result<Self> {
        Ok(Self::new(Circle::new(radius)?))
    }

    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        Ok(Self::new(Rectangle::new(width, height)?))
    }

    pub fn point() -> Self {
        Self::new(Point::new())
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self> {
        Ok(Self::new(Polygon::new(vertices)?))
    }

    pub fn id(&self) -> Option<&BodyId> {
        self.id.as_ref()
    }

    pub fn with_id(mut self, id: impl Into<BodyId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.material = self.material.with_restitution(restitution);
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.material = self.material.with_friction(friction);
        self
    }

    pub fn with_collision_enabled(mut self, enabled: bool) -> Self {
        self.collision_enabled = enabled;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.collision_layer = layer;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_user_data(mut self, data: serde_json::Value) -> Self {
        self.user_data = Some(data);
        self
    }

    /// Validates the description and produces a body.
    ///
    /// Without an explicit mass the body weighs `density · area`, or `1.0`
    /// for zero-area shapes.
    pub fn build(self) -> Result<Body> {
        self.shape.validate()?;
        let mass = match self.mass {
            Some(m) if m.is_finite() && m > 0.0 => m,
            Some(m) => return Err(PhysicsError::InvalidMass(m)),
            None => {
                let derived = self.shape.area() * self.material.density;
                if derived.is_finite() && derived > 0.0 {
                    derived
                } else {
                    1.0
                }
            }
        };
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(PhysicsError::geometry("body position and velocity must be finite"));
        }

        Ok(Body {
            id: self.id.unwrap_or_else(|| BodyId::from("anonymous")),
            shape: self.shape,
            position: self.position,
            velocity: if self.is_static { Vec2::ZERO } else { self.velocity },
            rotation: self.rotation,
            angular_velocity: if self.is_static { 0.0 } else { self.angular_velocity },
            force: Vec2::ZERO,
            mass,
            is_static: self.is_static,
            material: self.material,
            collision_enabled: self.collision_enabled,
            collision_layer: self.collision_layer,
            filter: self.filter,
            user_data: self.user_data,
            is_sleeping: false,
            sleep_timer: 0.0,
        })
    }
}

/// Partial update for [`CollisionSystem::update_body`](crate::world::CollisionSystem::update_body).
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyUpdate {
    pub position: Option<Vec2>,
    pub velocity: Option<Vec2>,
    pub rotation: Option<f64>,
    pub angular_velocity: Option<f64>,
    pub shape: Option<Shape>,
    pub mass: Option<f64>,
    pub is_static: Option<bool>,
    pub material: Option<Material>,
    pub collision_enabled: Option<bool>,
    pub collision_layer: Option<i32>,
    pub filter: Option<CollisionFilter>,
    pub user_data: Option<Option<serde_json::Value>>,
}

impl BodyUpdate {
    /// Applies the update. Validation happens before any field is written.
    pub(crate) fn apply_to(self, body: &mut Body) -> Result<()> {
        if let Some(m) = self.mass {
            if !(m.is_finite() && m > 0.0) {
                return Err(PhysicsError::InvalidMass(m));
            }
        }
        if let Some(shape) = &self.shape {
            shape.validate()?;
        }
        if let Some(p) = self.position {
            body.position = p;
        }
        if let Some(v) = self.velocity {
            body.velocity = v;
        }
        if let Some(r) = self.rotation {
            body.rotation = r;
        }
        if let Some(w) = self.angular_velocity {
            body.angular_velocity = w;
        }
        if let Some(shape) = self.shape {
            body.shape = shape;
        }
        if let Some(m) = self.mass {
            body.mass = m;
        }
        if let Some(is_static) = self.is_static {
            body.is_static = is_static;
            if is_static {
                body.velocity = Vec2::ZERO;
                body.angular_velocity = 0.0;
                body.force = Vec2::ZERO;
            }
        }
        if let Some(material) = self.material {
            body.material = material;
        }
        if let Some(enabled) = self.collision_enabled {
            body.collision_enabled = enabled;
        }
        if let Some(layer) = self.collision_layer {
            body.collision_layer = layer;
        }
        if let Some(filter) = self.filter {
            body.filter = filter;
        }
        if let Some(data) = self.user_data {
            body.user_data = data;
        }
        body.wake();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_build_circle_with_explicit_mass() {
        let body = BodyDesc::circle(10.0)
            .unwrap()
            .with_id("ball")
            .at(Vec2::new(1.0, 2.0))
            .with_mass(2.0)
            .build()
            .unwrap();
        assert_eq!(body.id.as_str(), "ball");
        assert_eq!(body.mass, 2.0);
        assert!((body.inv_mass() - 0.5).abs() < EPSILON);
        assert!(body.collision_enabled);
        assert_eq!(body.collision_layer, DEFAULT_LAYER);
    }

    #[test]
    fn test_mass_derived_from_density() {
        let body = BodyDesc::rectangle(2.0, 3.0)
            .unwrap()
            .with_material(Material::new(0.5, 0.2, 0.1, 0.0))
            .build()
            .unwrap();
        assert!((body.mass - 3.0).abs() < EPSILON);
        assert_eq!(BodyDesc::point().build().unwrap().mass, 1.0);
    }

    #[test]
    fn test_invalid_mass_rejected() {
        let err = BodyDesc::circle(1.0).unwrap().with_mass(0.0).build().unwrap_err();
        assert_eq!(err, PhysicsError::InvalidMass(0.0));
        assert!(BodyDesc::circle(1.0).unwrap().with_mass(f64::NAN).build().is_err());
    }

    #[test]
    fn test_build_rejects_hand_built_bad_radius() {
        let err = BodyDesc::new(Circle { radius: -5.0 }).build().unwrap_err();
        assert!(matches!(err, PhysicsError::MalformedGeometry(_)));
        assert!(BodyDesc::new(Point { radius: -3.0 }).build().is_err());

        let mut body = BodyDesc::circle(1.0).unwrap().build().unwrap();
        let before = body.clone();
        let update = BodyUpdate {
            shape: Some(Shape::Circle(Circle { radius: 0.0 })),
            ..Default::default()
        };
        assert!(update.apply_to(&mut body).is_err());
        assert_eq!(body, before);
    }

    #[test]
    fn test_static_body_has_zero_inverse_mass() {
        let mut body = BodyDesc::rectangle(10.0, 1.0)
            .unwrap()
            .with_velocity(Vec2::new(5.0, 0.0))
            .static_body()
            .build()
            .unwrap();
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.velocity, Vec2::ZERO);
        body.apply_force(Vec2::new(100.0, 0.0));
        assert_eq!(body.force, Vec2::ZERO);
        assert_eq!(body.momentum(), Vec2::ZERO);
    }

    #[test]
    fn test_aabb_of_rotated_rectangle() {
        let body = BodyDesc::rectangle(2.0, 2.0)
            .unwrap()
            .at(Vec2::new(5.0, 5.0))
            .with_rotation(FRAC_PI_4)
            .build()
            .unwrap();
        let aabb = body.aabb();
        let half_diag = 2.0f64.sqrt();
        assert!((aabb.max.x - (5.0 + half_diag)).abs() < EPSILON);
        assert!((aabb.min.y - (5.0 - half_diag)).abs() < EPSILON);
    }

    #[test]
    fn test_aabb_of_circle() {
        let body = BodyDesc::circle(3.0).unwrap().at(Vec2::new(1.0, 1.0)).build().unwrap();
        let aabb = body.aabb();
        assert_eq!(aabb.min, Vec2::new(-2.0, -2.0));
        assert_eq!(aabb.max, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn test_body_update_applies_fields_and_validates() {
        let mut body = BodyDesc::circle(1.0).unwrap().build().unwrap();
        body.is_sleeping = true;
        BodyUpdate {
            position: Some(Vec2::new(3.0, 4.0)),
            filter: Some(CollisionFilter::in_group(2)),
            user_data: Some(Some(serde_json::json!({"element": "card-1"}))),
            ..Default::default()
        }
        .apply_to(&mut body)
        .unwrap();
        assert_eq!(body.position, Vec2::new(3.0, 4.0));
        assert_eq!(body.filter.group, 2);
        assert_eq!(body.user_data.as_ref().unwrap()["element"], "card-1");
        assert!(!body.is_sleeping());

        let before = body.clone();
        let err = BodyUpdate {
            position: Some(Vec2::new(9.0, 9.0)),
            mass: Some(-1.0),
            ..Default::default()
        }
        .apply_to(&mut body);
        assert!(err.is_err());
        assert_eq!(body, before);
    }

    #[test]
    fn test_body_update_to_static_clears_motion() {
        let mut body = BodyDesc::circle(1.0)
            .unwrap()
            .with_velocity(Vec2::new(1.0, 1.0))
            .build()
            .unwrap();
        BodyUpdate { is_static: Some(true), ..Default::default() }
            .apply_to(&mut body)
            .unwrap();
        assert!(body.is_static);
        assert_eq!(body.velocity, Vec2::ZERO);
    }
}
