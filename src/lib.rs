//! A small 2D collision and force engine for interactive UI elements.
//!
//! Bodies are added to a [`CollisionSystem`] and advanced with
//! [`CollisionSystem::update`]. The force helpers in [`math::forces`] and the
//! spring tools in [`integration::spring`] can be used on their own.

pub mod collision;
pub mod common;
pub mod config;
pub mod constraints;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use collision::{
    CollisionEvent, CollisionEventType, CollisionResult, Contact, EventFilter, ListenerError, SubscriptionId, AABB,
};
pub use common::{CollisionFilter, Material};
pub use config::SystemConfig;
pub use constraints::{Constraint, ConstraintId, DistanceConstraint};
pub use error::{PhysicsError, Result};
pub use math::{Transform, Vec2};
pub use objects::{Body, BodyDesc, BodyId, BodyUpdate};
pub use shapes::{Circle, Point, Polygon, Rectangle, Shape};
pub use world::CollisionSystem;
