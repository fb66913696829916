pub mod aabb;
pub mod detection;
pub mod events;
pub mod resolver;
pub mod result;
pub mod spatial_grid;

// Re-export key types
pub use aabb::AABB;
pub use detection::{can_interact, detect_collision};
pub use events::{
    CollisionEvent, CollisionEventTracker, CollisionEventType, EventFilter, ListenerError, ListenerResult,
    SubscriptionId,
};
pub use resolver::{correct_positions, resolve_collision_with_impulse, Impulse};
pub use result::{CollisionResult, Contact};
pub use spatial_grid::SpatialGrid;
