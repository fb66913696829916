use std::fmt;

use slotmap::new_key_type;

use crate::objects::{Body, BodyId};

pub mod distance_constraint;

// Re-export the constraint types for easier access
pub use distance_constraint::DistanceConstraint;

new_key_type! {
    /// Handle of a constraint registered with a collision system.
    pub struct ConstraintId;
}

/// A positional constraint between two bodies, solved after collision response.
pub trait Constraint: fmt::Debug {
    /// The bodies this constraint connects, in solve order.
    fn bodies(&self) -> (&BodyId, &BodyId);

    /// Adjusts body positions towards satisfying the constraint.
    fn solve_position(&self, body_a: &mut Body, body_b: &mut Body);

    fn involves(&self, id: &BodyId) -> bool {
        let (a, b) = self.bodies();
        a == id || b == id
    }
}

/// Mutable references to two distinct bodies of a slice.
/// Returns `None` if the indices are equal or out of bounds.
pub(crate) fn get_mutable_body_pair(bodies: &mut [Body], idx_a: usize, idx_b: usize) -> Option<(&mut Body, &mut Body)> {
    if idx_a == idx_b || idx_a >= bodies.len() || idx_b >= bodies.len() {
        return None;
    }

    // Ensure a < b for split_at_mut
    if idx_a < idx_b {
        let (slice_a, slice_b) = bodies.split_at_mut(idx_b);
        Some((&mut slice_a[idx_a], &mut slice_b[0]))
    } else {
        let (slice_b, slice_a) = bodies.split_at_mut(idx_a);
        Some((&mut slice_a[0], &mut slice_b[idx_b]))
    }
}
