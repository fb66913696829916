use thiserror::Error;

use crate::collision::events::{ListenerError, SubscriptionId};
use crate::objects::BodyId;

/// Errors surfaced by the collision system and its constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("no body with id `{0}`")]
    InvalidBodyReference(BodyId),

    #[error("constraint references missing body `{0}`")]
    InvalidConstraintReference(BodyId),

    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("body id `{0}` is already in use")]
    DuplicateBody(BodyId),

    #[error("invalid mass {0}: must be positive and finite")]
    InvalidMass(f64),

    #[error("invalid time step {0}: must be finite and non-negative")]
    InvalidTimeStep(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A collision listener failed. Physics state for the step is already
    /// committed; only the remaining event dispatch was skipped.
    #[error("collision listener {subscription:?} failed: {source}")]
    ListenerFault {
        subscription: SubscriptionId,
        source: ListenerError,
    },
}

impl PhysicsError {
    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        PhysicsError::MalformedGeometry(msg.into())
    }
}

pub type Result<T, E = PhysicsError> = std::result::Result<T, E>;
