//! Start/Active/End tracking of collision pairs and listener dispatch.

use std::collections::{HashMap, HashSet};
use std::fmt;

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::collision::result::{CollisionResult, Contact};
use crate::error::{PhysicsError, Result};
use crate::objects::BodyId;

new_key_type! {
    /// Handle returned by [`CollisionEventTracker::on_collision`].
    pub struct SubscriptionId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEventType {
    Start,
    Active,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub kind: CollisionEventType,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub result: CollisionResult,
    /// Normal impulse applied this step; always `None` for `End`.
    pub impulse: Option<f64>,
    /// Seconds since the pair started touching; `None` for `Start`.
    pub duration: Option<f64>,
    /// Simulation time of the step that produced the event.
    pub timestamp: f64,
}

impl CollisionEvent {
    pub fn involves(&self, id: &BodyId) -> bool {
        self.body_a == *id || self.body_b == *id
    }

    /// The body on the other side of the pair from `id`.
    pub fn other(&self, id: &BodyId) -> Option<&BodyId> {
        if self.body_a == *id {
            Some(&self.body_b)
        } else if self.body_b == *id {
            Some(&self.body_a)
        } else {
            None
        }
    }
}

/// Failure reported by a collision listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(msg: impl Into<String>) -> Self {
        ListenerError(msg.into())
    }
}

impl From<&str> for ListenerError {
    fn from(msg: &str) -> Self {
        ListenerError(msg.to_owned())
    }
}

impl From<String> for ListenerError {
    fn from(msg: String) -> Self {
        ListenerError(msg)
    }
}

pub type ListenerResult = std::result::Result<(), ListenerError>;

/// Selects which events a listener receives. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub event_type: Option<CollisionEventType>,
    pub body_id: Option<BodyId>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(kind: CollisionEventType) -> Self {
        EventFilter { event_type: Some(kind), body_id: None }
    }

    pub fn for_body(id: impl Into<BodyId>) -> Self {
        EventFilter { event_type: None, body_id: Some(id.into()) }
    }

    pub fn with_type(self, kind: CollisionEventType) -> Self {
        EventFilter { event_type: Some(kind), ..self }
    }

    pub fn matches(&self, event: &CollisionEvent) -> bool {
        let type_ok = self.event_type.map_or(true, |kind| kind == event.kind);
        let body_ok = self.body_id.as_ref().map_or(true, |id| event.involves(id));
        type_ok && body_ok
    }
}

type Listener = Box<dyn FnMut(&CollisionEvent) -> ListenerResult>;

struct Subscription {
    filter: EventFilter,
    listener: Listener,
}

/// Unordered pair key: the smaller id first.
pub type PairKey = (BodyId, BodyId);

pub fn pair_key(a: &BodyId, b: &BodyId) -> PairKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PairState {
    first_seen_at: f64,
    last_seen_at: f64,
    last_result: CollisionResult,
    // Orientation of the last contact, reused for the End event.
    body_a: BodyId,
    body_b: BodyId,
}

/// Per-pair collision state machine plus the subscriber table.
#[derive(Default)]
pub struct CollisionEventTracker {
    pairs: HashMap<PairKey, PairState>,
    subscriptions: SlotMap<SubscriptionId, Subscription>,
}

impl fmt::Debug for CollisionEventTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionEventTracker")
            .field("active_pairs", &self.pairs.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl CollisionEventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. It runs synchronously during dispatch for every
    /// event accepted by `filter`.
    pub fn on_collision<F>(&mut self, listener: F, filter: EventFilter) -> SubscriptionId
    where
        F: FnMut(&CollisionEvent) -> ListenerResult + 'static,
    {
        self.subscriptions.insert(Subscription {
            filter,
            listener: Box::new(listener),
        })
    }

    /// Removes a listener; false if the id was unknown or already removed.
    pub fn off_collision(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(id).is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Pairs currently between Start and End.
    pub fn active_pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_tracking(&self, a: &BodyId, b: &BodyId) -> bool {
        self.pairs.contains_key(&pair_key(a, b))
    }

    /// Contact time of a tracked pair as of the last step it was seen.
    pub fn pair_duration(&self, a: &BodyId, b: &BodyId) -> Option<f64> {
        self.pairs
            .get(&pair_key(a, b))
            .map(|state| state.last_seen_at - state.first_seen_at)
    }

    /// Advances every pair to simulation time `now` given this step's contacts.
    ///
    /// Start and Active events follow contact order; End events for pairs no
    /// longer in contact follow, sorted by pair key.
    pub fn advance(&mut self, now: f64, contacts: &[Contact]) -> Vec<CollisionEvent> {
        let mut events = Vec::with_capacity(contacts.len());
        let mut seen: HashSet<PairKey> = HashSet::with_capacity(contacts.len());

        for contact in contacts {
            let key = pair_key(&contact.body_a, &contact.body_b);
            if !seen.insert(key.clone()) {
                continue;
            }
            let (kind, duration) = match self.pairs.get_mut(&key) {
                Some(state) => {
                    state.last_seen_at = now;
                    state.last_result = contact.result;
                    state.body_a = contact.body_a.clone();
                    state.body_b = contact.body_b.clone();
                    (CollisionEventType::Active, Some(now - state.first_seen_at))
                }
                None => {
                    self.pairs.insert(
                        key,
                        PairState {
                            first_seen_at: now,
                            last_seen_at: now,
                            last_result: contact.result,
                            body_a: contact.body_a.clone(),
                            body_b: contact.body_b.clone(),
                        },
                    );
                    (CollisionEventType::Start, None)
                }
            };
            events.push(CollisionEvent {
                kind,
                body_a: contact.body_a.clone(),
                body_b: contact.body_b.clone(),
                result: contact.result,
                impulse: contact.impulse,
                duration,
                timestamp: now,
            });
        }

        let mut ended: Vec<PairKey> = self.pairs.keys().filter(|k| !seen.contains(*k)).cloned().collect();
        ended.sort();
        for key in ended {
            if let Some(state) = self.pairs.remove(&key) {
                events.push(CollisionEvent {
                    kind: CollisionEventType::End,
                    body_a: state.body_a,
                    body_b: state.body_b,
                    result: state.last_result,
                    impulse: None,
                    duration: Some(now - state.first_seen_at),
                    timestamp: now,
                });
            }
        }
        events
    }

    /// Delivers events to matching listeners, stopping at the first failure.
    pub fn dispatch(&mut self, events: &[CollisionEvent]) -> Result<()> {
        for event in events {
            for (id, subscription) in self.subscriptions.iter_mut() {
                if !subscription.filter.matches(event) {
                    continue;
                }
                if let Err(source) = (subscription.listener)(event) {
                    log::error!(
                        "collision listener {:?} failed on {:?} {}/{}: {}",
                        id, event.kind, event.body_a, event.body_b, source
                    );
                    return Err(PhysicsError::ListenerFault { subscription: id, source });
                }
            }
        }
        Ok(())
    }

    /// Drops pair state involving `id` without emitting End, and removes
    /// subscriptions filtered on that body.
    pub fn forget_body(&mut self, id: &BodyId) {
        self.pairs.retain(|(a, b), _| a != id && b != id);
        self.subscriptions
            .retain(|_, subscription| subscription.filter.body_id.as_ref() != Some(id));
    }

    /// Drops all pair state; subscriptions are kept.
    pub fn reset_pairs(&mut self) {
        self.pairs.clear();
    }
}
