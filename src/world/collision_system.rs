use std::collections::HashMap;

use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::collision::detection::{detect_collision, detect_shapes};
use crate::collision::events::{CollisionEventTracker, EventFilter, ListenerResult, SubscriptionId};
use crate::collision::resolver::{correct_positions, resolve_collision_with_impulse};
use crate::collision::{CollisionEvent, Contact, SpatialGrid, AABB};
use crate::common::CollisionFilter;
use crate::config::SystemConfig;
use crate::constraints::{get_mutable_body_pair, Constraint, ConstraintId, DistanceConstraint};
use crate::error::{PhysicsError, Result};
use crate::integration::integrator::{integrate_body, update_sleep_state};
use crate::math::vec2::Vec2;
use crate::objects::{Body, BodyDesc, BodyId, BodyUpdate};

/// Owns every body of a scene and advances them one step at a time.
///
/// A step integrates motion, re-indexes the broad phase, detects and resolves
/// contacts, solves constraints and finally emits collision events.
#[derive(Debug)]
pub struct CollisionSystem {
    config: SystemConfig,
    bodies: Vec<Body>,
    index: HashMap<BodyId, usize>,
    grid: SpatialGrid,
    events: CollisionEventTracker,
    constraints: SlotMap<ConstraintId, Box<dyn Constraint>>,
    time: f64,
    next_generated_id: u64,
    last_pair_count: usize,
}

impl CollisionSystem {
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        let grid = SpatialGrid::new(config.cell_size)?;
        debug!(
            "creating collision system: cell_size={}, gravity={:?}, sleeping={}",
            config.cell_size, config.gravity, config.enable_sleeping
        );
        Ok(Self {
            config,
            bodies: Vec::new(),
            index: HashMap::new(),
            grid,
            events: CollisionEventTracker::new(),
            constraints: SlotMap::with_key(),
            time: 0.0,
            next_generated_id: 0,
            last_pair_count: 0,
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn set_restitution_override(&mut self, restitution: Option<f64>) {
        self.config.restitution_override = restitution;
    }

    // --- Bodies --- //

    /// Adds a body and returns its id. Bodies without an id get `body-<n>`.
    pub fn add_body(&mut self, desc: BodyDesc) -> Result<BodyId> {
        let id = match desc.id() {
            Some(id) if self.index.contains_key(id) => {
                warn!("body id {} is already in use", id);
                return Err(PhysicsError::DuplicateBody(id.clone()));
            }
            Some(id) => id.clone(),
            None => self.generate_id(),
        };
        let body = desc.with_id(id.clone()).build()?;
        debug!(
            "adding body {} at {:?} (static: {}, mass: {})",
            id, body.position, body.is_static, body.mass
        );

        self.index.insert(id.clone(), self.bodies.len());
        self.bodies.push(body);
        Ok(id)
    }

    fn generate_id(&mut self) -> BodyId {
        loop {
            self.next_generated_id += 1;
            let id = BodyId::new(format!("body-{}", self.next_generated_id));
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    /// Removes a body together with its pair state, its constraints and the
    /// subscriptions filtered on it. No End event is emitted for its pairs.
    pub fn remove_body(&mut self, id: &BodyId) -> Option<Body> {
        let slot = self.index.remove(id)?;
        let body = self.bodies.swap_remove(slot);
        if let Some(moved) = self.bodies.get(slot) {
            self.index.insert(moved.id.clone(), slot);
        }

        self.events.forget_body(id);
        let constraints_before = self.constraints.len();
        self.constraints.retain(|_, constraint| !constraint.involves(id));
        debug!(
            "removed body {} ({} constraints dropped)",
            id,
            constraints_before - self.constraints.len()
        );
        Some(body)
    }

    /// Removes every body and constraint. Subscriptions are kept.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.index.clear();
        self.constraints.clear();
        self.grid.clear();
        self.events.reset_pairs();
        self.last_pair_count = 0;
        debug!("cleared collision system");
    }

    pub fn get_body(&self, id: &BodyId) -> Option<&Body> {
        self.index.get(id).and_then(|&slot| self.bodies.get(slot))
    }

    /// Direct mutable access. Changes are picked up at the next step.
    pub fn get_body_mut(&mut self, id: &BodyId) -> Option<&mut Body> {
        let slot = *self.index.get(id)?;
        self.bodies.get_mut(slot)
    }

    fn body_or_warn(&mut self, id: &BodyId) -> Result<&mut Body> {
        match self.index.get(id).copied() {
            Some(slot) => self
                .bodies
                .get_mut(slot)
                .ok_or_else(|| PhysicsError::InvalidBodyReference(id.clone())),
            None => {
                warn!("no body with id {}", id);
                Err(PhysicsError::InvalidBodyReference(id.clone()))
            }
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains_body(&self, id: &BodyId) -> bool {
        self.index.contains_key(id)
    }

    /// Applies a partial update; the body is woken.
    pub fn update_body(&mut self, id: &BodyId, update: BodyUpdate) -> Result<()> {
        update.apply_to(self.body_or_warn(id)?)
    }

    /// Accumulates a force for the next step and wakes the body.
    pub fn apply_force(&mut self, id: &BodyId, force: Vec2) -> Result<()> {
        self.body_or_warn(id)?.apply_force(force);
        Ok(())
    }

    pub fn set_collision_filter(&mut self, id: &BodyId, filter: CollisionFilter) -> Result<()> {
        self.body_or_warn(id)?.filter = filter;
        Ok(())
    }

    pub fn wake_body(&mut self, id: &BodyId) -> Result<()> {
        self.body_or_warn(id)?.wake();
        Ok(())
    }

    /// Adds four static walls enclosing the rectangle at `(x, y)` with the given
    /// size, in y-down coordinates. Returns ids in the order top, right, bottom, left.
    pub fn create_boundary_walls(
        &mut self,
        prefix: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        thickness: f64,
    ) -> Result<[BodyId; 4]> {
        if ![x, y, width, height, thickness].iter().all(|v| v.is_finite()) {
            return Err(PhysicsError::geometry("boundary walls need finite bounds"));
        }
        if width <= 0.0 || height <= 0.0 || thickness <= 0.0 {
            return Err(PhysicsError::geometry(format!(
                "boundary walls need a positive size, got {}x{} with thickness {}",
                width, height, thickness
            )));
        }
        let t = thickness;
        let sides = [
            ("top", Vec2::new(x + width / 2.0, y - t / 2.0), width + 2.0 * t, t),
            ("right", Vec2::new(x + width + t / 2.0, y + height / 2.0), t, height),
            ("bottom", Vec2::new(x + width / 2.0, y + height + t / 2.0), width + 2.0 * t, t),
            ("left", Vec2::new(x - t / 2.0, y + height / 2.0), t, height),
        ];

        // Validate all four before adding any.
        let mut descs = Vec::with_capacity(sides.len());
        for (side, center, w, h) in sides {
            let id = BodyId::new(format!("{}-{}", prefix, side));
            if self.index.contains_key(&id) {
                warn!("boundary wall {} already exists", id);
                return Err(PhysicsError::DuplicateBody(id));
            }
            descs.push(BodyDesc::rectangle(w, h)?.with_id(id).at(center).static_body());
        }

        let mut ids = Vec::with_capacity(descs.len());
        for desc in descs {
            ids.push(self.add_body(desc)?);
        }
        ids.try_into()
            .map_err(|_| PhysicsError::geometry("expected four boundary walls"))
    }

    // --- Queries --- //

    /// Ids of collidable bodies whose bounding box overlaps `region`.
    pub fn query_region(&mut self, region: &AABB) -> Vec<BodyId> {
        self.rebuild_grid();
        self.grid
            .query_aabb(region)
            .into_iter()
            .filter_map(|slot| self.bodies.get(slot))
            .filter(|body| body.aabb().overlaps(region))
            .map(|body| body.id.clone())
            .collect()
    }

    /// Ids of collidable bodies whose shape contains `point`, e.g. under the pointer.
    pub fn query_point(&mut self, point: Vec2) -> Result<Vec<BodyId>> {
        let probe = BodyDesc::point().at(point).build()?;
        let region = probe.aabb();
        Ok(self
            .query_region(&region)
            .into_iter()
            .filter(|id| self.get_body(id).map_or(false, |body| detect_shapes(&probe, body).collision))
            .collect())
    }

    // --- Constraints --- //

    /// Registers a constraint after checking that both of its bodies exist.
    pub fn add_constraint<C: Constraint + 'static>(&mut self, constraint: C) -> Result<ConstraintId> {
        let (a, b) = constraint.bodies();
        for id in [a, b] {
            if !self.index.contains_key(id) {
                warn!("constraint references missing body {}", id);
                return Err(PhysicsError::InvalidConstraintReference(id.clone()));
            }
        }
        if a == b {
            return Err(PhysicsError::Config(format!("constraint connects body {} to itself", a)));
        }
        Ok(self.constraints.insert(Box::new(constraint)))
    }

    /// Links two body centres. Without `distance`, their current separation is kept.
    pub fn add_distance_constraint(
        &mut self,
        body_a: &BodyId,
        body_b: &BodyId,
        distance: Option<f64>,
    ) -> Result<ConstraintId> {
        let position_of = |id: &BodyId| {
            self.get_body(id)
                .map(|body| body.position)
                .ok_or_else(|| PhysicsError::InvalidConstraintReference(id.clone()))
        };
        let (pos_a, pos_b) = match (position_of(body_a), position_of(body_b)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                warn!("{}", e);
                return Err(e);
            }
        };
        let distance = distance.unwrap_or_else(|| pos_a.distance(pos_b));
        self.add_constraint(DistanceConstraint::new(body_a.clone(), body_b.clone(), distance)?)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> bool {
        self.constraints.remove(id).is_some()
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&dyn Constraint> {
        self.constraints.get(id).map(|c| c.as_ref())
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    // --- Events --- //

    pub fn on_collision<F>(&mut self, listener: F, filter: EventFilter) -> SubscriptionId
    where
        F: FnMut(&CollisionEvent) -> ListenerResult + 'static,
    {
        self.events.on_collision(listener, filter)
    }

    pub fn off_collision(&mut self, id: SubscriptionId) -> bool {
        self.events.off_collision(id)
    }

    /// Pairs currently in contact.
    pub fn active_collision_count(&self) -> usize {
        self.events.active_pair_count()
    }

    /// Broad-phase candidate pairs found by the last step.
    pub fn collision_pair_count(&self) -> usize {
        self.last_pair_count
    }

    /// Simulation time in seconds: the sum of every `dt` stepped so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    // --- Simulation --- //

    /// Advances the simulation by the configured fixed time step.
    pub fn step(&mut self) -> Result<Vec<Contact>> {
        self.update(self.config.time_step)
    }

    /// Advances the simulation by `dt` seconds and returns this step's contacts.
    ///
    /// A failing listener aborts the remaining dispatch and its error is
    /// returned; the physics state of the step is already committed.
    pub fn update(&mut self, dt: f64) -> Result<Vec<Contact>> {
        if !(dt.is_finite() && dt >= 0.0) {
            warn!("rejected time step {}", dt);
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        self.time += dt;

        self.integrate(dt);
        self.rebuild_grid();
        let pairs = self.grid.potential_collision_pairs();
        self.last_pair_count = pairs.len();
        let contacts = self.resolve_pairs(&pairs);
        self.solve_constraints();

        let events = self.events.advance(self.time, &contacts);
        debug!(
            "step t={:.4}: {} bodies, {} candidate pairs, {} contacts, {} events",
            self.time,
            self.bodies.len(),
            self.last_pair_count,
            contacts.len(),
            events.len()
        );
        self.events.dispatch(&events)?;
        Ok(contacts)
    }

    fn integrate(&mut self, dt: f64) {
        if dt == 0.0 {
            return;
        }
        let gravity = self.config.gravity;
        for body in &mut self.bodies {
            integrate_body(body, gravity, dt);
            if self.config.enable_sleeping
                && update_sleep_state(
                    body,
                    dt,
                    self.config.velocity_sleep_threshold,
                    self.config.sleep_time_threshold,
                )
            {
                debug!("body {} fell asleep", body.id);
            }
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (slot, body) in self.bodies.iter().enumerate() {
            if body.collision_enabled {
                self.grid.insert_body(slot, &body.aabb());
            }
        }
    }

    fn resolve_pairs(&mut self, pairs: &[(usize, usize)]) -> Vec<Contact> {
        let percent = self.config.position_correction;
        let slop = self.config.penetration_slop;
        let restitution_override = self.config.restitution_override;
        let mut contacts = Vec::new();

        for &(i, j) in pairs {
            let Some((a, b)) = get_mutable_body_pair(&mut self.bodies, i, j) else {
                continue;
            };
            if a.is_static && b.is_static {
                continue;
            }
            let result = detect_collision(a, b);
            if !result.collision {
                continue;
            }

            wake_on_contact(a, b);
            let impulse = if a.is_sleeping || b.is_sleeping {
                None
            } else {
                let impulse = resolve_collision_with_impulse(a, b, &result, restitution_override);
                correct_positions(a, b, &result, percent, slop);
                impulse.map(|applied| applied.normal)
            };
            trace!(
                "contact {} -> {}: normal {:?}, depth {:?}, impulse {:?}",
                a.id,
                b.id,
                result.normal,
                result.penetration,
                impulse
            );
            contacts.push(Contact {
                body_a: a.id.clone(),
                body_b: b.id.clone(),
                result,
                impulse,
            });
        }
        contacts
    }

    fn solve_constraints(&mut self) {
        if self.constraints.is_empty() {
            return;
        }
        for _ in 0..self.config.constraint_iterations {
            for constraint in self.constraints.values() {
                let (a, b) = constraint.bodies();
                let (Some(&i), Some(&j)) = (self.index.get(a), self.index.get(b)) else {
                    continue;
                };
                if let Some((body_a, body_b)) = get_mutable_body_pair(&mut self.bodies, i, j) {
                    if body_a.is_sleeping && body_b.is_sleeping {
                        continue;
                    }
                    constraint.solve_position(body_a, body_b);
                }
            }
        }
    }
}

/// A sleeping body touched by an awake dynamic body wakes up.
fn wake_on_contact(a: &mut Body, b: &mut Body) {
    let a_active = a.is_dynamic() && !a.is_sleeping;
    let b_active = b.is_dynamic() && !b.is_sleeping;
    if a.is_sleeping && b_active {
        a.wake();
    }
    if b.is_sleeping && a_active {
        b.wake();
    }
}
