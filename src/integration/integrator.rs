use crate::math::forces::damping_force;
use crate::math::vec2::Vec2;
use crate::objects::Body;

/// Kinematic state of a free particle, independent of any collision system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f64,
    pub angular_velocity: f64,
    pub mass: f64,
    /// Seconds since the particle was spawned.
    pub age: f64,
}

impl ParticleState {
    pub fn new(position: Vec2, mass: f64) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            mass,
            age: 0.0,
        }
    }
}

/// Advances a particle by `dt` using semi-implicit Euler.
///
/// Pure: equal inputs always produce bit-identical outputs. A particle with
/// zero or non-finite mass does not accelerate.
pub fn update_particle(state: &ParticleState, net_force: Vec2, dt: f64) -> ParticleState {
    let acceleration = if state.mass.is_finite() && state.mass > 0.0 {
        net_force / state.mass
    } else {
        Vec2::ZERO
    };
    let velocity = state.velocity + acceleration * dt;
    ParticleState {
        position: state.position + velocity * dt,
        velocity,
        rotation: state.rotation + state.angular_velocity * dt,
        angular_velocity: state.angular_velocity,
        mass: state.mass,
        age: state.age + dt,
    }
}

/// Integrates a body in place: gravity, accumulated force and air resistance.
/// Static and sleeping bodies are left untouched apart from clearing forces.
pub fn integrate_body(body: &mut Body, gravity: Vec2, dt: f64) {
    if body.is_static || body.is_sleeping {
        body.clear_accumulators();
        return;
    }

    // --- Linear Motion --- //
    let drag = damping_force(body.velocity, body.material.air_resistance);
    let net_force = body.force + gravity * body.mass + drag;
    let linear_acceleration = net_force * body.inv_mass();
    body.velocity += linear_acceleration * dt;
    body.position += body.velocity * dt;

    // --- Angular Motion --- //
    body.rotation = wrap_angle(body.rotation + body.angular_velocity * dt);

    body.clear_accumulators();
}

/// Tracks how long a body has been slow and puts it to sleep after
/// `sleep_time_ms`. Returns true if the body fell asleep this call.
pub fn update_sleep_state(body: &mut Body, dt: f64, velocity_threshold: f64, sleep_time_ms: f64) -> bool {
    if body.is_static || body.is_sleeping {
        return false;
    }
    let slow = body.velocity.magnitude() < velocity_threshold
        && body.angular_velocity.abs() < velocity_threshold;
    if !slow {
        body.sleep_timer = 0.0;
        return false;
    }
    body.sleep_timer += dt;
    if body.sleep_timer * 1000.0 >= sleep_time_ms {
        body.is_sleeping = true;
        body.velocity = Vec2::ZERO;
        body.angular_velocity = 0.0;
        return true;
    }
    false
}

/// Wraps an angle in radians to the range [-PI, PI].
fn wrap_angle(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}
