pub mod integrator;
pub mod spring;

pub use integrator::{integrate_body, update_particle, ParticleState};
pub use spring::{design_spring, SpringConfig, SpringState};
