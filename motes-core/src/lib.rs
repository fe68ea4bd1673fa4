pub mod composites;
pub mod constraints;
pub mod forces;
pub mod integrators;
pub mod particle;
pub mod physics;
pub mod util;

pub use composites::StableSpringQuad;
pub use constraints::{BoxConstraint, Constraint, ConstraintId, ConstraintKind, Teleporter};
pub use forces::{
    Attractor, Force, ForceId, ForceKind, Gravity, Spring, ViscousDrag, DEFAULT_SPRING_CONSTANT,
    DEFAULT_SPRING_DAMPING,
};
pub use integrators::{Integrator, Midpoint, RungeKutta4, Verlet};
pub use particle::{Particle, ParticleId};
pub use physics::{Physics, PhysicsError, EPSILON};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
