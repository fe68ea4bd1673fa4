//! Force family: per-step contributions into particle force accumulators.
//!
//! Forces compose additively within one step because they only ever write
//! to the accumulator, never to positions or velocities. Fixed particles
//! never receive force.

use glam::Vec3;

use crate::particle::{unique_id, Particle, ParticleId};
use crate::physics::EPSILON;
use crate::util::fast_inverse_sqrt;

/// Per-application context handed to every force by the container.
#[derive(Debug, Clone, Copy)]
pub struct ForceContext {
    /// True while the active integrator damps velocity on its own
    /// (position-based Verlet); drag forces skip themselves then.
    pub integrator_damps_velocity: bool,
}

/// Handle to a force owned by a simulation container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForceId(pub(crate) u64);

impl ForceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A registered force: shared lifecycle state around one concrete kind.
#[derive(Debug, Clone)]
pub struct Force {
    id: ForceId,
    active: bool,
    dead: bool,
    kind: ForceKind,
}

#[derive(Debug, Clone)]
pub enum ForceKind {
    Gravity(Gravity),
    ViscousDrag(ViscousDrag),
    Attractor(Attractor),
    Spring(Spring),
}

impl Force {
    pub fn new(kind: impl Into<ForceKind>) -> Self {
        Self {
            id: ForceId(unique_id()),
            active: true,
            dead: false,
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> ForceId {
        self.id
    }

    /// Inactive forces are skipped entirely during application.
    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    pub fn kind(&self) -> &ForceKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ForceKind {
        &mut self.kind
    }

    /// A force is dead once flagged; a spring is also dead once either
    /// endpoint is dead or no longer present in the particle set. Dead
    /// forces are pruned at the start of the step they are discovered in
    /// and are never applied again.
    pub fn dead(&self, particles: &[Particle]) -> bool {
        if self.dead {
            return true;
        }
        match &self.kind {
            ForceKind::Spring(spring) => spring.endpoint_dead(particles),
            _ => false,
        }
    }

    pub(crate) fn apply(&self, dt: f32, particles: &mut [Particle], ctx: &ForceContext) {
        match &self.kind {
            ForceKind::Gravity(gravity) => gravity.apply(dt, particles),
            ForceKind::ViscousDrag(drag) => drag.apply(dt, particles, ctx),
            ForceKind::Attractor(attractor) => attractor.apply(dt, particles),
            ForceKind::Spring(spring) => spring.apply(dt, particles),
        }
    }
}

/// Uniform field: adds a constant vector to every non-fixed particle's
/// accumulator each step.
#[derive(Debug, Clone)]
pub struct Gravity {
    pub force: Vec3,
}

impl Gravity {
    pub fn new(force: Vec3) -> Self {
        Self { force }
    }

    fn apply(&self, _dt: f32, particles: &mut [Particle]) {
        for particle in particles.iter_mut() {
            if !particle.fixed {
                particle.force += self.force;
            }
        }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 9.81, 0.0))
    }
}

/// Velocity-proportional damping: `-coefficient * velocity`.
#[derive(Debug, Clone)]
pub struct ViscousDrag {
    pub coefficient: f32,
}

impl ViscousDrag {
    pub fn new(coefficient: f32) -> Self {
        Self { coefficient }
    }

    fn apply(&self, _dt: f32, particles: &mut [Particle], ctx: &ForceContext) {
        // Verlet already dissipates through its damping factor; applying
        // drag on top would double-damp.
        if ctx.integrator_damps_velocity {
            return;
        }
        if self.coefficient == 0.0 {
            return;
        }
        for particle in particles.iter_mut() {
            if !particle.fixed {
                particle.force += particle.velocity * -self.coefficient;
            }
        }
    }
}

impl Default for ViscousDrag {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Radius-limited pull (positive strength) or push (negative strength)
/// toward a point, with quadratic falloff toward the radius.
#[derive(Debug, Clone)]
pub struct Attractor {
    pub position: Vec3,
    pub radius: f32,
    pub strength: f32,
}

impl Attractor {
    pub fn new(position: Vec3, radius: f32, strength: f32) -> Self {
        Self {
            position,
            radius,
            strength,
        }
    }

    fn apply(&self, _dt: f32, particles: &mut [Particle]) {
        if self.strength == 0.0 {
            return;
        }
        for particle in particles.iter_mut() {
            if particle.fixed {
                continue;
            }
            let offset = self.position - particle.position;
            // Approximate distance through the inverse square root; the
            // bounded error is accepted for speed.
            let distance = fast_inverse_sqrt(1.0 / offset.length_squared());
            if distance < self.radius {
                let falloff = 1.0 - distance / self.radius;
                let force = falloff * falloff * self.strength;
                particle.force += offset * (force / distance);
            }
        }
    }
}

impl Default for Attractor {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 100.0, 1.0)
    }
}

/// Damped linear connector between two particles.
///
/// Endpoints are handles into the owning container's particle storage; a
/// spring whose endpoint dies or is removed reports itself dead and is
/// pruned before its next application.
#[derive(Debug, Clone)]
pub struct Spring {
    a: ParticleId,
    b: ParticleId,
    pub rest_length: f32,
    pub spring_constant: f32,
    pub damping: f32,
    /// When set, only endpoint B receives the (doubled) force and A is
    /// treated as immovable regardless of its fixed flag.
    pub one_way: bool,
}

pub const DEFAULT_SPRING_CONSTANT: f32 = 2.0;
pub const DEFAULT_SPRING_DAMPING: f32 = 0.1;

impl Spring {
    pub fn new(a: ParticleId, b: ParticleId, spring_constant: f32, damping: f32, rest_length: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            spring_constant,
            damping,
            one_way: false,
        }
    }

    pub fn a(&self) -> ParticleId {
        self.a
    }

    pub fn b(&self) -> ParticleId {
        self.b
    }

    /// Current endpoint distance, or `None` when an endpoint is gone.
    pub fn current_length(&self, particles: &[Particle]) -> Option<f32> {
        let a = particles.iter().find(|p| p.id() == self.a)?;
        let b = particles.iter().find(|p| p.id() == self.b)?;
        Some(a.position.distance(b.position))
    }

    fn endpoint_dead(&self, particles: &[Particle]) -> bool {
        let a = particles.iter().find(|p| p.id() == self.a);
        let b = particles.iter().find(|p| p.id() == self.b);
        match (a, b) {
            (Some(a), Some(b)) => a.dead || b.dead,
            _ => true,
        }
    }

    fn apply(&self, _dt: f32, particles: &mut [Particle]) {
        let Some(ia) = particles.iter().position(|p| p.id() == self.a) else {
            return;
        };
        let Some(ib) = particles.iter().position(|p| p.id() == self.b) else {
            return;
        };
        let a = &particles[ia];
        let b = &particles[ib];
        if a.fixed && b.fixed {
            return;
        }

        let offset = a.position - b.position;
        let length_squared = offset.length_squared();
        // Degenerate spring: no direction to pull along, defined no-op.
        if length_squared < EPSILON * EPSILON {
            return;
        }
        let inverse_length = fast_inverse_sqrt(length_squared);
        let length = 1.0 / inverse_length;
        let direction = offset * inverse_length;

        let spring_force = -self.spring_constant * (length - self.rest_length);
        let relative_velocity = a.velocity - b.velocity;
        let damping_force = -self.damping * direction.dot(relative_velocity);
        let force = direction * (spring_force + damping_force);

        if self.one_way {
            if !particles[ib].fixed {
                particles[ib].force += force * -2.0;
            }
        } else {
            if !particles[ia].fixed {
                particles[ia].force += force;
            }
            if !particles[ib].fixed {
                particles[ib].force -= force;
            }
        }
    }
}

impl From<Gravity> for ForceKind {
    fn from(force: Gravity) -> Self {
        ForceKind::Gravity(force)
    }
}

impl From<ViscousDrag> for ForceKind {
    fn from(force: ViscousDrag) -> Self {
        ForceKind::ViscousDrag(force)
    }
}

impl From<Attractor> for ForceKind {
    fn from(force: Attractor) -> Self {
        ForceKind::Attractor(force)
    }
}

impl From<Spring> for ForceKind {
    fn from(force: Spring) -> Self {
        ForceKind::Spring(force)
    }
}
