//! The simulation container: owns particles, forces, constraints, and the
//! active integrator, and orchestrates one step per call.

use glam::Vec3;
use thiserror::Error;

use crate::constraints::{Constraint, ConstraintContext, ConstraintId, ConstraintKind};
use crate::forces::{
    Force, ForceContext, ForceId, ForceKind, Spring, DEFAULT_SPRING_CONSTANT,
    DEFAULT_SPRING_DAMPING,
};
use crate::integrators::Integrator;
use crate::particle::{Particle, ParticleId};

/// Stillness window: a particle whose squared velocity falls within
/// (-EPSILON, EPSILON) is flagged still.
pub const EPSILON: f32 = 0.001;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("particle index {index} out of bounds (len {len})")]
    ParticleIndexOutOfBounds { index: usize, len: usize },
    #[error("force index {index} out of bounds (len {len})")]
    ForceIndexOutOfBounds { index: usize, len: usize },
    #[error("constraint index {index} out of bounds (len {len})")]
    ConstraintIndexOutOfBounds { index: usize, len: usize },
    #[error("no particle with id {0:?}")]
    UnknownParticle(ParticleId),
}

/// A particle simulation.
///
/// Collections keep insertion order, and insertion order is apply order.
/// That matters when forces or constraints have order-dependent effects,
/// such as a spring reading a box-clamped position.
#[derive(Debug)]
pub struct Physics {
    particles: Vec<Particle>,
    forces: Vec<Force>,
    constraints: Vec<Constraint>,
    integrator: Integrator,
    /// Capability flag of the active integrator, cached so force
    /// application sees it while the integrator itself is borrowed away
    /// during a step.
    integrator_damps_velocity: bool,

    /// Derive the `still` flag from squared velocity each step.
    pub hint_optimize_still: bool,
    /// Replace NaN positions with the previous position (or zero) and NaN
    /// velocities with zero each step.
    pub hint_recover_nan: bool,
    /// Drop entities flagged dead during the step they are discovered in.
    pub hint_remove_dead: bool,
    /// Recompute fixed particles' velocity from their position delta, so
    /// externally animated anchors still report a velocity to dependent
    /// forces.
    pub hint_set_velocity_from_previous_position: bool,
    /// Persist `old_position = position` at the end of every step. Turn
    /// off while a Verlet integrator is active, which manages the
    /// previous-position buffer itself.
    pub hint_update_old_position: bool,
}

impl Physics {
    pub fn new() -> Self {
        let integrator = Integrator::default();
        let integrator_damps_velocity = integrator.intrinsic_damping();
        Self {
            particles: Vec::new(),
            forces: Vec::new(),
            constraints: Vec::new(),
            integrator,
            integrator_damps_velocity,
            hint_optimize_still: true,
            hint_recover_nan: true,
            hint_remove_dead: true,
            hint_set_velocity_from_previous_position: true,
            hint_update_old_position: true,
        }
    }

    // --- particles ---------------------------------------------------------

    /// Create a particle at the origin and register it.
    pub fn make_particle(&mut self) -> ParticleId {
        self.add_particle(Particle::new())
    }

    /// Create a particle at `position`; `old_position` starts equal to it,
    /// so the first Verlet step imparts no spurious velocity.
    pub fn make_particle_at(&mut self, position: Vec3) -> ParticleId {
        self.add_particle(Particle::at(position))
    }

    pub fn make_particle_with_mass(&mut self, position: Vec3, mass: f32) -> ParticleId {
        let mut particle = Particle::at(position);
        particle.mass = mass;
        self.add_particle(particle)
    }

    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        let id = particle.id();
        self.particles.push(particle);
        id
    }

    /// Remove by identity, preserving the order of the remaining particles.
    /// Returns false when the particle was not present.
    pub fn remove_particle(&mut self, id: ParticleId) -> bool {
        let before = self.particles.len();
        self.particles.retain(|p| p.id() != id);
        self.particles.len() != before
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id() == id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.iter_mut().find(|p| p.id() == id)
    }

    pub fn particle_at(&self, index: usize) -> Result<&Particle, PhysicsError> {
        self.particles
            .get(index)
            .ok_or(PhysicsError::ParticleIndexOutOfBounds {
                index,
                len: self.particles.len(),
            })
    }

    /// Clear the caller-defined `tagged` marker on every particle.
    pub fn remove_tags(&mut self) {
        for particle in &mut self.particles {
            particle.tagged = false;
        }
    }

    // --- forces ------------------------------------------------------------

    pub fn add_force(&mut self, kind: impl Into<ForceKind>) -> ForceId {
        let force = Force::new(kind);
        let id = force.id();
        self.forces.push(force);
        id
    }

    /// Connect two registered particles with default stiffness and damping;
    /// the rest length is their current distance.
    pub fn make_spring(&mut self, a: ParticleId, b: ParticleId) -> Result<ForceId, PhysicsError> {
        let rest_length = self.endpoint_distance(a, b)?;
        self.make_spring_full(
            a,
            b,
            DEFAULT_SPRING_CONSTANT,
            DEFAULT_SPRING_DAMPING,
            rest_length,
        )
    }

    /// As [`make_spring`](Self::make_spring), with explicit stiffness and
    /// damping.
    pub fn make_spring_with(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        spring_constant: f32,
        damping: f32,
    ) -> Result<ForceId, PhysicsError> {
        let rest_length = self.endpoint_distance(a, b)?;
        self.make_spring_full(a, b, spring_constant, damping, rest_length)
    }

    pub fn make_spring_full(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        spring_constant: f32,
        damping: f32,
        rest_length: f32,
    ) -> Result<ForceId, PhysicsError> {
        if self.particle(a).is_none() {
            return Err(PhysicsError::UnknownParticle(a));
        }
        if self.particle(b).is_none() {
            return Err(PhysicsError::UnknownParticle(b));
        }
        Ok(self.add_force(Spring::new(a, b, spring_constant, damping, rest_length)))
    }

    fn endpoint_distance(&self, a: ParticleId, b: ParticleId) -> Result<f32, PhysicsError> {
        let pa = self
            .particle(a)
            .ok_or(PhysicsError::UnknownParticle(a))?
            .position;
        let pb = self
            .particle(b)
            .ok_or(PhysicsError::UnknownParticle(b))?
            .position;
        Ok(pa.distance(pb))
    }

    pub fn remove_force(&mut self, id: ForceId) -> bool {
        let before = self.forces.len();
        self.forces.retain(|f| f.id() != id);
        self.forces.len() != before
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn force(&self, id: ForceId) -> Option<&Force> {
        self.forces.iter().find(|f| f.id() == id)
    }

    pub fn force_mut(&mut self, id: ForceId) -> Option<&mut Force> {
        self.forces.iter_mut().find(|f| f.id() == id)
    }

    pub fn force_at(&self, index: usize) -> Result<&Force, PhysicsError> {
        self.forces
            .get(index)
            .ok_or(PhysicsError::ForceIndexOutOfBounds {
                index,
                len: self.forces.len(),
            })
    }

    // --- constraints -------------------------------------------------------

    pub fn add_constraint(&mut self, kind: impl Into<ConstraintKind>) -> ConstraintId {
        let constraint = Constraint::new(kind);
        let id = constraint.id();
        self.constraints.push(constraint);
        id
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> bool {
        let before = self.constraints.len();
        self.constraints.retain(|c| c.id() != id);
        self.constraints.len() != before
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id() == id)
    }

    pub fn constraint_mut(&mut self, id: ConstraintId) -> Option<&mut Constraint> {
        self.constraints.iter_mut().find(|c| c.id() == id)
    }

    pub fn constraint_at(&self, index: usize) -> Result<&Constraint, PhysicsError> {
        self.constraints
            .get(index)
            .ok_or(PhysicsError::ConstraintIndexOutOfBounds {
                index,
                len: self.constraints.len(),
            })
    }

    // --- integrator --------------------------------------------------------

    /// Swap the stepping strategy at runtime. The previous integrator and
    /// its scratch storage are dropped; particle state is untouched.
    pub fn set_integrator(&mut self, integrator: Integrator) {
        self.integrator_damps_velocity = integrator.intrinsic_damping();
        log::debug!(
            "integrator replaced, intrinsic damping: {}",
            self.integrator_damps_velocity
        );
        self.integrator = integrator;
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Capability query used by drag forces: does the active integrator
    /// damp velocity on its own?
    pub fn integrator_damps_velocity(&self) -> bool {
        self.integrator_damps_velocity
    }

    // --- stepping ----------------------------------------------------------

    /// Zero all force accumulators, run the per-particle inner-force hook,
    /// then apply every active, non-dead force in insertion order.
    ///
    /// Integrators call this once per stage; multi-stage methods rely on
    /// accumulators being rebuilt from scratch at each trial state.
    pub fn apply_forces(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.force = Vec3::ZERO;
        }
        for particle in &mut self.particles {
            if !particle.fixed {
                particle.accumulate_inner_force(dt);
            }
        }

        let ctx = ForceContext {
            integrator_damps_velocity: self.integrator_damps_velocity,
        };
        let Physics {
            particles, forces, ..
        } = self;
        for force in forces.iter() {
            if !force.active() || force.dead(particles) {
                continue;
            }
            force.apply(dt, particles, &ctx);
        }
    }

    /// Advance the simulation by one time increment.
    pub fn step(&mut self, dt: f32) {
        if self.hint_remove_dead {
            self.prune_dead_forces();
        }

        // The integrator needs the container mutably while the container
        // owns the integrator; park a default in its slot for the duration.
        let mut integrator = std::mem::take(&mut self.integrator);
        integrator.step(dt, self);
        self.integrator = integrator;

        self.handle_particles(dt);
        self.handle_constraints();
        self.post_handle_particles();
    }

    /// Advance by `iterations` sub-steps of `dt / iterations` each; useful
    /// for stiff spring systems.
    pub fn step_n(&mut self, dt: f32, iterations: u32) {
        let sub_dt = dt / iterations as f32;
        for _ in 0..iterations {
            self.step(sub_dt);
        }
    }

    /// Drop forces discovered dead since the last step, before any of them
    /// could be applied again.
    fn prune_dead_forces(&mut self) {
        let Physics {
            particles, forces, ..
        } = self;
        forces.retain(|force| {
            let dead = force.dead(particles);
            if dead {
                log::debug!("removing dead force {:?}", force.id());
            }
            !dead
        });
    }

    /// Post-integration pass: clear accumulators, age, remove dead
    /// particles, recover NaN state, derive stillness.
    fn handle_particles(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            {
                let particle = &mut self.particles[i];
                particle.force = Vec3::ZERO;
                particle.age += dt;
            }

            if self.hint_remove_dead && self.particles[i].dead {
                let removed = self.particles.remove(i);
                log::debug!("removing dead particle {}", removed.id().raw());
                continue;
            }

            let recover_nan = self.hint_recover_nan;
            let optimize_still = self.hint_optimize_still;
            let particle = &mut self.particles[i];

            if recover_nan {
                if particle.position.is_nan() {
                    log::warn!(
                        "recovering NaN position for particle {}",
                        particle.id().raw()
                    );
                    particle.position = if particle.old_position.is_nan() {
                        Vec3::ZERO
                    } else {
                        particle.old_position
                    };
                }
                if particle.velocity.is_nan() {
                    particle.velocity = Vec3::ZERO;
                }
            }

            if optimize_still {
                let speed_squared = particle.velocity.length_squared();
                particle.set_still(speed_squared > -EPSILON && speed_squared < EPSILON);
            }

            i += 1;
        }
    }

    /// Apply active constraints in insertion order, then drop the ones
    /// flagged dead.
    fn handle_constraints(&mut self) {
        let ctx = ConstraintContext {
            position_based_integrator: self.integrator.position_based(),
            update_old_position: self.hint_update_old_position,
        };
        let remove_dead = self.hint_remove_dead;
        let Physics {
            particles,
            constraints,
            ..
        } = self;

        let mut i = 0;
        while i < constraints.len() {
            let constraint = &constraints[i];
            if constraint.active() {
                constraint.apply(particles, &ctx);
            }
            if remove_dead && constraints[i].dead() {
                constraints.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Reconcile fixed particles' velocity with their position delta and
    /// persist the previous-position buffer for the next step.
    fn post_handle_particles(&mut self) {
        if !self.hint_set_velocity_from_previous_position && !self.hint_update_old_position {
            return;
        }
        for particle in &mut self.particles {
            if self.hint_set_velocity_from_previous_position && particle.fixed {
                particle.velocity = particle.position - particle.old_position;
            }
            if self.hint_update_old_position {
                particle.old_position = particle.position;
            }
        }
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}
