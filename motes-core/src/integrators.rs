//! Fixed-step integrators advancing particle state by one time increment.
//!
//! Each method drives force application itself, once per stage, so that
//! multi-stage methods see accumulators recomputed from scratch at every
//! trial state. Scratch buffers are resized on every call to tolerate a
//! changing particle population between steps.

use glam::Vec3;

use crate::particle::Particle;
use crate::physics::Physics;

/// State derivative of one particle: dp = velocity, dv = force / mass.
#[derive(Debug, Clone, Copy, Default)]
struct Derivative {
    dp: Vec3,
    dv: Vec3,
}

fn calculate_derivatives(particles: &[Particle], derivatives: &mut Vec<Derivative>) {
    derivatives.resize(particles.len(), Derivative::default());
    for (particle, d) in particles.iter().zip(derivatives.iter_mut()) {
        d.dp = particle.velocity;
        d.dv = particle.force / particle.mass;
    }
}

fn save_state(particles: &[Particle], states: &mut Vec<(Vec3, Vec3)>) {
    states.resize(particles.len(), (Vec3::ZERO, Vec3::ZERO));
    for (particle, state) in particles.iter().zip(states.iter_mut()) {
        *state = (particle.position, particle.velocity);
    }
}

/// The active stepping strategy of a simulation container.
///
/// Exactly one is active at a time; replacing it through
/// [`Physics::set_integrator`] drops the previous instance and its scratch
/// storage.
#[derive(Debug)]
pub enum Integrator {
    Midpoint(Midpoint),
    Verlet(Verlet),
    RungeKutta4(RungeKutta4),
}

impl Integrator {
    /// True when the method dissipates energy through its own damping
    /// factor; drag forces query this (via the container) and skip
    /// themselves to avoid double-damping.
    pub fn intrinsic_damping(&self) -> bool {
        matches!(self, Integrator::Verlet(_))
    }

    /// True when the method derives velocity from the position delta rather
    /// than integrating it explicitly; boundary reflection then has to work
    /// on the previous position.
    pub fn position_based(&self) -> bool {
        matches!(self, Integrator::Verlet(_))
    }

    pub(crate) fn step(&mut self, dt: f32, sim: &mut Physics) {
        match self {
            Integrator::Midpoint(midpoint) => midpoint.step(dt, sim),
            Integrator::Verlet(verlet) => verlet.step(dt, sim),
            Integrator::RungeKutta4(rk4) => rk4.step(dt, sim),
        }
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Integrator::Midpoint(Midpoint::default())
    }
}

/// Two-stage midpoint method (RK2), the default integrator.
///
/// Stage one samples the derivative at the current state and advances to
/// the midpoint; stage two re-samples there and advances the full step
/// from the original state using the midpoint derivative.
#[derive(Debug, Default)]
pub struct Midpoint {
    k1: Vec<Derivative>,
    k2: Vec<Derivative>,
    originals: Vec<(Vec3, Vec3)>,
}

impl Midpoint {
    fn step(&mut self, dt: f32, sim: &mut Physics) {
        sim.apply_forces(dt);
        calculate_derivatives(sim.particles(), &mut self.k1);
        save_state(sim.particles(), &mut self.originals);

        let half_dt = dt * 0.5;
        for (particle, k1) in sim.particles_mut().iter_mut().zip(self.k1.iter()) {
            if !particle.fixed && !particle.dead {
                particle.position += k1.dp * half_dt;
                particle.velocity += k1.dv * half_dt;
            }
        }

        sim.apply_forces(dt);
        calculate_derivatives(sim.particles(), &mut self.k2);

        for ((particle, k2), (position, velocity)) in sim
            .particles_mut()
            .iter_mut()
            .zip(self.k2.iter())
            .zip(self.originals.iter())
        {
            if !particle.fixed && !particle.dead {
                particle.position = *position + k2.dp * dt;
                particle.velocity = *velocity + k2.dv * dt;
            }
        }
    }
}

/// Position-based velocity-Verlet.
///
/// Advances positions from the stored previous position instead of an
/// explicitly integrated velocity; the velocity field is reconstructed as
/// `(position - old_position) / dt` before each update so dependent code
/// still sees an estimate. The damping factor (default 1.0 = no loss)
/// scales the carried-over position delta, damping velocity implicitly.
///
/// Pair with `hint_update_old_position = false` on the container: the
/// end-of-step bookkeeping would otherwise overwrite the previous position
/// this method just stored and zero out the carried delta.
#[derive(Debug)]
pub struct Verlet {
    damping: f32,
}

impl Verlet {
    pub fn new(damping: f32) -> Self {
        Self { damping }
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping;
    }

    fn step(&mut self, dt: f32, sim: &mut Physics) {
        sim.apply_forces(dt);
        for particle in sim.particles_mut() {
            if particle.fixed || particle.dead {
                continue;
            }
            let previous = particle.position;

            particle.velocity = (particle.position - particle.old_position) / dt;

            let accelerated = particle.force / particle.mass * (dt * dt);
            let carried = (particle.position - particle.old_position) * self.damping;
            particle.position += accelerated + carried;

            particle.old_position = previous;
        }
    }
}

impl Default for Verlet {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Classical fourth-order Runge-Kutta.
///
/// Four force evaluations per step: derivatives are sampled at the original
/// state, twice at half-step trial states, and at a full-step trial state,
/// then combined as `dt/6 * (k1 + 2*k2 + 2*k3 + k4)` from the original
/// state for both position and velocity.
#[derive(Debug, Default)]
pub struct RungeKutta4 {
    k1: Vec<Derivative>,
    k2: Vec<Derivative>,
    k3: Vec<Derivative>,
    k4: Vec<Derivative>,
    originals: Vec<(Vec3, Vec3)>,
}

impl RungeKutta4 {
    fn step(&mut self, dt: f32, sim: &mut Physics) {
        save_state(sim.particles(), &mut self.originals);

        sim.apply_forces(dt);
        calculate_derivatives(sim.particles(), &mut self.k1);
        Self::move_to_trial_state(sim, &self.originals, &self.k1, dt * 0.5);

        sim.apply_forces(dt);
        calculate_derivatives(sim.particles(), &mut self.k2);
        Self::move_to_trial_state(sim, &self.originals, &self.k2, dt * 0.5);

        sim.apply_forces(dt);
        calculate_derivatives(sim.particles(), &mut self.k3);
        Self::move_to_trial_state(sim, &self.originals, &self.k3, dt);

        sim.apply_forces(dt);
        calculate_derivatives(sim.particles(), &mut self.k4);

        let sixth_dt = dt / 6.0;
        for (i, particle) in sim.particles_mut().iter_mut().enumerate() {
            if particle.fixed || particle.dead {
                continue;
            }
            let (position, velocity) = self.originals[i];
            let (k1, k2, k3, k4) = (self.k1[i], self.k2[i], self.k3[i], self.k4[i]);
            particle.position = position + (k1.dp + k2.dp * 2.0 + k3.dp * 2.0 + k4.dp) * sixth_dt;
            particle.velocity = velocity + (k1.dv + k2.dv * 2.0 + k3.dv * 2.0 + k4.dv) * sixth_dt;
        }
    }

    /// Place every non-fixed particle at `original + h * derivative` for
    /// the next force evaluation.
    fn move_to_trial_state(
        sim: &mut Physics,
        originals: &[(Vec3, Vec3)],
        derivatives: &[Derivative],
        h: f32,
    ) {
        for (i, particle) in sim.particles_mut().iter_mut().enumerate() {
            if particle.fixed || particle.dead {
                continue;
            }
            let (position, velocity) = originals[i];
            particle.position = position + derivatives[i].dp * h;
            particle.velocity = velocity + derivatives[i].dv * h;
        }
    }
}
