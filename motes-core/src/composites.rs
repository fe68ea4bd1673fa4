//! Prefabricated spring assemblies built through the container factories.

use glam::Vec3;

use crate::forces::ForceId;
use crate::particle::ParticleId;
use crate::physics::{Physics, PhysicsError};

/// Four particles cross-braced by six springs: the four edges plus both
/// diagonals, which keeps the quad from shearing flat.
#[derive(Debug, Clone)]
pub struct StableSpringQuad {
    pub a: ParticleId,
    pub b: ParticleId,
    pub c: ParticleId,
    pub d: ParticleId,
    pub ab: ForceId,
    pub bc: ForceId,
    pub cd: ForceId,
    pub da: ForceId,
    pub ac: ForceId,
    pub bd: ForceId,
}

impl StableSpringQuad {
    /// Create four fresh particles at the corner positions and brace them.
    pub fn from_positions(
        sim: &mut Physics,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        d: Vec3,
    ) -> Result<Self, PhysicsError> {
        let a = sim.make_particle_at(a);
        let b = sim.make_particle_at(b);
        let c = sim.make_particle_at(c);
        let d = sim.make_particle_at(d);
        Self::brace(sim, a, b, c, d, 100.0, 5.0)
    }

    /// Brace four existing particles. Stiffer than the from-positions
    /// variant since caller-supplied corners may start further from rest.
    pub fn from_particles(
        sim: &mut Physics,
        a: ParticleId,
        b: ParticleId,
        c: ParticleId,
        d: ParticleId,
    ) -> Result<Self, PhysicsError> {
        Self::brace(sim, a, b, c, d, 500.0, 5.0)
    }

    fn brace(
        sim: &mut Physics,
        a: ParticleId,
        b: ParticleId,
        c: ParticleId,
        d: ParticleId,
        spring_constant: f32,
        damping: f32,
    ) -> Result<Self, PhysicsError> {
        // Edges, then diagonals; rest lengths come from the current corner
        // distances.
        let ab = sim.make_spring_with(a, b, spring_constant, damping)?;
        let bc = sim.make_spring_with(b, c, spring_constant, damping)?;
        let cd = sim.make_spring_with(c, d, spring_constant, damping)?;
        let da = sim.make_spring_with(d, a, spring_constant, damping)?;
        let ac = sim.make_spring_with(a, c, spring_constant, damping)?;
        let bd = sim.make_spring_with(b, d, spring_constant, damping)?;
        Ok(Self {
            a,
            b,
            c,
            d,
            ab,
            bc,
            cd,
            da,
            ac,
            bd,
        })
    }
}
