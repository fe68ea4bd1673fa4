//! Boundary constraints, applied after integration.
//!
//! Unlike forces, constraints correct positions and velocities directly.
//! Fixed particles are left alone so externally driven anchors stay where
//! the caller put them.

use glam::Vec3;

use crate::particle::{unique_id, Particle};
use crate::util::{reflect, reflect_velocity};

/// Per-application context handed to every constraint by the container.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext {
    /// True while a position-based integrator (Verlet) is active; boundary
    /// reflection then works on the previous position instead of velocity.
    pub position_based_integrator: bool,
    /// Mirror of the container's old-position bookkeeping hint.
    pub update_old_position: bool,
}

/// Handle to a constraint owned by a simulation container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub(crate) u64);

impl ConstraintId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A registered constraint: shared lifecycle state around one concrete kind.
#[derive(Debug, Clone)]
pub struct Constraint {
    id: ConstraintId,
    active: bool,
    dead: bool,
    kind: ConstraintKind,
}

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    Box(BoxConstraint),
    Teleporter(Teleporter),
}

impl Constraint {
    pub fn new(kind: impl Into<ConstraintKind>) -> Self {
        Self {
            id: ConstraintId(unique_id()),
            active: true,
            dead: false,
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn dead(&self) -> bool {
        self.dead
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ConstraintKind {
        &mut self.kind
    }

    pub(crate) fn apply(&self, particles: &mut [Particle], ctx: &ConstraintContext) {
        match &self.kind {
            ConstraintKind::Box(bounds) => bounds.apply(particles, ctx),
            ConstraintKind::Teleporter(teleporter) => teleporter.apply(particles),
        }
    }
}

/// Face normals indexed by the crossing tag: +x, +y, +z, then the negative
/// faces. The per-axis checks run in this order and the last crossed face
/// wins when a particle leaves through a corner in one step; callers may
/// rely on that exact clamp order.
const NORMALS: [Vec3; 6] = [
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, -1.0, 0.0),
    Vec3::new(0.0, 0.0, -1.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
];

/// Axis-aligned volume that wraps, reflects, or stops particles at its
/// faces.
#[derive(Debug, Clone)]
pub struct BoxConstraint {
    pub min: Vec3,
    pub max: Vec3,
    /// Reflect crossing particles about the face normal; when unset (and
    /// not teleporting) the velocity is zeroed at the boundary instead.
    pub reflect: bool,
    /// Wrap to the opposite face without touching velocity. Takes
    /// precedence over reflection.
    pub teleport: bool,
    pub coefficient_of_restitution: f32,
}

impl BoxConstraint {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            reflect: true,
            teleport: false,
            coefficient_of_restitution: 1.0,
        }
    }

    fn apply(&self, particles: &mut [Particle], ctx: &ConstraintContext) {
        for particle in particles.iter_mut() {
            if particle.fixed {
                continue;
            }
            if self.teleport {
                self.wrap_to_opposite_face(particle);
            } else {
                self.clamp_and_respond(particle, ctx);
            }
        }
    }

    fn wrap_to_opposite_face(&self, particle: &mut Particle) {
        let p = &mut particle.position;
        if p.x > self.max.x {
            p.x = self.min.x;
        }
        if p.y > self.max.y {
            p.y = self.min.y;
        }
        if p.z > self.max.z {
            p.z = self.min.z;
        }
        if p.x < self.min.x {
            p.x = self.max.x;
        }
        if p.y < self.min.y {
            p.y = self.max.y;
        }
        if p.z < self.min.z {
            p.z = self.max.z;
        }
    }

    fn clamp_and_respond(&self, particle: &mut Particle, ctx: &ConstraintContext) {
        let crossed_position = particle.position;
        let mut tag = None;

        let p = &mut particle.position;
        if p.x > self.max.x {
            p.x = self.max.x;
            tag = Some(0);
        }
        if p.y > self.max.y {
            p.y = self.max.y;
            tag = Some(1);
        }
        if p.z > self.max.z {
            p.z = self.max.z;
            tag = Some(2);
        }
        if p.x < self.min.x {
            p.x = self.min.x;
            tag = Some(3);
        }
        if p.y < self.min.y {
            p.y = self.min.y;
            tag = Some(4);
        }
        if p.z < self.min.z {
            p.z = self.min.z;
            tag = Some(5);
        }

        let Some(tag) = tag else {
            return;
        };
        let normal = NORMALS[tag];
        if self.reflect {
            if ctx.position_based_integrator {
                // Position-based: bounce by reflecting the step the particle
                // just took, folded into the previous position.
                let mut step = crossed_position - particle.old_position;
                reflect(&mut step, normal, self.coefficient_of_restitution);
                particle.old_position -= step;
            } else {
                reflect_velocity(
                    particle,
                    normal,
                    self.coefficient_of_restitution,
                    ctx.update_old_position,
                );
            }
        } else {
            particle.velocity = Vec3::ZERO;
        }
    }
}

/// Wrap-around volume: crossing particles are shifted back by the box
/// extent, so they may re-enter partway into the volume rather than exactly
/// at the boundary. Velocity is never touched.
#[derive(Debug, Clone)]
pub struct Teleporter {
    pub min: Vec3,
    pub max: Vec3,
}

impl Teleporter {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    fn apply(&self, particles: &mut [Particle]) {
        let extent = (self.max - self.min).abs();
        for particle in particles.iter_mut() {
            if particle.fixed {
                continue;
            }
            let p = &mut particle.position;
            if p.x > self.max.x {
                p.x -= extent.x;
            }
            if p.y > self.max.y {
                p.y -= extent.y;
            }
            if p.z > self.max.z {
                p.z -= extent.z;
            }
            if p.x < self.min.x {
                p.x += extent.x;
            }
            if p.y < self.min.y {
                p.y += extent.y;
            }
            if p.z < self.min.z {
                p.z += extent.z;
            }
        }
    }
}

impl From<BoxConstraint> for ConstraintKind {
    fn from(constraint: BoxConstraint) -> Self {
        ConstraintKind::Box(constraint)
    }
}

impl From<Teleporter> for ConstraintKind {
    fn from(constraint: Teleporter) -> Self {
        ConstraintKind::Teleporter(constraint)
    }
}
