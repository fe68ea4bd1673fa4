//! Numeric helpers shared by forces, constraints, and integrators.

use glam::Vec3;

use crate::particle::Particle;

pub const ALMOST_THRESHOLD: f32 = 0.001;

/// Approximate inverse square root with one Newton iteration.
/// Bounded relative error, traded for speed in per-particle inner loops.
pub fn fast_inverse_sqrt(v: f32) -> f32 {
    let half = 0.5 * v;
    let i = 0x5f37_5a86u32.wrapping_sub(v.to_bits() >> 1);
    let y = f32::from_bits(i);
    y * (1.5 - half * y * y)
}

pub fn almost(a: f32, b: f32) -> bool {
    (b - a).abs() < ALMOST_THRESHOLD
}

pub fn almost_vec3(a: Vec3, b: Vec3) -> bool {
    almost(a.x, b.x) && almost(a.y, b.y) && almost(a.z, b.z)
}

/// Reflect `v` about `normal`, scaling the normal component by the
/// coefficient of restitution. `normal` must be unit length.
pub fn reflect(v: &mut Vec3, normal: Vec3, coefficient_of_restitution: f32) {
    let normal_component = normal * normal.dot(*v);
    let tangent_component = *v - normal_component;
    *v = tangent_component - normal_component * coefficient_of_restitution;
}

/// Reflect a particle's velocity about a face normal. When
/// `update_old_position` is set the previous position is synced to the
/// current one so the following Verlet step does not re-derive the
/// pre-bounce velocity.
pub(crate) fn reflect_velocity(
    particle: &mut Particle,
    normal: Vec3,
    coefficient_of_restitution: f32,
    update_old_position: bool,
) {
    reflect(&mut particle.velocity, normal, coefficient_of_restitution);
    if update_old_position {
        particle.old_position = particle.position;
    }
}
