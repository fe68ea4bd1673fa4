//! Unit tests for viscous drag

use glam::Vec3;
use motes_core::forces::ViscousDrag;
use motes_core::integrators::{Integrator, Verlet};
use motes_core::physics::Physics;
use motes_core::tests::test_helpers::approx_eq_vec3;

const DT: f32 = 1.0 / 60.0;

#[test]
fn test_drag_opposes_velocity() {
    let mut sim = Physics::new();
    let id = sim.make_particle();
    sim.particle_mut(id).unwrap().velocity = Vec3::new(2.0, -4.0, 0.0);
    sim.add_force(ViscousDrag::new(0.5));

    sim.apply_forces(DT);

    let force = sim.particle(id).unwrap().force;
    assert!(approx_eq_vec3(force, Vec3::new(-1.0, 2.0, 0.0), 1e-6));
}

#[test]
fn test_zero_coefficient_is_a_no_op() {
    let mut sim = Physics::new();
    let id = sim.make_particle();
    sim.particle_mut(id).unwrap().velocity = Vec3::new(2.0, 0.0, 0.0);
    sim.add_force(ViscousDrag::new(0.0));

    sim.apply_forces(DT);

    assert_eq!(sim.particle(id).unwrap().force, Vec3::ZERO);
}

#[test]
fn test_drag_skips_fixed_particles() {
    let mut sim = Physics::new();
    let id = sim.make_particle();
    {
        let particle = sim.particle_mut(id).unwrap();
        particle.fixed = true;
        particle.velocity = Vec3::new(2.0, 0.0, 0.0);
    }
    sim.add_force(ViscousDrag::new(0.5));

    sim.apply_forces(DT);

    assert_eq!(sim.particle(id).unwrap().force, Vec3::ZERO);
}

#[test]
fn test_drag_slows_a_free_particle() {
    let mut sim = Physics::new();
    let id = sim.make_particle();
    sim.particle_mut(id).unwrap().velocity = Vec3::new(10.0, 0.0, 0.0);
    sim.add_force(ViscousDrag::new(1.0));

    for _ in 0..60 {
        sim.step(DT);
    }

    let speed = sim.particle(id).unwrap().velocity.length();
    assert!(speed < 10.0 * 0.5, "drag barely slowed the particle: {speed}");
    assert!(speed > 0.0);
}

#[test]
fn test_drag_disables_itself_under_verlet() {
    // Verlet damps through its own factor; drag applying on top would
    // double-damp, so it must become inert
    let run = |with_drag: bool| {
        let mut sim = Physics::new();
        sim.hint_update_old_position = false;
        sim.set_integrator(Integrator::Verlet(Verlet::default()));
        let id = sim.make_particle_at(Vec3::ZERO);
        // seed motion through the position delta, the way Verlet sees it
        sim.particle_mut(id).unwrap().old_position = Vec3::new(-0.1, 0.0, 0.0);
        if with_drag {
            sim.add_force(ViscousDrag::new(5.0));
        }
        for _ in 0..30 {
            sim.step(DT);
        }
        sim.particle(id).unwrap().position
    };

    assert_eq!(run(true), run(false));
}

#[test]
fn test_drag_still_applies_after_leaving_verlet() {
    let mut sim = Physics::new();
    sim.set_integrator(Integrator::Verlet(Verlet::default()));
    let id = sim.make_particle();
    sim.particle_mut(id).unwrap().velocity = Vec3::new(2.0, 0.0, 0.0);
    sim.add_force(ViscousDrag::new(0.5));

    sim.apply_forces(DT);
    assert_eq!(sim.particle(id).unwrap().force, Vec3::ZERO);

    sim.set_integrator(Integrator::default());
    sim.apply_forces(DT);
    assert!(approx_eq_vec3(
        sim.particle(id).unwrap().force,
        Vec3::new(-1.0, 0.0, 0.0),
        1e-6
    ));
}
