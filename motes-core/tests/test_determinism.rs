//! Determinism tests - the same scene stepped twice must land in the same
//! state bit for bit

use glam::Vec3;
use motes_core::constraints::BoxConstraint;
use motes_core::forces::{Attractor, Gravity, ViscousDrag};
use motes_core::integrators::{Integrator, RungeKutta4, Verlet};
use motes_core::physics::Physics;
use motes_core::tests::test_helpers::positions;

fn build_scene() -> Physics {
    let mut sim = Physics::new();
    sim.add_force(Gravity::new(Vec3::new(0.0, 9.81, 0.0)));
    sim.add_force(ViscousDrag::new(0.2));
    sim.add_force(Attractor::new(Vec3::new(5.0, 5.0, 0.0), 20.0, 30.0));
    sim.add_constraint(BoxConstraint::new(
        Vec3::new(-10.0, -10.0, -10.0),
        Vec3::new(10.0, 10.0, 10.0),
    ));

    let anchor = sim.make_particle_at(Vec3::new(0.0, -5.0, 0.0));
    sim.particle_mut(anchor).unwrap().fixed = true;

    let mut previous = anchor;
    for link in 1..=4 {
        let next = sim.make_particle_at(Vec3::new(link as f32, -5.0, 0.0));
        sim.make_spring_with(previous, next, 40.0, 1.0)
            .expect("spring creation should succeed");
        previous = next;
    }
    sim
}

fn run(mut sim: Physics, steps: u32) -> Vec<Vec3> {
    for _ in 0..steps {
        sim.step(1.0 / 60.0);
    }
    positions(&sim)
}

#[test]
fn test_midpoint_scene_is_deterministic() {
    let first = run(build_scene(), 120);
    let second = run(build_scene(), 120);
    assert_eq!(first, second);
}

#[test]
fn test_rk4_scene_is_deterministic() {
    let build = || {
        let mut sim = build_scene();
        sim.set_integrator(Integrator::RungeKutta4(RungeKutta4::default()));
        sim
    };
    assert_eq!(run(build(), 120), run(build(), 120));
}

#[test]
fn test_verlet_scene_is_deterministic() {
    let build = || {
        let mut sim = build_scene();
        sim.hint_update_old_position = false;
        sim.set_integrator(Integrator::Verlet(Verlet::new(0.99)));
        sim
    };
    assert_eq!(run(build(), 120), run(build(), 120));
}
