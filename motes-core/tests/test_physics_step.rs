//! Unit tests for the per-step orchestration of the simulation container

use glam::Vec3;
use motes_core::constraints::{BoxConstraint, Teleporter};
use motes_core::forces::{Gravity, ViscousDrag};
use motes_core::integrators::{Integrator, RungeKutta4};
use motes_core::physics::Physics;
use motes_core::tests::test_helpers::{approx_eq_f32, positions};

#[test]
fn test_zero_dt_step_is_idempotent() {
    let mut sim = Physics::new();
    sim.add_force(Gravity::new(Vec3::new(0.0, 9.81, 0.0)));
    let id = sim.make_particle_at(Vec3::new(1.0, 2.0, 3.0));
    sim.particle_mut(id).unwrap().velocity = Vec3::new(4.0, 5.0, 6.0);

    sim.step(0.0);

    let particle = sim.particle(id).unwrap();
    assert_eq!(particle.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(particle.velocity, Vec3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_zero_dt_step_is_idempotent_under_rk4() {
    let mut sim = Physics::new();
    sim.set_integrator(Integrator::RungeKutta4(RungeKutta4::default()));
    sim.add_force(Gravity::new(Vec3::new(0.0, 9.81, 0.0)));
    let id = sim.make_particle_at(Vec3::new(1.0, 2.0, 3.0));
    sim.particle_mut(id).unwrap().velocity = Vec3::new(4.0, 5.0, 6.0);

    sim.step(0.0);

    let particle = sim.particle(id).unwrap();
    assert_eq!(particle.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(particle.velocity, Vec3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_zero_dt_step_still_prunes_the_dead() {
    let mut sim = Physics::new();
    let doomed = sim.make_particle();
    sim.make_particle();
    sim.particle_mut(doomed).unwrap().dead = true;

    sim.step(0.0);

    assert_eq!(sim.particles().len(), 1);
    assert!(sim.particle(doomed).is_none());
}

#[test]
fn test_dead_particle_is_removed_during_the_step() {
    let mut sim = Physics::new();
    let doomed = sim.make_particle();
    sim.particle_mut(doomed).unwrap().dead = true;

    sim.step(1.0 / 60.0);

    assert!(sim.particles().is_empty());
}

#[test]
fn test_dead_particle_stays_but_is_not_integrated_when_removal_is_off() {
    let mut sim = Physics::new();
    sim.hint_remove_dead = false;
    sim.add_force(Gravity::new(Vec3::new(0.0, 9.81, 0.0)));
    let doomed = sim.make_particle_at(Vec3::new(1.0, 1.0, 1.0));
    {
        let particle = sim.particle_mut(doomed).unwrap();
        particle.dead = true;
        particle.velocity = Vec3::new(5.0, 0.0, 0.0);
    }

    for _ in 0..5 {
        sim.step(0.1);
    }

    let particle = sim.particle(doomed).expect("particle should still exist");
    assert_eq!(particle.position, Vec3::new(1.0, 1.0, 1.0));

    // flipping the hint back on removes it on the next pass
    sim.hint_remove_dead = true;
    sim.step(0.1);
    assert!(sim.particles().is_empty());
}

#[test]
fn test_nan_position_recovers_to_the_previous_position() {
    let mut sim = Physics::new();
    let id = sim.make_particle_at(Vec3::new(1.0, 2.0, 3.0));
    sim.step(1.0 / 60.0);

    sim.particle_mut(id).unwrap().position = Vec3::new(f32::NAN, 2.0, 3.0);
    sim.step(1.0 / 60.0);

    let particle = sim.particle(id).unwrap();
    assert_eq!(particle.position, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_nan_position_and_old_position_recover_to_zero() {
    let mut sim = Physics::new();
    let id = sim.make_particle_at(Vec3::new(1.0, 2.0, 3.0));
    {
        let particle = sim.particle_mut(id).unwrap();
        particle.position = Vec3::splat(f32::NAN);
        particle.old_position = Vec3::splat(f32::NAN);
        particle.velocity = Vec3::new(f32::NAN, 0.0, 0.0);
    }

    sim.step(1.0 / 60.0);

    let particle = sim.particle(id).unwrap();
    assert_eq!(particle.position, Vec3::ZERO);
    assert_eq!(particle.velocity, Vec3::ZERO);
}

#[test]
fn test_nan_propagates_when_recovery_is_off() {
    let mut sim = Physics::new();
    sim.hint_recover_nan = false;
    let id = sim.make_particle_at(Vec3::new(1.0, 2.0, 3.0));
    sim.particle_mut(id).unwrap().position = Vec3::new(f32::NAN, 2.0, 3.0);

    sim.step(1.0 / 60.0);

    assert!(sim.particle(id).unwrap().position.is_nan());
}

#[test]
fn test_sub_stepping_matches_manual_sub_steps() {
    let build = || {
        let mut sim = Physics::new();
        sim.add_force(Gravity::new(Vec3::new(0.0, 10.0, 0.0)));
        sim.add_force(ViscousDrag::new(0.3));
        let id = sim.make_particle_at(Vec3::ZERO);
        sim.particle_mut(id).unwrap().velocity = Vec3::new(3.0, 0.0, 0.0);
        sim
    };

    let dt = 0.1;
    let mut batched = build();
    batched.step_n(dt, 4);

    let mut manual = build();
    for _ in 0..4 {
        manual.step(dt / 4.0);
    }

    assert_eq!(positions(&batched), positions(&manual));
}

#[test]
fn test_fixed_particle_velocity_is_reconciled_from_its_motion() {
    let mut sim = Physics::new();
    let anchor = sim.make_particle_at(Vec3::ZERO);
    sim.particle_mut(anchor).unwrap().fixed = true;
    sim.step(1.0 / 60.0);

    // the caller animates the anchor between steps
    sim.particle_mut(anchor).unwrap().position = Vec3::new(1.0, 0.0, 0.0);
    sim.step(1.0 / 60.0);

    // velocity reports the per-step displacement, for dependent forces
    let particle = sim.particle(anchor).unwrap();
    assert_eq!(particle.velocity, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(particle.old_position, Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_old_position_tracks_position_every_step() {
    let mut sim = Physics::new();
    sim.add_force(Gravity::new(Vec3::new(0.0, 10.0, 0.0)));
    let id = sim.make_particle_at(Vec3::ZERO);

    sim.step(0.1);

    let particle = sim.particle(id).unwrap();
    assert_eq!(particle.old_position, particle.position);
}

#[test]
fn test_constraints_apply_in_insertion_order() {
    // box first clamps to the face, so the teleporter sees an inside
    // position; reversed, the teleporter wraps first
    let run = |box_first: bool| {
        let mut sim = Physics::new();
        let mut bounds = BoxConstraint::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        bounds.reflect = false;
        let teleporter = Teleporter::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        if box_first {
            sim.add_constraint(bounds);
            sim.add_constraint(teleporter);
        } else {
            sim.add_constraint(teleporter);
            sim.add_constraint(bounds);
        }
        let id = sim.make_particle_at(Vec3::new(9.5, 5.0, 5.0));
        sim.particle_mut(id).unwrap().velocity = Vec3::new(10.0, 0.0, 0.0);
        sim.step(0.1);
        sim.particle(id).unwrap().position.x
    };

    assert!(approx_eq_f32(run(true), 10.0, 1e-5));
    assert!(approx_eq_f32(run(false), 0.5, 1e-5));
}

#[test]
fn test_age_is_not_advanced_for_removed_particles_only() {
    let mut sim = Physics::new();
    let survivor = sim.make_particle();
    let doomed = sim.make_particle();
    sim.particle_mut(doomed).unwrap().dead = true;

    sim.step(0.25);

    assert!(approx_eq_f32(sim.particle(survivor).unwrap().age, 0.25, 1e-6));
    assert!(sim.particle(doomed).is_none());
}
