//! Canned demo scenes, sized to a 640x480 screen-space coordinate frame
//! with y pointing down.

use glam::Vec3;
use motes_core::{
    Attractor, BoxConstraint, Gravity, Physics, PhysicsError, StableSpringQuad, ViscousDrag,
};

/// A single particle flung sideways while a uniform field pulls it down.
pub fn gravity() -> Physics {
    let mut sim = Physics::new();
    sim.add_force(Gravity::new(Vec3::new(0.0, 30.0, 0.0)));

    let id = sim.make_particle_at(Vec3::new(320.0, 240.0, 0.0));
    if let Some(particle) = sim.particle_mut(id) {
        particle.velocity = Vec3::new(40.0, -120.0, 0.0);
    }
    sim
}

/// A chain of particles hanging from a fixed anchor, connected by springs.
pub fn springs() -> Result<Physics, PhysicsError> {
    let mut sim = Physics::new();
    sim.add_force(Gravity::new(Vec3::new(0.0, 20.0, 0.0)));
    sim.add_force(ViscousDrag::new(0.2));

    let anchor = sim.make_particle_at(Vec3::new(320.0, 60.0, 0.0));
    if let Some(particle) = sim.particle_mut(anchor) {
        particle.fixed = true;
    }

    let mut previous = anchor;
    for link in 1..=8 {
        let next = sim.make_particle_at(Vec3::new(320.0 + link as f32 * 20.0, 60.0, 0.0));
        sim.make_spring_with(previous, next, 50.0, 2.0)?;
        previous = next;
    }
    Ok(sim)
}

/// A grid of drifting particles pulled toward a central attractor.
pub fn attractors() -> Physics {
    let mut sim = Physics::new();
    sim.add_force(ViscousDrag::new(0.5));
    sim.add_force(Attractor::new(Vec3::new(320.0, 240.0, 0.0), 250.0, 400.0));

    for row in 0..6 {
        for col in 0..8 {
            sim.make_particle_at(Vec3::new(
                80.0 + col as f32 * 70.0,
                60.0 + row as f32 * 70.0,
                0.0,
            ));
        }
    }
    sim
}

/// A cross-braced spring quad falling inside a reflecting box.
pub fn quads() -> Result<Physics, PhysicsError> {
    let mut sim = Physics::new();
    sim.add_force(Gravity::new(Vec3::new(0.0, 30.0, 0.0)));
    sim.add_force(ViscousDrag::new(0.1));

    StableSpringQuad::from_positions(
        &mut sim,
        Vec3::new(280.0, 100.0, 0.0),
        Vec3::new(360.0, 100.0, 0.0),
        Vec3::new(360.0, 180.0, 0.0),
        Vec3::new(280.0, 180.0, 0.0),
    )?;

    let mut bounds = BoxConstraint::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(640.0, 480.0, 0.0));
    bounds.coefficient_of_restitution = 0.8;
    sim.add_constraint(bounds);
    Ok(sim)
}
