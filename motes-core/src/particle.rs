use glam::Vec3;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide ID counter. Intentionally global: IDs must stay unique
/// across every simulation container in the process.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Hand out a fresh unique ID. IDs are monotonically increasing and never
/// reused; they do not persist across process restarts.
pub fn unique_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a particle owned by a simulation container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleId(pub(crate) u64);

impl ParticleId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A point mass in the simulation.
///
/// Positions and velocities are plain public state; the force field is an
/// accumulator that forces add into during a step and the container zeroes
/// afterwards.
#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,
    pub position: Vec3,
    /// Position at the end of the previous step. Read by the Verlet
    /// integrator and by fixed-particle velocity reconciliation.
    pub old_position: Vec3,
    pub velocity: Vec3,
    /// Force accumulator, zeroed every step.
    pub force: Vec3,
    /// Must stay above zero; divisions by mass are not guarded.
    pub mass: f32,
    /// Cosmetic only, no effect on integration.
    pub radius: f32,
    /// Seconds since creation.
    pub age: f32,
    /// Excluded from integration and from receiving forces.
    pub fixed: bool,
    /// Marked for removal on the next post-step pass.
    pub dead: bool,
    /// Caller-defined marker, no engine semantics.
    pub tagged: bool,
    still: bool,
}

impl Particle {
    pub fn new() -> Self {
        Self {
            id: ParticleId(unique_id()),
            position: Vec3::ZERO,
            old_position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: 1.0,
            radius: 1.0,
            age: 0.0,
            fixed: false,
            dead: false,
            tagged: false,
            still: false,
        }
    }

    /// Create a particle at `position`, with `old_position` matching so the
    /// first Verlet step imparts no spurious velocity.
    pub fn at(position: Vec3) -> Self {
        let mut particle = Self::new();
        particle.position = position;
        particle.old_position = position;
        particle
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Near-zero-velocity hint derived by the container each step when
    /// stillness optimization is enabled. Callers may use it to skip work;
    /// the engine itself never does.
    pub fn still(&self) -> bool {
        self.still
    }

    pub(crate) fn set_still(&mut self, still: bool) {
        self.still = still;
    }

    /// Self-generated force hook, run before external forces each stage.
    /// The base particle contributes nothing.
    pub(crate) fn accumulate_inner_force(&mut self, _dt: f32) {}
}

impl Default for Particle {
    fn default() -> Self {
        Self::new()
    }
}
