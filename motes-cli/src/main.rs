use clap::{Parser, Subcommand, ValueEnum};
use motes_core::{Integrator, RungeKutta4, Verlet};

mod scenes;

#[derive(Parser)]
#[command(name = "motes")]
#[command(about = "motes - a particle dynamics playground", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a demo scene headlessly and print sampled particle positions
    Run {
        /// Scene to simulate
        #[arg(value_enum)]
        scene: Scene,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 240)]
        steps: u32,
        /// Time increment per frame, in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Sub-steps per frame (for stiff spring scenes)
        #[arg(long, default_value_t = 1)]
        iterations: u32,
        /// Integrator to step with
        #[arg(long, value_enum, default_value = "midpoint")]
        integrator: IntegratorChoice,
        /// Print positions every N frames
        #[arg(long, default_value_t = 30)]
        sample_every: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scene {
    /// A single particle falling under a uniform field
    Gravity,
    /// An anchored chain of spring-connected particles
    Springs,
    /// A particle grid pulled toward a point attractor
    Attractors,
    /// A cross-braced spring quad dropped into a box
    Quads,
}

#[derive(Clone, Copy, ValueEnum)]
enum IntegratorChoice {
    Midpoint,
    Verlet,
    Rk4,
}

impl IntegratorChoice {
    fn build(self) -> Integrator {
        match self {
            IntegratorChoice::Midpoint => Integrator::default(),
            IntegratorChoice::Verlet => Integrator::Verlet(Verlet::default()),
            IntegratorChoice::Rk4 => Integrator::RungeKutta4(RungeKutta4::default()),
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scene,
            steps,
            dt,
            iterations,
            integrator,
            sample_every,
        } => match run_scene(scene, steps, dt, iterations, integrator, sample_every) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn run_scene(
    scene: Scene,
    steps: u32,
    dt: f32,
    iterations: u32,
    integrator: IntegratorChoice,
    sample_every: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = match scene {
        Scene::Gravity => scenes::gravity(),
        Scene::Springs => scenes::springs()?,
        Scene::Attractors => scenes::attractors(),
        Scene::Quads => scenes::quads()?,
    };
    let integrator = integrator.build();
    if integrator.position_based() {
        sim.hint_update_old_position = false;
    }
    sim.set_integrator(integrator);

    print_sample(0, &sim);
    for frame in 1..=steps {
        sim.step_n(dt, iterations);
        if frame % sample_every == 0 {
            print_sample(frame, &sim);
        }
    }
    Ok(())
}

fn print_sample(frame: u32, sim: &motes_core::Physics) {
    for particle in sim.particles() {
        let p = particle.position;
        println!(
            "frame {:5}  particle {:3}  ({:10.4}, {:10.4}, {:10.4})",
            frame,
            particle.id().raw(),
            p.x,
            p.y,
            p.z
        );
    }
}
