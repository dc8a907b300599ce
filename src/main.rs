//! Headless runner: executes a script against the desktop arm (or a chain read from YAML)
//! at a fixed frame time and prints where the arm ended up.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nalgebra::Vector3;
use tracing::{info, warn};

use arm_kinematics_sim::kinematic_traits::{Kinematics, Position};
use arm_kinematics_sim::log_sink::TracingSink;
use arm_kinematics_sim::parameters::ChainParameters;
use arm_kinematics_sim::scene::{SceneBody, SceneObject};
use arm_kinematics_sim::scripting::session::ScriptStatus;
use arm_kinematics_sim::settings::SimulationSettings;
use arm_kinematics_sim::utils::{dump_joints, dump_position};
use arm_kinematics_sim::workcell::Workcell;

#[derive(Parser, Debug)]
#[command(name = "arm-sim", about = "Run an arm script without a window")]
struct Args {
    /// Script to run
    #[arg(long)]
    script: PathBuf,

    /// Chain descriptor (YAML); the built-in desktop arm if not given
    #[arg(long)]
    chain: Option<PathBuf>,

    /// Simulation settings (YAML)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frame time, seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Give up after this much simulated time, seconds
    #[arg(long, default_value_t = 120.0)]
    max_seconds: f64,

    /// Execute in step mode, one segment per frame
    #[arg(long)]
    step: bool,

    /// Place a small box in front of the arm to grip
    #[arg(long)]
    demo: bool,
}

fn demo_scene() -> Vec<Box<dyn SceneObject>> {
    vec![Box::new(SceneBody::cuboid(
        "cube",
        Vector3::new(0.15, 0.15, 0.15),
        Position::new(-3.0, 0.15, 2.0),
    ))]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be positive, got {}", args.dt);
    }

    let parameters = match &args.chain {
        Some(path) => ChainParameters::from_yaml_file(path)
            .with_context(|| format!("Failed to read chain descriptor {}", path.display()))?,
        None => ChainParameters::desktop_arm(),
    };
    let settings = match &args.settings {
        Some(path) => SimulationSettings::from_yaml_file(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?,
        None => SimulationSettings::default(),
    };
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;

    let mut scene = if args.demo { demo_scene() } else { Vec::new() };
    let mut cell = Workcell::new(&parameters, &settings, Arc::new(TracingSink));
    cell.load_script(&source)
        .with_context(|| format!("Script {} does not compile", args.script.display()))?;
    cell.session.set_step_mode(args.step);
    cell.run();

    let mut time = 0.0;
    while cell.session.is_running() || cell.arm.is_animating() {
        if time >= args.max_seconds {
            warn!("Stopping after {} simulated seconds", args.max_seconds);
            cell.stop();
            break;
        }
        cell.update(args.dt, &mut scene);
        if args.step && !cell.arm.is_animating() && cell.session.is_running() {
            cell.step(&mut scene);
        }
        time += args.dt;
    }

    info!("Script {} after {:.2} s", cell.session.status(), time);
    if let Some(error) = cell.session.last_error() {
        warn!("{}", error);
    }
    println!("Joint angles:");
    dump_joints(&cell.arm.chain.angles());
    println!("End effector:");
    dump_position(&cell.arm.chain.end_effector_position());
    for object in &scene {
        println!("Object at:");
        dump_position(&object.position());
    }

    if cell.session.status() == ScriptStatus::Finished {
        Ok(())
    } else {
        bail!("Script did not finish ({})", cell.session.status())
    }
}
