//! Kinematics and cooperative scripting for a simulated articulated robot arm.
//!
//! The arm is a serial chain of revolute joints with arbitrary (not necessarily orthogonal)
//! axes and hard angular limits. The crate covers:
//!
//! - Forward kinematics of the chain, including pivot positions and end-effector orientation.
//! - Iterative inverse kinematics (damped cyclic coordinate descent) towards a cartesian target,
//!   with reachability feedback.
//! - Linear, parabolic and cubic spline trajectories between the effector and the target, played
//!   back over time through the IK solver.
//! - A gripper that detects contact with scene objects and carries the gripped object along.
//! - A small script language (`moveLinear`, `moveParabolic`, `moveSpline`, `setJointRotation`,
//!   `wait`, `gripObject`, `releaseObject`, `print`) executed cooperatively, one segment per
//!   frame, with a step mode for debugging.
//!
//! Rendering, input and the object editor are left to the host application, which owns the
//! scene objects and lends them to the engine each frame. See [`workcell::Workcell`] for the
//! per-frame driver.
//!
//! # Units
//!
//! Angles are in degrees everywhere in the public interface. Distances are in world units; the
//! chain descriptor is given in its own units and brought to world units by `scale`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arm_kinematics_sim::log_sink::TracingSink;
//! use arm_kinematics_sim::parameters::ChainParameters;
//! use arm_kinematics_sim::scene::SceneObject;
//! use arm_kinematics_sim::settings::SimulationSettings;
//! use arm_kinematics_sim::workcell::Workcell;
//!
//! let mut cell = Workcell::new(&ChainParameters::desktop_arm(), &SimulationSettings::default(),
//!     Arc::new(TracingSink));
//! cell.load_script("moveParabolic(2.0, 1.0, 1.0)\nsetJointRotation(5, 30)").unwrap();
//! cell.run();
//! let mut scene: Vec<Box<dyn SceneObject>> = Vec::new();
//! for _ in 0..120 {
//!     cell.update(1.0 / 60.0, &mut scene);
//! }
//! ```

pub mod parameters;
pub mod parameters_robots;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;
pub mod parameter_error;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;

pub mod constraints;
pub mod joint;
pub mod chain;

pub mod ik;

pub mod path_plan {
    pub mod trajectory;
    pub mod animation;
}

pub mod log_sink;
pub mod scene;
pub mod collisions;

pub mod scripting {
    pub mod command;
    pub mod parser;
    pub mod session;
}

pub mod settings;
pub mod robot_arm;
pub mod workcell;

#[cfg(test)]
mod tests;
