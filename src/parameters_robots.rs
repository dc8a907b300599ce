//! Hardcoded joint tables for a few arms

use nalgebra::{Point3, Vector3};

use crate::constraints::JointLimits;
use crate::parameters::{ChainParameters, JointParameters};

fn joint(pivot: [f64; 3], axis: [f64; 3], min: f64, max: f64) -> JointParameters {
    JointParameters {
        pivot: Point3::from(pivot),
        axis: Vector3::from(axis),
        limits: JointLimits::new(min, max),
    }
}

impl ChainParameters {
    /// Six joint desktop arm: rotating base, shoulder, elbow, wrist pitch, wrist roll
    /// and the gripper joint. Pivots are in millimeters of the source model,
    /// `scale` brings them to the world units of the scene (decimeters).
    pub fn desktop_arm() -> Self {
        ChainParameters {
            joints: vec![
                joint([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], -180.0, 180.0), // base
                joint([0.0, 100.0, 0.0], [0.0, 1.0, 0.0], -90.0, 90.0), // turret
                joint([0.0, 350.0, 0.0], [0.0, 0.0, 1.0], -120.0, 120.0), // shoulder
                joint([0.0, 660.0, 0.0], [0.0, 0.0, 1.0], -120.0, 120.0), // elbow
                joint([0.0, 660.0, 0.0], [1.0, 0.0, 0.0], -180.0, 180.0), // forearm roll
                joint([-338.0, 708.0, 0.0], [0.0, 0.0, 1.0], -90.0, 90.0), // gripper
            ],
            tip: Point3::new(-426.0, 708.0, 0.0),
            scale: 0.01,
        }
    }

    /// Three links of unit length stacked vertically, all rotating around z, plus a
    /// fixed-range gripper joint. Handy for reasoning about results by hand.
    pub fn planar_arm() -> Self {
        ChainParameters {
            joints: vec![
                joint([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], -180.0, 180.0),
                joint([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], -150.0, 150.0),
                joint([0.0, 2.0, 0.0], [0.0, 0.0, 1.0], -150.0, 150.0),
                joint([0.0, 3.0, 0.0], [0.0, 0.0, 1.0], -90.0, 90.0),
            ],
            tip: Point3::new(0.0, 3.5, 0.0),
            scale: 1.0,
        }
    }
}
