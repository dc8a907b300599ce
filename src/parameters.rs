//! Defines the chain descriptor: joint table supplied at construction time

use nalgebra::{Point3, Vector3};

use crate::constraints::JointLimits;
use crate::utils::{fmt_point, fmt_vector};

/// One row of the joint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointParameters {
    /// Pivot of the joint in the unscaled reference pose.
    pub pivot: Point3<f64>,

    /// Rotation axis in the reference pose. Normalized when the chain is built.
    pub axis: Vector3<f64>,

    /// Angular limits in degrees.
    pub limits: JointLimits,
}

/// Parameters for the kinematic chain. See [parameters_robots.rs](parameters_robots.rs) for
/// concrete arms.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainParameters {
    /// Joints, base first. The last joint is the gripper joint and is not used by the IK solver.
    pub joints: Vec<JointParameters>,

    /// Terminal pivot (gripper reference point) in the unscaled reference pose.
    pub tip: Point3<f64>,

    /// Uniform scale from the reference pose to world units.
    pub scale: f64,
}

impl ChainParameters {
    /// Convert to string yaml representation (quick viewing, saving edited pivots).
    pub fn to_yaml(&self) -> String {
        let mut yaml = String::from("arm_joints:\n");
        for joint in &self.joints {
            yaml.push_str(&format!(
                "  - pivot: {}\n    axis: {}\n    limits: [{}, {}]\n",
                fmt_point(&joint.pivot),
                fmt_vector(&joint.axis),
                joint.limits.min,
                joint.limits.max
            ));
        }
        yaml.push_str(&format!("arm_tip: {}\narm_scale: {}\n", fmt_point(&self.tip), self.scale));
        yaml
    }
}
