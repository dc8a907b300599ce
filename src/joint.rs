use nalgebra::{Point3, Unit, Vector3};

use crate::constraints::JointLimits;

/// Single rotational degree of freedom of the arm.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Rotation axis in the rest pose, before the hierarchy transform is applied.
    pub axis: Unit<Vector3<f64>>,

    /// Current rotation, degrees
    pub angle: f64,

    /// Pivot in the unscaled reference pose.
    pub pivot: Point3<f64>,

    pub limits: JointLimits,
}

impl Joint {
    /// Joint at zero angle. A degenerate axis falls back to the vertical axis.
    pub fn new(pivot: Point3<f64>, axis: Vector3<f64>, limits: JointLimits) -> Self {
        let axis = Unit::try_new(axis, 1e-12).unwrap_or_else(Vector3::y_axis);
        Joint {
            axis,
            angle: 0.0,
            pivot,
            limits,
        }
    }

    /// Sets the angle, wrapped and clamped into the limits.
    pub fn set_angle_limited(&mut self, degrees: f64) {
        self.angle = self.limits.clamp(degrees);
    }
}
