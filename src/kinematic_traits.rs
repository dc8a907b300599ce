extern crate nalgebra as na;

use na::{Isometry3, Point3, UnitQuaternion, Vector3};

/// Pose of a chain link or of the end effector, position plus rotation.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5);
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Cartesian position in the scaled world frame (y is up, y = 0 is the ground plane).
pub type Position = Point3<f64>;

/// Joint angles in degrees, base joint first.
pub type Joints = Vec<f64>;

/// How the Cartesian path between the current end effector and the target is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Parabolic,
    Spline,
}

/// Orthonormal basis of the end effector, extracted from the terminal transform.
#[derive(Debug, Clone, Copy)]
pub struct EffectorBasis {
    pub forward: Vector3<f64>,
    pub up: Vector3<f64>,
    pub side: Vector3<f64>,
}

impl EffectorBasis {
    /// Rotation that maps the reference axes (x forward, y up, z side) onto this basis.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let rotation = na::Rotation3::from_basis_unchecked(&[self.forward, self.up, self.side]);
        UnitQuaternion::from_rotation_matrix(&rotation)
    }
}

/// Forward kinematics as seen by the solver, the trajectory generator and the gripper.
pub trait Kinematics {
    /// World transform accumulated from the base joint through `joint`.
    fn forward_transform(&self, joint: usize) -> Pose;

    /// Scaled world position of the pivot of the given joint. The index equal to the
    /// joint count addresses the terminal pivot (the end effector).
    fn pivot_position(&self, pivot: usize) -> Option<Position>;

    /// Scaled world position of the end effector.
    fn end_effector_position(&self) -> Position;

    /// Basis vectors of the end effector in the world frame.
    fn end_effector_basis(&self) -> EffectorBasis;
}
