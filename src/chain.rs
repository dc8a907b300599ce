//! Hierarchical forward kinematics of a chain of rotational joints

use nalgebra::{Isometry3, Point3, Unit, UnitQuaternion, Vector3};

use crate::constraints::JointLimits;
use crate::joint::Joint;
use crate::kinematic_traits::{EffectorBasis, Joints, Kinematics, Pose, Position};
use crate::parameters::ChainParameters;

/// Owns the joints of the arm and computes their world transforms on demand.
/// Nothing is cached: chains are short and a full forward pass is cheaper than
/// keeping a cache coherent with every setter.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    joints: Vec<Joint>,
    tip: Point3<f64>,
    scale: f64,
    segment_lengths: Vec<f64>,
}

impl KinematicChain {
    /// Creates a new chain at zero angles from the given joint table.
    pub fn new(parameters: &ChainParameters) -> Self {
        let joints: Vec<Joint> = parameters
            .joints
            .iter()
            .map(|p| Joint::new(p.pivot, p.axis, p.limits))
            .collect();
        let segment_lengths = Self::compute_segment_lengths(&joints, &parameters.tip);
        KinematicChain {
            joints,
            tip: parameters.tip,
            scale: parameters.scale,
            segment_lengths,
        }
    }

    fn compute_segment_lengths(joints: &[Joint], tip: &Point3<f64>) -> Vec<f64> {
        joints
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let next = joints.get(i + 1).map(|j| &j.pivot).unwrap_or(tip);
                (next - joint.pivot).norm()
            })
            .collect()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Current angles of all joints, degrees.
    pub fn angles(&self) -> Joints {
        self.joints.iter().map(|j| j.angle).collect()
    }

    pub fn angle(&self, index: usize) -> Option<f64> {
        self.joints.get(index).map(|j| j.angle)
    }

    /// Sets the joint angle as given, in degrees. Out of range indices and non-finite
    /// angles are ignored. Returns true if the joint was updated.
    pub fn set_angle(&mut self, index: usize, degrees: f64) -> bool {
        match self.joints.get_mut(index) {
            Some(joint) if degrees.is_finite() => {
                joint.angle = degrees;
                true
            }
            _ => false,
        }
    }

    /// Like [`Self::set_angle`], but respecting the joint limits.
    pub fn set_angle_limited(&mut self, index: usize, degrees: f64) -> bool {
        match self.joints.get_mut(index) {
            Some(joint) if degrees.is_finite() => {
                joint.set_angle_limited(degrees);
                true
            }
            _ => false,
        }
    }

    /// Sets all angles that are provided. Extra values are ignored.
    pub fn set_angles(&mut self, degrees: &[f64]) {
        for (index, angle) in degrees.iter().enumerate() {
            self.set_angle(index, *angle);
        }
    }

    pub fn limits(&self, index: usize) -> Option<JointLimits> {
        self.joints.get(index).map(|j| j.limits)
    }

    pub fn axis(&self, index: usize) -> Option<Unit<Vector3<f64>>> {
        self.joints.get(index).map(|j| j.axis)
    }

    /// Moves the reference pivot of the joint (the index equal to the joint count moves the tip).
    /// Segment lengths are derived again.
    pub fn set_pivot(&mut self, index: usize, pivot: Point3<f64>) -> bool {
        if index < self.joints.len() {
            self.joints[index].pivot = pivot;
        } else if index == self.joints.len() {
            self.tip = pivot;
        } else {
            return false;
        }
        self.segment_lengths = Self::compute_segment_lengths(&self.joints, &self.tip);
        true
    }

    /// Unscaled reference pivot; the index equal to the joint count is the tip.
    pub fn reference_pivot(&self, index: usize) -> Option<Point3<f64>> {
        if index < self.joints.len() {
            Some(self.joints[index].pivot)
        } else if index == self.joints.len() {
            Some(self.tip)
        } else {
            None
        }
    }

    pub fn tip(&self) -> Point3<f64> {
        self.tip
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }

    /// Distances between consecutive reference pivots, unscaled. One per joint.
    pub fn segment_lengths(&self) -> &[f64] {
        &self.segment_lengths
    }

    /// Maximal reach of the fully extended arm in world units.
    pub fn reach(&self) -> f64 {
        self.segment_lengths.iter().sum::<f64>() * self.scale
    }

    /// Scaled world position of the base pivot.
    pub fn base_position(&self) -> Position {
        let base = self.joints.first().map(|j| j.pivot).unwrap_or(self.tip);
        Position::from(base.coords * self.scale)
    }

    /// World transforms of all joints, base first. The transform of joint `i` is the
    /// product of all rotations from the base through `i`.
    pub fn forward_transforms(&self) -> Vec<Pose> {
        let mut transforms = Vec::with_capacity(self.joints.len());
        let mut transform = Isometry3::identity();
        for joint in &self.joints {
            transform = Self::compose(&transform, joint);
            transforms.push(transform);
        }
        transforms
    }

    /// Applies one joint on top of the transform accumulated by its parents. The rest pose
    /// axis is re-expressed through the parent rotation, as the axis turns with the links
    /// below it.
    fn compose(parent: &Pose, joint: &Joint) -> Pose {
        let pivot = parent.transform_point(&joint.pivot);
        let axis = Unit::new_normalize(parent.transform_vector(&joint.axis));
        let rotation = UnitQuaternion::from_axis_angle(&axis, joint.angle.to_radians());
        Isometry3::rotation_wrt_point(rotation, pivot) * parent
    }

    /// Highest scaled pivot (y coordinate) in the current pose, the tip included.
    pub fn max_pivot_height(&self) -> f64 {
        self.pivot_positions()
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Scaled world positions of all pivots and the tip.
    pub fn pivot_positions(&self) -> Vec<Position> {
        let transforms = self.forward_transforms();
        let mut positions = Vec::with_capacity(self.joints.len() + 1);
        for (i, joint) in self.joints.iter().enumerate() {
            let transform = &transforms[i];
            positions.push(Position::from(transform.transform_point(&joint.pivot).coords * self.scale));
        }
        let last = transforms.last().copied().unwrap_or_else(Isometry3::identity);
        positions.push(Position::from(last.transform_point(&self.tip).coords * self.scale));
        positions
    }

    /// Unit vector from the last joint pivot towards the tip, world frame.
    pub fn end_effector_direction(&self) -> Vector3<f64> {
        let positions = self.pivot_positions();
        let n = positions.len();
        if n < 2 {
            return Vector3::zeros();
        }
        (positions[n - 1] - positions[n - 2])
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Rotation of the end effector relative to the reference pose.
    pub fn end_effector_orientation(&self) -> UnitQuaternion<f64> {
        self.end_effector_basis().rotation()
    }
}

impl Kinematics for KinematicChain {
    fn forward_transform(&self, joint: usize) -> Pose {
        let mut transform = Isometry3::identity();
        for j in self.joints.iter().take(joint + 1) {
            transform = Self::compose(&transform, j);
        }
        transform
    }

    fn pivot_position(&self, pivot: usize) -> Option<Position> {
        let reference = self.reference_pivot(pivot)?;
        // A joint does not move its own pivot, so the transform through the joint itself
        // is as good as the transform of its parent.
        let transform = if pivot == 0 {
            Isometry3::identity()
        } else {
            self.forward_transform(pivot - 1)
        };
        Some(Position::from(transform.transform_point(&reference).coords * self.scale))
    }

    fn end_effector_position(&self) -> Position {
        let transform = match self.joints.len() {
            0 => Isometry3::identity(),
            n => self.forward_transform(n - 1),
        };
        Position::from(transform.transform_point(&self.tip).coords * self.scale)
    }

    fn end_effector_basis(&self) -> EffectorBasis {
        let rotation = match self.joints.len() {
            0 => UnitQuaternion::identity(),
            n => self.forward_transform(n - 1).rotation,
        };
        let forward = rotation * Vector3::x();
        let up = rotation * Vector3::y();
        EffectorBasis {
            forward,
            up,
            side: forward.cross(&up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::assert_position_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_segment_lengths_match_joints() {
        let chain = KinematicChain::new(&ChainParameters::desktop_arm());
        assert_eq!(chain.segment_lengths().len(), chain.joint_count());
        assert!((chain.segment_lengths()[0] - 100.0).abs() < EPS);
        assert!((chain.segment_lengths()[3]).abs() < EPS);
        assert!((chain.segment_lengths()[5] - 88.0).abs() < EPS);
    }

    #[test]
    fn test_zero_angles_identity() {
        for parameters in [ChainParameters::desktop_arm(), ChainParameters::planar_arm()] {
            let chain = KinematicChain::new(&parameters);
            let expected = Position::from(parameters.tip.coords * parameters.scale);
            assert_position_eq(&chain.end_effector_position(), &expected, EPS);
        }
    }

    #[test]
    fn test_planar_elbow() {
        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        // Bending the second joint by 90 degrees swings the upper part of the arm to -x.
        chain.set_angle(1, 90.0);
        assert_position_eq(&chain.end_effector_position(), &Position::new(-2.5, 1.0, 0.0), EPS);
        assert_position_eq(&chain.pivot_position(2).unwrap(), &Position::new(-1.0, 1.0, 0.0), EPS);
    }

    #[test]
    fn test_axis_follows_parent() {
        // Base turns around y, the next joint around z of its own (rotated) frame.
        let mut chain = KinematicChain::new(&ChainParameters::desktop_arm());
        chain.set_scale(1.0);
        chain.set_angle(0, 90.0);
        chain.set_angle(2, 90.0);
        let basis_axis = chain.forward_transform(1).transform_vector(&chain.axis(2).unwrap());
        // z rotated by +90 degrees around y is +x
        assert!((basis_axis - Vector3::x()).norm() < EPS);
        // Shoulder bend now happens in the yz plane rather than in xy.
        let elbow = chain.pivot_position(3).unwrap();
        assert!(elbow.x.abs() < EPS);
        assert!((elbow.y - 350.0).abs() < EPS);
        assert!((elbow.z.abs() - 310.0).abs() < EPS);
    }

    #[test]
    fn test_scale_applied_on_use() {
        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        chain.set_scale(2.0);
        assert_position_eq(&chain.end_effector_position(), &Position::new(0.0, 7.0, 0.0), EPS);
        assert!((chain.reach() - 7.0).abs() < EPS);
        chain.set_scale(-1.0);
        assert_eq!(chain.scale(), 2.0);
    }

    #[test]
    fn test_invalid_indices_ignored() {
        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        assert!(!chain.set_angle(17, 10.0));
        assert!(!chain.set_angle(0, f64::NAN));
        assert!(chain.angle(17).is_none());
        assert!(chain.pivot_position(17).is_none());
        assert_eq!(chain.angles(), vec![0.0; 4]);
    }

    #[test]
    fn test_transforms_agree() {
        let mut chain = KinematicChain::new(&ChainParameters::desktop_arm());
        chain.set_angles(&[10.0, -20.0, 30.0, 40.0, 50.0, 60.0]);
        let all = chain.forward_transforms();
        for (i, transform) in all.iter().enumerate() {
            let single = chain.forward_transform(i);
            assert!((transform.translation.vector - single.translation.vector).norm() < EPS);
            assert!(transform.rotation.angle_to(&single.rotation) < EPS);
        }
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let mut chain = KinematicChain::new(&ChainParameters::desktop_arm());
        chain.set_angles(&[15.0, 25.0, -35.0, 45.0, 55.0, -65.0]);
        let basis = chain.end_effector_basis();
        assert!((basis.forward.norm() - 1.0).abs() < EPS);
        assert!(basis.forward.dot(&basis.up).abs() < EPS);
        let transform = chain.forward_transform(5);
        assert!(chain.end_effector_orientation().angle_to(&transform.rotation) < 1e-6);
    }
}
