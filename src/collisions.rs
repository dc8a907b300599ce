//! Gripper contact detection and rigid attachment of the gripped object

use std::sync::Arc;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use parry3d::bounding_volume::Aabb;
use parry3d::query::Ray;

use crate::chain::KinematicChain;
use crate::kinematic_traits::{Kinematics, Position};
use crate::log_sink::{LogLevel, LogSink};
use crate::scene::{euler_to_rotation, rotation_to_euler, ObjectHandle, SceneObject};

/// Radial directions of the contact rays, effector-centered.
const RAY_DIRECTIONS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GripperSettings {
    /// Radius of the detection sphere around the end effector, world units.
    pub radius: f64,

    /// Length of the contact rays cast from the end effector, world units.
    pub ray_length: f64,
}

impl Default for GripperSettings {
    fn default() -> Self {
        GripperSettings {
            radius: 0.5,
            ray_length: 0.25,
        }
    }
}

/// Object held by the gripper, with its pose expressed in the end effector frame.
#[derive(Debug, Clone, Copy)]
pub struct Grip {
    pub handle: ObjectHandle,

    /// Object position minus effector position, rotated into the effector frame.
    pub offset: Vector3<f64>,

    /// Object rotation relative to the effector rotation.
    pub rotation: UnitQuaternion<f64>,
}

impl Grip {
    /// Where the object belongs for the given effector position and rotation.
    pub fn pose(&self, effector: &Position, orientation: &UnitQuaternion<f64>) -> (Position, UnitQuaternion<f64>) {
        (effector + orientation * self.offset, orientation * self.rotation)
    }
}

pub struct GripperController {
    pub settings: GripperSettings,
    position: Position,
    colliding: Option<ObjectHandle>,
    grip: Option<Grip>,
    sink: Arc<dyn LogSink>,
}

impl GripperController {
    pub fn new(settings: GripperSettings, sink: Arc<dyn LogSink>) -> Self {
        GripperController {
            settings,
            position: Position::origin(),
            colliding: None,
            grip: None,
            sink,
        }
    }

    /// World position of the gripper as of the last collision check.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_colliding(&self) -> bool {
        self.colliding.is_some()
    }

    /// Object the gripper touches and would grip.
    pub fn colliding_with(&self) -> Option<ObjectHandle> {
        self.colliding
    }

    pub fn is_gripping(&self) -> bool {
        self.grip.is_some()
    }

    pub fn grip(&self) -> Option<&Grip> {
        self.grip.as_ref()
    }

    /// Per-frame contact update. Objects are first tested with a sphere around the effector
    /// against their bounding box, then with a few short rays against their shape. While an
    /// object is held the contact state is frozen, so it does not flip as the object moves along.
    pub fn check_collisions(&mut self, chain: &KinematicChain, scene: &[Box<dyn SceneObject>]) {
        self.position = chain.end_effector_position();
        if self.grip.is_some() {
            return;
        }

        let mut touching = None;
        for (index, object) in scene.iter().enumerate() {
            if !self.sphere_overlaps(object.as_ref()) {
                continue;
            }
            if self.rays_hit(object.as_ref()) {
                touching = Some(ObjectHandle(index));
                break;
            }
        }

        if touching != self.colliding {
            match touching {
                Some(ObjectHandle(index)) => self
                    .sink
                    .add_log(&format!("Gripper touches object {}", index), LogLevel::Info),
                None => self.sink.add_log("Gripper contact lost", LogLevel::Info),
            }
            self.colliding = touching;
        }
    }

    /// World bounding box of the object, scale included.
    fn world_aabb(object: &dyn SceneObject) -> Aabb {
        let local = object.shape().compute_local_aabb();
        let scale = object.scale() as f32;
        let scaled = Aabb::new(local.mins * scale, local.maxs * scale);
        scaled.transform_by(&object.world_transform().cast::<f32>())
    }

    fn sphere_overlaps(&self, object: &dyn SceneObject) -> bool {
        let aabb = Self::world_aabb(object);
        let center = self.position.cast::<f32>();
        let closest = center.coords.sup(&aabb.mins.coords).inf(&aabb.maxs.coords);
        (closest - center.coords).norm() <= self.settings.radius as f32
    }

    /// Casts the radial rays in the object frame. The origin inside the (solid) shape counts as a hit.
    fn rays_hit(&self, object: &dyn SceneObject) -> bool {
        let scale = object.scale() as f32;
        let inverse = object.world_transform().cast::<f32>().inverse();
        let origin = Point3::from(inverse.transform_point(&self.position.cast::<f32>()).coords / scale);
        let max_toi = self.settings.ray_length as f32 / scale;
        RAY_DIRECTIONS.iter().any(|d| {
            let direction = inverse.transform_vector(&Vector3::new(d[0], d[1], d[2]));
            let ray = Ray::new(origin, direction);
            object.shape().cast_local_ray(&ray, max_toi, true).is_some()
        })
    }

    /// Attaches the touched object. Does nothing unless touching and not already gripping.
    /// Returns true if an object was gripped.
    pub fn grip_object(&mut self, chain: &KinematicChain, scene: &[Box<dyn SceneObject>]) -> bool {
        if self.grip.is_some() {
            return false;
        }
        let Some(handle) = self.colliding else {
            return false;
        };
        let Some(object) = scene.get(handle.0) else {
            self.colliding = None;
            return false;
        };

        let effector = chain.end_effector_position();
        let orientation = chain.end_effector_orientation();
        let inverse = orientation.inverse();
        self.grip = Some(Grip {
            handle,
            offset: inverse * (object.position() - effector),
            rotation: inverse * euler_to_rotation(&object.rotation()),
        });
        self.sink
            .add_log(&format!("Object {} gripped", handle.0), LogLevel::Info);
        true
    }

    /// Re-poses the held object under the current effector pose.
    pub fn follow(&mut self, chain: &KinematicChain, scene: &mut [Box<dyn SceneObject>]) {
        let Some(grip) = self.grip else {
            return;
        };
        match scene.get_mut(grip.handle.0) {
            Some(object) => {
                let (position, rotation) =
                    grip.pose(&chain.end_effector_position(), &chain.end_effector_orientation());
                object.set_position(position);
                object.set_rotation(rotation_to_euler(&rotation));
            }
            None => {
                self.sink.add_log(
                    &format!("Gripped object {} is gone, grip dropped", grip.handle.0),
                    LogLevel::Warning,
                );
                self.grip = None;
                self.colliding = None;
            }
        }
    }

    /// Lets go of the held object, which keeps its last pose. Returns false if nothing was held.
    pub fn release_object(&mut self) -> bool {
        match self.grip.take() {
            Some(grip) => {
                self.sink
                    .add_log(&format!("Object {} released", grip.handle.0), LogLevel::Info);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemorySink;
    use crate::parameters::ChainParameters;
    use crate::scene::SceneBody;

    fn scene_at(position: Position) -> Vec<Box<dyn SceneObject>> {
        vec![
            Box::new(SceneBody::ball("far", 0.2, Position::new(50.0, 0.0, 0.0))),
            Box::new(SceneBody::cuboid("box", Vector3::new(0.2, 0.2, 0.2), position)),
        ]
    }

    #[test]
    fn test_detects_touching_box() {
        let chain = KinematicChain::new(&ChainParameters::planar_arm());
        let sink = Arc::new(MemorySink::new());
        let mut gripper = GripperController::new(GripperSettings::default(), sink.clone());
        // Tip is at (0, 3.5, 0), the box top face 0.1 below it
        let scene = scene_at(Position::new(0.0, 3.2, 0.0));
        gripper.check_collisions(&chain, &scene);
        assert_eq!(gripper.colliding_with(), Some(ObjectHandle(1)));
        assert!(sink.contains("touches object 1"));
    }

    #[test]
    fn test_box_in_sphere_but_not_touching() {
        let chain = KinematicChain::new(&ChainParameters::planar_arm());
        let mut gripper = GripperController::new(GripperSettings::default(), Arc::new(MemorySink::new()));
        // Within the 0.5 sphere but further than the 0.25 rays
        let scene = scene_at(Position::new(0.0, 3.5 - 0.2 - 0.4, 0.0));
        gripper.check_collisions(&chain, &scene);
        assert!(!gripper.is_colliding());
        assert!(!gripper.grip_object(&chain, &scene));
    }

    #[test]
    fn test_grip_and_release() {
        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        let sink = Arc::new(MemorySink::new());
        let mut gripper = GripperController::new(GripperSettings::default(), sink.clone());
        let mut scene = scene_at(Position::new(0.0, 3.3, 0.0));
        gripper.check_collisions(&chain, &scene);
        assert!(gripper.grip_object(&chain, &scene));
        assert!(!gripper.grip_object(&chain, &scene));

        chain.set_angle(0, 90.0);
        gripper.check_collisions(&chain, &scene);
        gripper.follow(&chain, &mut scene);
        // Base turned the arm to -x; the box hangs 0.2 below the tip in the effector frame
        let moved = scene[1].position();
        assert!((moved - Position::new(-3.3, 0.0, 0.0)).norm() < 1e-9, "{:?}", moved);
        assert!((scene[1].rotation() - Vector3::new(0.0, 0.0, 90.0)).norm() < 1e-9);

        assert!(gripper.release_object());
        assert!(!gripper.release_object());
        chain.set_angle(0, 0.0);
        gripper.follow(&chain, &mut scene);
        assert!((scene[1].position() - Position::new(-3.3, 0.0, 0.0)).norm() < 1e-9);
        assert!(sink.contains("released"));
    }

    #[test]
    fn test_removed_object_drops_grip() {
        let chain = KinematicChain::new(&ChainParameters::planar_arm());
        let mut gripper = GripperController::new(GripperSettings::default(), Arc::new(MemorySink::new()));
        let mut scene = scene_at(Position::new(0.0, 3.3, 0.0));
        gripper.check_collisions(&chain, &scene);
        assert!(gripper.grip_object(&chain, &scene));
        scene.truncate(1);
        gripper.follow(&chain, &mut scene);
        assert!(!gripper.is_gripping());
    }
}
