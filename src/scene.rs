//! Scene objects as the engine sees them. Objects belong to the host application; the
//! engine borrows the collection every frame and refers to a gripped object by index only.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use parry3d::shape::SharedShape;

use crate::kinematic_traits::{Pose, Position};

/// Non-owning reference to a scene object: its index in the collection passed to the
/// engine. A handle whose index is no longer in the collection is treated as gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub usize);

/// Rotation from Euler angles in degrees: x is roll, y is pitch, z is yaw, applied
/// in that order (rotation = Rz * Ry * Rx).
pub fn euler_to_rotation(degrees: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(degrees.x.to_radians(), degrees.y.to_radians(), degrees.z.to_radians())
}

/// Inverse of [`euler_to_rotation`].
pub fn rotation_to_euler(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vector3::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}

pub trait SceneObject {
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);

    /// Euler angles in degrees, see [`euler_to_rotation`].
    fn rotation(&self) -> Vector3<f64>;
    fn set_rotation(&mut self, degrees: Vector3<f64>);

    fn scale(&self) -> f64;
    fn set_scale(&mut self, scale: f64);

    /// Collision shape in object-local, unscaled coordinates.
    fn shape(&self) -> &SharedShape;

    /// Position and rotation of the object (without the scale).
    fn world_transform(&self) -> Pose {
        Isometry3::from_parts(
            Translation3::from(self.position().coords),
            euler_to_rotation(&self.rotation()),
        )
    }
}

/// Plain scene object, enough for the headless runner and for tests.
#[derive(Clone)]
pub struct SceneBody {
    pub name: String,
    pub position: Position,
    pub rotation: Vector3<f64>,
    pub scale: f64,
    pub shape: SharedShape,
}

impl SceneBody {
    pub fn new(name: &str, shape: SharedShape, position: Position) -> Self {
        SceneBody {
            name: name.to_string(),
            position,
            rotation: Vector3::zeros(),
            scale: 1.0,
            shape,
        }
    }

    /// Box with the given half extents.
    pub fn cuboid(name: &str, half_extents: Vector3<f64>, position: Position) -> Self {
        let h = half_extents.cast::<f32>();
        Self::new(name, SharedShape::cuboid(h.x, h.y, h.z), position)
    }

    pub fn ball(name: &str, radius: f64, position: Position) -> Self {
        Self::new(name, SharedShape::ball(radius as f32), position)
    }
}

impl std::fmt::Debug for SceneBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneBody")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .finish()
    }
}

impl SceneObject for SceneBody {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn rotation(&self) -> Vector3<f64> {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: Vector3<f64>) {
        self.rotation = degrees;
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }

    fn shape(&self) -> &SharedShape {
        &self.shape
    }
}
