//! Physical quantities.

use crate::fph;
use nalgebra::{Isometry3, Point3, UnitQuaternion, UnitVector3, Vector3};

/// A unit vector in 3D space.
pub type Direction = UnitVector3<fph>;

/// A position in 3D space.
pub type Position = Point3<fph>;

/// An orientation in 3D space.
pub type Orientation = UnitQuaternion<fph>;

/// A position and orientation in 3D space, i.e. a rigid frame.
pub type Pose = Isometry3<fph>;

/// A triple of moments or products of inertia.
pub type InertiaVector = Vector3<fph>;

/// Expresses the given pose in the frame of the reference pose, with both
/// poses initially expressed in the same frame. This is the composition of
/// the inverse of the reference pose with the pose.
#[inline]
pub fn relative_pose(pose: &Pose, reference: &Pose) -> Pose {
    reference.inv_mul(pose)
}
