//! Values stored in parameter tree elements.

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A position and orientation in 3D space.
pub type Pose = Isometry3<f64>;

/// The value held by a leaf of a parameter tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParamValue", into = "RawParamValue")]
pub enum ParamValue {
    Real(f64),
    Pose(Pose),
}

/// Types that can be extracted from a [`ParamValue`].
pub trait FromParamValue: Sized {
    /// Human readable name of the value kind, used in error messages.
    const KIND: &'static str;

    fn from_param_value(value: &ParamValue) -> Option<Self>;
}

/// Serialized form of [`ParamValue`]. Poses are written as a position and
/// roll, pitch and yaw angles, which is how they are authored by hand.
#[derive(Clone, Debug, Serialize, Deserialize)]
enum RawParamValue {
    Real(f64),
    Pose {
        position: [f64; 3],
        rotation: [f64; 3],
    },
}

impl ParamValue {
    /// Returns the scalar value, or [`None`] if this is not a scalar.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Pose(_) => None,
        }
    }

    /// Returns the pose value, or [`None`] if this is not a pose.
    pub fn as_pose(&self) -> Option<&Pose> {
        match self {
            Self::Pose(pose) => Some(pose),
            Self::Real(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Pose> for ParamValue {
    fn from(pose: Pose) -> Self {
        Self::Pose(pose)
    }
}

impl FromParamValue for f64 {
    const KIND: &'static str = "scalar";

    fn from_param_value(value: &ParamValue) -> Option<Self> {
        value.as_real()
    }
}

impl FromParamValue for Pose {
    const KIND: &'static str = "pose";

    fn from_param_value(value: &ParamValue) -> Option<Self> {
        value.as_pose().copied()
    }
}

impl From<RawParamValue> for ParamValue {
    fn from(raw: RawParamValue) -> Self {
        match raw {
            RawParamValue::Real(value) => Self::Real(value),
            RawParamValue::Pose {
                position: [x, y, z],
                rotation: [roll, pitch, yaw],
            } => Self::Pose(Pose::from_parts(
                Translation3::new(x, y, z),
                UnitQuaternion::from_euler_angles(roll, pitch, yaw),
            )),
        }
    }
}

impl From<ParamValue> for RawParamValue {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Real(value) => Self::Real(value),
            ParamValue::Pose(pose) => {
                let (roll, pitch, yaw) = pose.rotation.euler_angles();
                Self::Pose {
                    position: pose.translation.vector.into(),
                    rotation: [roll, pitch, yaw],
                }
            }
        }
    }
}
