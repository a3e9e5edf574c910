//! Sparse updates of inertial properties.

use crate::{fph, inertia::InertialProperties, quantities::Position};

/// An update of some of the fields of a set of [`InertialProperties`]. Only
/// the fields that are present are applied.
///
/// The position only moves the center of mass; the orientation of the
/// center-of-mass frame cannot be updated this way.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InertialUpdate {
    pub mass: Option<fph>,
    pub position: Option<Position>,
    pub ixx: Option<fph>,
    pub iyy: Option<fph>,
    pub izz: Option<fph>,
    pub ixy: Option<fph>,
    pub ixz: Option<fph>,
    pub iyz: Option<fph>,
}

impl InertialUpdate {
    /// Whether the update has no fields present.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl InertialProperties {
    /// Overwrites every field that is present in the given update and leaves
    /// the remaining fields untouched.
    pub fn apply_update(&mut self, update: &InertialUpdate) {
        if let Some(mass) = update.mass {
            self.set_mass(mass);
        }
        if let Some(position) = update.position {
            self.set_center_of_mass(position);
        }
        if let Some(ixx) = update.ixx {
            self.set_ixx(ixx);
        }
        if let Some(iyy) = update.iyy {
            self.set_iyy(iyy);
        }
        if let Some(izz) = update.izz {
            self.set_izz(izz);
        }
        if let Some(ixy) = update.ixy {
            self.set_ixy(ixy);
        }
        if let Some(ixz) = update.ixz {
            self.set_ixz(ixz);
        }
        if let Some(iyz) = update.iyz {
            self.set_iyz(iyz);
        }
        log::trace!("Applied inertial update {update:?}");
    }
}
