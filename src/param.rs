//! Loading of inertial properties from parameter trees, and live binding of
//! the tree to the loaded properties.
//!
//! An inertial element has the following layout:
//!
//! ```text
//! inertial
//! ├── pose
//! ├── mass
//! └── inertia
//!     ├── ixx
//!     ├── iyy
//!     ├── izz
//!     ├── ixy
//!     ├── ixz
//!     └── iyz
//! ```

use crate::{
    Result, fph,
    inertia::{InertiaTensor, InertialProperties, InertialUpdate},
    quantities::Pose,
};
use inertial_params::{LiveValueProvider, ParamElement, ParamValue};
use lazy_static::lazy_static;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::{Arc, Weak};

pub const INERTIAL: &str = "inertial";
pub const POSE: &str = "pose";
pub const MASS: &str = "mass";
pub const INERTIA: &str = "inertia";

pub const IXX: &str = "ixx";
pub const IYY: &str = "iyy";
pub const IZZ: &str = "izz";
pub const IXY: &str = "ixy";
pub const IXZ: &str = "ixz";
pub const IYZ: &str = "iyz";

/// Names of the inertia tensor entries, in the order the entries are passed
/// to [`InertiaTensor::new`].
pub const INERTIA_ENTRIES: [&str; 6] = [IXX, IYY, IZZ, IXY, IXZ, IYZ];

lazy_static! {
    static ref INERTIAL_TEMPLATE: ParamElement = InertialProperties::default().to_params();
}

/// Returns the shared template for inertial elements, holding the default
/// inertial properties.
pub fn inertial_template() -> &'static ParamElement {
    &INERTIAL_TEMPLATE
}

/// Creates a new inertial element holding the default inertial properties.
/// Each call returns an independent copy of the shared template.
pub fn new_inertial_element() -> ParamElement {
    INERTIAL_TEMPLATE.clone()
}

/// Removes the live value bindings that [`BoundInertialProperties::bind`]
/// registered on the given inertial element.
///
/// # Errors
/// Returns [`InertialError::MissingConfigElement`](crate::InertialError) if
/// the element does not have the inertial layout.
pub fn unbind(element: &mut ParamElement) -> Result<()> {
    element.element_mut(MASS)?.unbind();
    let inertia = element.element_mut(INERTIA)?;
    for entry in INERTIA_ENTRIES {
        inertia.element_mut(entry)?.unbind();
    }
    log::debug!("Unbound inertial element `{}`", element.name());
    Ok(())
}

impl InertialProperties {
    /// Reads inertial properties from the stored values of the given inertial
    /// element.
    ///
    /// # Errors
    /// Returns [`InertialError::MissingConfigElement`](crate::InertialError)
    /// if a required element is missing, or
    /// [`InertialError::InvalidConfigValue`](crate::InertialError) if a value
    /// is missing or of the wrong kind.
    pub fn from_params(element: &ParamElement) -> Result<Self> {
        let center_of_mass_pose = element.get::<Pose>(POSE)?;
        let inertia_tensor = read_inertia_tensor(element)?;
        let mass = element.get::<fph>(MASS)?;
        Ok(Self::from_parts(mass, center_of_mass_pose, inertia_tensor))
    }

    /// Creates an unbound inertial element holding these properties.
    pub fn to_params(&self) -> ParamElement {
        let inertia = INERTIA_ENTRIES.into_iter().fold(
            ParamElement::new(INERTIA),
            |inertia, entry| {
                let value = self.entry_value(entry).unwrap_or_default();
                inertia.with_child(ParamElement::leaf(entry, value))
            },
        );

        ParamElement::new(INERTIAL)
            .with_child(ParamElement::leaf(POSE, *self.center_of_mass_pose()))
            .with_child(ParamElement::leaf(MASS, self.mass()))
            .with_child(inertia)
    }

    /// Restores the mass and inertia tensor to the values currently stored in
    /// the given inertial element, and moves the center of mass back to the
    /// origin of the body frame with identity orientation. The pose stored in
    /// the element is not consulted.
    ///
    /// The properties are left untouched if the element cannot be read.
    ///
    /// # Errors
    /// See [`InertialProperties::from_params`].
    pub fn reset_from_params(&mut self, element: &ParamElement) -> Result<()> {
        let inertia_tensor = read_inertia_tensor(element)?;
        let mass = element.get::<fph>(MASS)?;

        self.set_mass(mass);
        self.set_center_of_mass_pose(Pose::identity());
        self.set_inertia_tensor(inertia_tensor);
        Ok(())
    }

    /// Returns the value of the field with the given parameter name, or
    /// [`None`] if no field has that name.
    pub fn entry_value(&self, name: &str) -> Option<fph> {
        match name {
            MASS => Some(self.mass()),
            IXX => Some(self.ixx()),
            IYY => Some(self.iyy()),
            IZZ => Some(self.izz()),
            IXY => Some(self.ixy()),
            IXZ => Some(self.ixz()),
            IYZ => Some(self.iyz()),
            _ => None,
        }
    }
}

/// Inertial properties shared between the body they describe and the
/// parameter tree they were loaded from.
///
/// The tree only holds weak references to the properties. When the bound
/// properties are dropped, bound elements fall back to the last values that
/// were pulled into them.
///
/// Pulling values from the tree reads the properties, so it must not happen
/// while a guard from [`Self::write`] is held on the same thread.
#[derive(Debug)]
pub struct BoundInertialProperties {
    properties: RwLock<InertialProperties>,
}

impl BoundInertialProperties {
    /// Loads inertial properties from the given inertial element and binds
    /// the element's mass and inertia entries to them.
    ///
    /// Properties that are not physically valid are loaded anyway, with a
    /// warning.
    ///
    /// # Errors
    /// See [`InertialProperties::from_params`].
    pub fn load(element: &mut ParamElement) -> Result<Arc<Self>> {
        let properties = InertialProperties::from_params(element)?;

        if let Err(error) = properties.validate() {
            log::warn!(
                "Loaded inertial properties from `{}` are not physically valid: {error}",
                element.name()
            );
        }

        let bound = Arc::new(Self {
            properties: RwLock::new(properties),
        });
        bound.bind(element)?;

        log::debug!(
            "Loaded inertial properties with mass {} from `{}`",
            bound.read().mass(),
            element.name()
        );

        Ok(bound)
    }

    /// Binds the mass and inertia entries of the given inertial element to
    /// these properties, replacing any previous bindings, so that pulling
    /// values from the element reports the live values.
    ///
    /// # Errors
    /// Returns [`InertialError::MissingConfigElement`](crate::InertialError)
    /// if the element does not have the inertial layout.
    pub fn bind(self: &Arc<Self>, element: &mut ParamElement) -> Result<()> {
        let provider: Weak<dyn LiveValueProvider> = Arc::downgrade(self) as _;

        element.element_mut(MASS)?.bind(provider.clone(), MASS);

        let inertia = element.element_mut(INERTIA)?;
        for entry in INERTIA_ENTRIES {
            inertia.element_mut(entry)?.bind(provider.clone(), entry);
        }

        log::debug!("Bound inertial element `{}`", element.name());
        Ok(())
    }

    /// Reloads all properties from the stored values of the given inertial
    /// element and binds it to these properties.
    ///
    /// The properties are left untouched if the element cannot be read.
    ///
    /// # Errors
    /// See [`InertialProperties::from_params`].
    pub fn reload(self: &Arc<Self>, element: &mut ParamElement) -> Result<()> {
        let properties = InertialProperties::from_params(element)?;
        *self.write() = properties;
        self.bind(element)
    }

    /// Restores the mass and inertia tensor from the values currently stored
    /// in the given inertial element and resets the center-of-mass pose to
    /// identity (see [`InertialProperties::reset_from_params`]).
    ///
    /// # Errors
    /// See [`InertialProperties::from_params`].
    pub fn reset(&self, element: &ParamElement) -> Result<()> {
        self.write().reset_from_params(element)?;
        log::debug!("Reset inertial properties from `{}`", element.name());
        Ok(())
    }

    /// Applies the given sparse update to the properties.
    pub fn apply_update(&self, update: &InertialUpdate) {
        self.write().apply_update(update);
    }

    /// Returns a copy of the current properties.
    pub fn snapshot(&self) -> InertialProperties {
        self.read().clone()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, InertialProperties> {
        self.properties.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, InertialProperties> {
        self.properties.write()
    }
}

impl LiveValueProvider for BoundInertialProperties {
    fn current_value(&self, field: &str) -> Option<ParamValue> {
        self.read().entry_value(field).map(ParamValue::Real)
    }
}

fn read_inertia_tensor(element: &ParamElement) -> Result<InertiaTensor> {
    let inertia = element.element(INERTIA)?;
    let [ixx, iyy, izz, ixy, ixz, iyz] = [
        inertia.get::<fph>(IXX)?,
        inertia.get::<fph>(IYY)?,
        inertia.get::<fph>(IZZ)?,
        inertia.get::<fph>(IXY)?,
        inertia.get::<fph>(IXZ)?,
        inertia.get::<fph>(IYZ)?,
    ];
    Ok(InertiaTensor::new(ixx, iyy, izz, ixy, ixz, iyz))
}
