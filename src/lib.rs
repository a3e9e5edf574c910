//! Mass properties of rigid bodies: mass, center-of-mass pose and inertia
//! tensor, with reframing, composition of bodies, sparse updates and live
//! binding to parameter trees.

pub mod inertia;
pub mod param;
pub mod quantities;

pub use inertia::{InertiaTensor, InertialProperties, InertialUpdate};
pub use param::BoundInertialProperties;

use inertial_params::ParamError;
use thiserror::Error;

/// Floating point type used for inertial properties.
#[allow(non_camel_case_types)]
pub type fph = f64;

pub type Result<T> = std::result::Result<T, InertialError>;

#[derive(Error, Debug)]
pub enum InertialError {
    #[error("Missing configuration element `{name}` in `{parent}`")]
    MissingConfigElement { parent: String, name: String },

    #[error("Invalid configuration value")]
    InvalidConfigValue(#[source] ParamError),

    #[error("Invalid mass {mass}")]
    InvalidMass { mass: fph },

    #[error("Inertia tensor is not positive semi-definite (smallest eigenvalue {smallest_eigenvalue})")]
    InvalidInertia { smallest_eigenvalue: fph },
}

impl From<ParamError> for InertialError {
    fn from(error: ParamError) -> Self {
        match error {
            ParamError::MissingElement { parent, name } => {
                Self::MissingConfigElement { parent, name }
            }
            error => Self::InvalidConfigValue(error),
        }
    }
}
