//! Declarative parameter trees whose values can be pulled live from the
//! objects they configure.

mod element;
mod value;

pub use element::{LiveValueProvider, ParamElement};
pub use value::{FromParamValue, ParamValue, Pose};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParamError>;

#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Element `{parent}` has no child element `{name}`")]
    MissingElement { parent: String, name: String },

    #[error("Element `{name}` has no value")]
    MissingValue { name: String },

    #[error("Value of element `{name}` is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[cfg(feature = "ron")]
    #[error("Invalid syntax in parameter tree")]
    Parse(#[from] ron::error::SpannedError),

    #[cfg(feature = "ron")]
    #[error("Failed to write parameter tree")]
    Write(#[from] ron::Error),
}

/// Reads the RON (Rusty Object Notation) file at the given path and parses
/// the contents into a [`ParamElement`] tree.
#[cfg(feature = "ron")]
pub fn parse_ron_file(file_path: impl AsRef<std::path::Path>) -> anyhow::Result<ParamElement> {
    use anyhow::Context;

    let file_path = file_path.as_ref();

    let text = std::fs::read_to_string(file_path)
        .map_err(anyhow::Error::from)
        .with_context(|| format!("Could not open {}", file_path.display()))?;

    ParamElement::from_ron_str(&text)
        .map_err(anyhow::Error::from)
        .with_context(|| format!("Invalid parameter tree in {}", file_path.display()))
}
