//! Elements of a parameter tree.

use crate::{FromParamValue, ParamError, ParamValue, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Weak};

/// An object that can report the live value of the parameters it was
/// configured from.
///
/// Elements bound to a provider ask it for their value whenever the tree is
/// asked for current values, so the tree acts as a read-through view of the
/// configured object rather than a snapshot of the loaded configuration.
pub trait LiveValueProvider: Send + Sync {
    /// Returns the current value of the given field, or [`None`] if the
    /// provider does not know the field.
    fn current_value(&self, field: &str) -> Option<ParamValue>;
}

/// A named node in a parameter tree, holding an optional value and any number
/// of child elements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamElement {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ParamElement>,
    #[serde(skip)]
    binding: Option<ValueBinding>,
}

#[derive(Clone)]
struct ValueBinding {
    provider: Weak<dyn LiveValueProvider>,
    field: String,
}

impl ParamElement {
    /// Creates a new element with the given name and no value or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children: Vec::new(),
            binding: None,
        }
    }

    /// Creates a new leaf element with the given name and value.
    pub fn leaf(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self::new(name).with_value(value)
    }

    /// Returns the element with the given value assigned.
    pub fn with_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Returns the element with the given child appended.
    pub fn with_child(mut self, child: ParamElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value stored in the element. For bound elements this is
    /// the value from the last time the element was pulled, not the live
    /// value.
    pub fn value(&self) -> Option<&ParamValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: impl Into<ParamValue>) {
        self.value = Some(value.into());
    }

    pub fn children(&self) -> &[ParamElement] {
        &self.children
    }

    /// Whether the element has a direct child with the given name.
    pub fn has_element(&self, name: &str) -> bool {
        self.children.iter().any(|child| child.name == name)
    }

    /// Returns a reference to the direct child with the given name.
    ///
    /// # Errors
    /// Returns [`ParamError::MissingElement`] if there is no such child.
    pub fn element(&self, name: &str) -> Result<&ParamElement> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .ok_or_else(|| self.missing_element(name))
    }

    /// Returns a mutable reference to the direct child with the given name.
    ///
    /// # Errors
    /// Returns [`ParamError::MissingElement`] if there is no such child.
    pub fn element_mut(&mut self, name: &str) -> Result<&mut ParamElement> {
        match self.children.iter().position(|child| child.name == name) {
            Some(idx) => Ok(&mut self.children[idx]),
            None => Err(self.missing_element(name)),
        }
    }

    /// Returns the stored value of the direct child with the given name,
    /// converted to `T`.
    ///
    /// # Errors
    /// Returns an error if the child does not exist, has no value or holds a
    /// value of a different kind.
    pub fn get<T: FromParamValue>(&self, name: &str) -> Result<T> {
        self.element(name)?.stored_value_as()
    }

    /// Returns the stored value of the element converted to `T`.
    ///
    /// # Errors
    /// Returns an error if the element has no value or holds a value of a
    /// different kind.
    pub fn stored_value_as<T: FromParamValue>(&self) -> Result<T> {
        let value = self.value.as_ref().ok_or_else(|| ParamError::MissingValue {
            name: self.name.clone(),
        })?;
        T::from_param_value(value).ok_or_else(|| ParamError::TypeMismatch {
            name: self.name.clone(),
            expected: T::KIND,
        })
    }

    /// Binds the element to the given provider, so that pulling the element's
    /// value queries the provider for the given field. Any previous binding is
    /// replaced.
    ///
    /// Only a weak reference is held, so the binding never keeps the provider
    /// alive. Once the provider is dropped the element falls back to its
    /// stored value.
    pub fn bind(&mut self, provider: Weak<dyn LiveValueProvider>, field: impl Into<String>) {
        self.binding = Some(ValueBinding {
            provider,
            field: field.into(),
        });
    }

    /// Removes any provider binding from the element.
    pub fn unbind(&mut self) {
        self.binding = None;
    }

    /// Whether the element is bound to a provider that is still alive.
    pub fn is_bound(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|binding| binding.provider.strong_count() > 0)
    }

    /// Returns the current value of the element without modifying it: the
    /// live value if the element is bound to a provider that knows the field,
    /// otherwise the stored value.
    pub fn current_value(&self) -> Option<ParamValue> {
        self.live_value().or_else(|| self.value.clone())
    }

    /// Updates the stored value of the element with the live value from its
    /// provider, if bound, and returns the resulting stored value. A binding
    /// to a provider that has been dropped is removed.
    pub fn pull_value(&mut self) -> Option<&ParamValue> {
        if let Some(binding) = &self.binding {
            if binding.provider.strong_count() == 0 {
                log::debug!(
                    "Provider of parameter `{}` dropped, keeping stored value",
                    self.name
                );
                self.binding = None;
            } else if let Some(value) = self.live_value() {
                self.value = Some(value);
            }
        }
        self.value.as_ref()
    }

    /// Pulls the live values of this element and all its descendants into
    /// their stored values.
    pub fn pull_values(&mut self) {
        self.pull_value();
        for child in &mut self.children {
            child.pull_values();
        }
    }

    /// Parses a parameter tree from the given RON (Rusty Object Notation)
    /// text.
    #[cfg(feature = "ron")]
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Pulls all live values into the tree and writes it as RON (Rusty Object
    /// Notation) text.
    #[cfg(feature = "ron")]
    pub fn to_ron_string(&mut self) -> Result<String> {
        self.pull_values();
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    fn live_value(&self) -> Option<ParamValue> {
        let binding = self.binding.as_ref()?;
        let provider = binding.provider.upgrade()?;
        provider.current_value(&binding.field)
    }

    fn missing_element(&self, name: &str) -> ParamError {
        ParamError::MissingElement {
            parent: self.name.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Debug for ValueBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueBinding")
            .field("field", &self.field)
            .field("alive", &(self.provider.strong_count() > 0))
            .finish()
    }
}
