use std::fmt;

use crate::{DeclaredType, Value};

/// A single declared parameter of a method or constructor
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    position: usize,
    declared_type: Option<DeclaredType>,
    is_optional: bool,
    default_value: Option<Value>,
    is_variadic: bool,
    is_by_reference: bool,
}

impl ParameterDescriptor {
    /// Creates a required, untyped parameter. The position is reassigned when
    /// the parameter is attached to a method.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 0,
            declared_type: None,
            is_optional: false,
            default_value: None,
            is_variadic: false,
            is_by_reference: false,
        }
    }

    pub fn typed(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self::new(name).with_type(declared_type)
    }

    pub fn with_type(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    /// A default value makes the parameter optional
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self.is_optional = true;
        self
    }

    /// Variadic parameters are always optional
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self.is_optional = true;
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.is_by_reference = true;
        self
    }

    pub(crate) fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn declared_type(&self) -> Option<&DeclaredType> {
        self.declared_type.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    pub fn is_by_reference(&self) -> bool {
        self.is_by_reference
    }
}

impl fmt::Display for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(declared_type) = &self.declared_type {
            write!(f, "{declared_type} ")?;
        }
        if self.is_by_reference {
            f.write_str("&")?;
        }
        if self.is_variadic {
            f.write_str("...")?;
        }
        write!(f, "${}", self.name)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}
