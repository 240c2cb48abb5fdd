use std::fmt;

use thiserror::Error;

/// A throwable raised by a method body or injected by a mock configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exception {
    class: String,
    message: String,
    code: i64,
}

impl Exception {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            code: 0,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Shorthand for the generic runtime exception class
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new("RuntimeException", message)
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)?;
        if self.code != 0 {
            write!(f, " (code {})", self.code)?;
        }
        Ok(())
    }
}

/// Errors raised while registering or introspecting types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReflectError {
    #[error("Type not found: {0}")]
    NotFound(String),
    #[error("Type already registered: {0}")]
    DuplicateType(String),
    #[error("Type {type_name} references unknown type {missing}")]
    UnknownReference { type_name: String, missing: String },
    #[error("Method {method} is declared twice on {type_name}")]
    DuplicateMethod { type_name: String, method: String },
    #[error("Interface {type_name} cannot declare a body for {method}")]
    InterfaceBody { type_name: String, method: String },
    #[error("Invalid type declaration: {0:?}")]
    InvalidTypeDeclaration(String),
}

/// Errors raised while invoking a method on an instance
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CallError {
    #[error("Uncaught {0}")]
    Raised(Exception),
    #[error("Call to undefined method {class}::{method}()")]
    MethodNotFound { class: String, method: String },
    #[error("Method {class}::{method}() has no original implementation to call")]
    NoOriginalImplementation { class: String, method: String },
    #[error("Cannot instantiate {kind} {class}")]
    NotInstantiable { class: String, kind: String },
    #[error("Instance of {0} is no longer alive")]
    InstanceDropped(String),
    #[error(transparent)]
    Reflect(#[from] ReflectError),
}

impl CallError {
    /// Returns the raised exception if this error carries one
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            CallError::Raised(exception) => Some(exception),
            _ => None,
        }
    }
}

impl From<Exception> for CallError {
    fn from(exception: Exception) -> Self {
        CallError::Raised(exception)
    }
}
