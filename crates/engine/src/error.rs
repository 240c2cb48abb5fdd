use thiserror::Error;
use unitmock_common::{CallError, ReflectError};

/// Hard failures raised while configuring or building a mock
#[derive(Debug, Error)]
pub enum MockError {
    #[error("Cannot configure method {0}: no mock instance has been created yet")]
    NoMockInstance(String),
    #[error("Method {method} does not exist on {type_name} and it has no catch-all handler")]
    UnknownMethod { type_name: String, method: String },
    #[error("Cannot wrap {type_name}::{method}(): interfaces have no original implementation")]
    WrapOnInterface { type_name: String, method: String },
    #[error("Failed to construct mock of {type_name}: {source}")]
    Construction {
        type_name: String,
        #[source]
        source: CallError,
    },
    #[error(transparent)]
    Reflect(#[from] ReflectError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Errors raised while configuring an [`InstanceWrapper`](crate::InstanceWrapper)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WrapperError {
    #[error("Cannot override {class}::{method}(): the method does not exist")]
    MissingMethod { class: String, method: String },
    #[error("Cannot add {class}::{method}(): the method already exists")]
    MethodExists { class: String, method: String },
}
