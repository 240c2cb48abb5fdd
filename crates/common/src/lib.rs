mod declared_type;
mod error;
mod value;
pub mod config;
pub mod object;
pub mod reflect;
pub mod testing;

pub use config::EngineConfig;
pub use declared_type::DeclaredType;
pub use error::{CallError, Exception, ReflectError};
pub use object::{Instance, ObjectRef, PropertyBag};
pub use reflect::CallFrame;
pub use value::{CallResult, Callable, ResourceHandle, Value};
