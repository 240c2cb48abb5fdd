mod catalog;
mod class;
mod extractor;
mod method;
mod parameter;
mod target;

pub use catalog::TypeCatalog;
pub use class::{
    CallFrame, CatchAllHandler, ClassDefinition, Constructor, ConstructorBody, MethodBody,
    MethodDefinition, TypeKind,
};
pub use extractor::TypeDescriptorExtractor;
pub use method::{MethodDescriptor, SourceLocation, Visibility};
pub use parameter::ParameterDescriptor;
pub use target::TargetTypeDescriptor;
