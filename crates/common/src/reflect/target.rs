use crate::{
    Value,
    reflect::{MethodDescriptor, ParameterDescriptor, TypeKind},
};

/// Everything needed to synthesize a mock of one type. Immutable once extracted.
#[derive(Clone, Debug)]
pub struct TargetTypeDescriptor {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) constructor_parameters: Vec<ParameterDescriptor>,
    pub(crate) constructor_args: Vec<Value>,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) has_catch_all: bool,
}

impl TargetTypeDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn constructor_parameters(&self) -> &[ParameterDescriptor] {
        &self.constructor_parameters
    }

    pub fn constructor_args(&self) -> &[Value] {
        &self.constructor_args
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn interceptable_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| m.is_interceptable())
    }

    pub fn final_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| m.is_final())
    }

    pub fn has_catch_all(&self) -> bool {
        self.has_catch_all
    }
}
