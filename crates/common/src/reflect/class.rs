use std::{fmt, sync::Arc};

use crate::{
    CallError, CallResult, Value,
    object::ObjectRef,
    reflect::{MethodDescriptor, ParameterDescriptor},
};

/// Receiver and arguments of a single invocation
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub this: ObjectRef,
    pub args: Vec<Value>,
}

impl CallFrame {
    pub fn new(this: ObjectRef, args: Vec<Value>) -> Self {
        Self { this, args }
    }

    /// Argument at `position`, or null when it was not passed
    pub fn arg(&self, position: usize) -> Value {
        self.args.get(position).cloned().unwrap_or_default()
    }

    /// Calls another method on the late-bound receiver
    pub fn call_this(&self, method: &str, args: Vec<Value>) -> CallResult {
        self.this.call(method, args)
    }
}

pub type MethodBody = Arc<dyn Fn(&CallFrame) -> CallResult + Send + Sync>;
pub type ConstructorBody = Arc<dyn Fn(&CallFrame) -> Result<(), CallError> + Send + Sync>;
/// Receives the frame and the name of the member that was not found
pub type CatchAllHandler = Arc<dyn Fn(&CallFrame, &str) -> CallResult + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
}

impl TypeKind {
    pub fn is_instantiable(&self) -> bool {
        matches!(self, TypeKind::Class)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Class => write!(f, "class"),
            TypeKind::AbstractClass => write!(f, "abstract class"),
            TypeKind::Interface => write!(f, "interface"),
        }
    }
}

#[derive(Clone)]
pub struct MethodDefinition {
    pub descriptor: MethodDescriptor,
    pub body: Option<MethodBody>,
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("descriptor", &self.descriptor)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct Constructor {
    pub parameters: Vec<ParameterDescriptor>,
    pub body: Option<ConstructorBody>,
}

/// Definition of a type known to the [`TypeCatalog`](crate::reflect::TypeCatalog)
#[derive(Clone)]
pub struct ClassDefinition {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) parent: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) methods: Vec<MethodDefinition>,
    pub(crate) catch_all: Option<CatchAllHandler>,
}

impl ClassDefinition {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            catch_all: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::AbstractClass)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// For interfaces this lists the extended interfaces
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn constructor<F>(mut self, parameters: Vec<ParameterDescriptor>, body: F) -> Self
    where
        F: Fn(&CallFrame) -> Result<(), CallError> + Send + Sync + 'static,
    {
        let parameters = parameters
            .into_iter()
            .enumerate()
            .map(|(position, p)| p.at_position(position))
            .collect();
        self.constructor = Some(Constructor {
            parameters,
            body: Some(Arc::new(body)),
        });
        self
    }

    /// Adds a method with an implementation
    pub fn method<F>(mut self, descriptor: MethodDescriptor, body: F) -> Self
    where
        F: Fn(&CallFrame) -> CallResult + Send + Sync + 'static,
    {
        let descriptor = descriptor.declared_by(&self.name);
        self.methods.push(MethodDefinition {
            descriptor,
            body: Some(Arc::new(body)),
        });
        self
    }

    /// Adds a method without an implementation
    pub fn abstract_method(mut self, descriptor: MethodDescriptor) -> Self {
        let descriptor = descriptor.declared_by(&self.name).as_abstract();
        self.methods.push(MethodDefinition {
            descriptor,
            body: None,
        });
        self
    }

    pub fn catch_all<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CallFrame, &str) -> CallResult + Send + Sync + 'static,
    {
        self.catch_all = Some(Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn methods(&self) -> &[MethodDefinition] {
        &self.methods
    }

    pub fn own_method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.descriptor.name() == name)
    }
}

impl fmt::Debug for ClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("methods", &self.methods)
            .field("has_catch_all", &self.catch_all.is_some())
            .finish()
    }
}
