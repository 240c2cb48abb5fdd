use std::sync::Arc;

use unitmock_common::{CallResult, Instance, ObjectRef, Value, reflect::TargetTypeDescriptor};

use crate::{
    identity::MockId,
    inspector::MockInspector,
    mock_object::MockObject,
    registry::{MethodConfig, MethodRegistry, UninterceptableMethodWarning},
    MockError,
};

/// A built mock: the instance under test plus its inspector.
///
/// Methods may still be configured after the mock was built; the instance
/// reads its behavior on every call.
#[derive(Clone, Debug)]
pub struct Mock {
    object: Arc<MockObject>,
    inspector: MockInspector,
    methods: MethodRegistry,
}

impl Mock {
    pub(crate) fn new(object: Arc<MockObject>, inspector: MockInspector, methods: MethodRegistry) -> Self {
        Self {
            object,
            inspector,
            methods,
        }
    }

    pub fn id(&self) -> MockId {
        self.object.id()
    }

    /// Name of the synthesized type
    pub fn type_name(&self) -> &str {
        self.object.class_name()
    }

    pub fn target(&self) -> &TargetTypeDescriptor {
        self.object.target()
    }

    pub fn call(&self, method: &str, args: Vec<Value>) -> CallResult {
        self.object.call(method, args)
    }

    /// The mock as an object that can be handed to code under test
    pub fn object(&self) -> ObjectRef {
        self.object.clone()
    }

    pub fn inspector(&self) -> &MockInspector {
        &self.inspector
    }

    pub fn methods(&self) -> &MethodRegistry {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Result<MethodConfig, MockError> {
        self.methods.method(name)
    }

    pub fn uninterceptable_methods(&self) -> Vec<UninterceptableMethodWarning> {
        self.methods.uninterceptable_methods()
    }

    pub fn final_methods(&self) -> Vec<UninterceptableMethodWarning> {
        self.methods.final_methods()
    }
}

impl From<&Mock> for Value {
    fn from(mock: &Mock) -> Self {
        Value::Object(mock.object())
    }
}
