use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
};

use tracing::{debug, trace};
use unitmock_common::{
    CallError, CallFrame, CallResult, Instance, ObjectRef, PropertyBag, Value,
    reflect::{
        CatchAllHandler, ConstructorBody, MethodBody, MethodDescriptor, TargetTypeDescriptor,
        TypeCatalog,
    },
};

use crate::{
    builder::{MockStores, synthesize_empty},
    data_type_mock::Synthesized,
    identity::MockId,
};

/// One method of a synthesized type
pub(crate) struct SynthesizedMethod {
    pub descriptor: MethodDescriptor,
    pub original: Option<MethodBody>,
    pub intercepted: bool,
}

/// The synthesized type: a dispatch table over the target's methods plus the
/// stores every instance reads its behavior from and records calls into
pub(crate) struct MockClass {
    pub id: MockId,
    pub type_name: String,
    pub target: Arc<TargetTypeDescriptor>,
    pub catalog: Arc<TypeCatalog>,
    pub methods: HashMap<String, SynthesizedMethod>,
    pub constructor: Option<ConstructorBody>,
    pub catch_all: Option<CatchAllHandler>,
    pub stores: MockStores,
}

/// An instance of a synthesized mock type
pub struct MockObject {
    class: Arc<MockClass>,
    properties: PropertyBag,
    this: Weak<MockObject>,
}

impl MockObject {
    /// Creates an instance, running the target's constructor with the
    /// recorded constructor arguments when `construct` is set
    pub(crate) fn instantiate(class: Arc<MockClass>, construct: bool) -> Result<Arc<Self>, CallError> {
        let object = Arc::new_cyclic(|this| Self {
            class,
            properties: PropertyBag::default(),
            this: this.clone(),
        });
        if construct {
            if let Some(constructor) = &object.class.constructor {
                let this: ObjectRef = object.clone();
                let args = object.class.target.constructor_args().to_vec();
                constructor(&CallFrame::new(this, args))?;
            }
        }
        Ok(object)
    }

    pub fn id(&self) -> MockId {
        self.class.id
    }

    pub fn target(&self) -> &TargetTypeDescriptor {
        &self.class.target
    }

    fn handle(&self) -> Result<Arc<MockObject>, CallError> {
        self.this
            .upgrade()
            .ok_or_else(|| CallError::InstanceDropped(self.class.type_name.clone()))
    }

    /// Runs the target's own implementation of `method` with this mock as receiver
    pub(crate) fn call_original(&self, method: &str, args: Vec<Value>) -> CallResult {
        let this: ObjectRef = self.handle()?;
        let frame = CallFrame::new(this, args);
        match self.class.methods.get(method) {
            Some(SynthesizedMethod {
                original: Some(body),
                ..
            }) => body(&frame),
            Some(_) => Err(CallError::NoOriginalImplementation {
                class: self.class.target.name().to_string(),
                method: method.to_string(),
            }),
            None => match &self.class.catch_all {
                Some(handler) => handler(&frame, method),
                None => Err(CallError::MethodNotFound {
                    class: self.class.target.name().to_string(),
                    method: method.to_string(),
                }),
            },
        }
    }

    /// Records the call, then applies throw, wrap, keep-original, scripted
    /// value and default synthesis in that order
    fn intercept(&self, method: &str, descriptor: Option<&MethodDescriptor>, args: Vec<Value>) -> CallResult {
        let id = self.class.id;
        let call_index = self.class.stores.ledger.record_call(id, method, args.clone());
        let returns_void = descriptor.is_some_and(MethodDescriptor::returns_void);
        let trace_policy = |policy: &str| {
            trace!(mock_id = %id, method, call_index, policy, "Intercepted call");
        };

        let Some(behavior) = self.class.stores.registry.behavior(id, method) else {
            trace_policy("default");
            return self.synthesize_default(method, descriptor);
        };

        if let Some(exception) = behavior.raises_on(call_index) {
            debug!(mock_id = %id, method, call_index, %exception, "Raising configured exception");
            return Err(CallError::Raised(exception.clone()));
        }

        if let Some(wrapper) = &behavior.wrapper {
            trace_policy("wrap");
            let original = Original {
                mock: self.handle()?,
            };
            let result = wrapper(&original, args)?;
            return Ok(if returns_void { Value::Null } else { result });
        }

        if behavior.keep_original {
            trace_policy("keep_original");
            let result = self.call_original(method, args)?;
            return Ok(if returns_void { Value::Null } else { result });
        }

        if let Some(value) = behavior.scripted_value(call_index) {
            trace_policy("scripted");
            return Ok(if returns_void { Value::Null } else { value.clone() });
        }

        trace_policy("default");
        self.synthesize_default(method, descriptor)
    }

    fn synthesize_default(&self, method: &str, descriptor: Option<&MethodDescriptor>) -> CallResult {
        let declared = descriptor.and_then(MethodDescriptor::return_type);
        match self.class.stores.data_types.value_for(declared, Some(method)) {
            Synthesized::Void => Ok(Value::Null),
            Synthesized::Value(value) => Ok(value),
            Synthesized::SelfInstance => {
                let instance: ObjectRef = if descriptor.is_some_and(MethodDescriptor::is_static) {
                    MockObject::instantiate(Arc::clone(&self.class), true)?
                } else {
                    self.handle()?
                };
                Ok(Value::Object(instance))
            }
            Synthesized::Subtype(type_name) if self.class.catalog.contains(&type_name) => {
                Ok(Value::Object(synthesize_empty(&self.class, &type_name)?))
            }
            Synthesized::Subtype(_) => Ok(Value::Null),
        }
    }
}

impl fmt::Debug for MockObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockObject")
            .field("id", &self.class.id)
            .field("type_name", &self.class.type_name)
            .finish_non_exhaustive()
    }
}

impl Instance for MockObject {
    fn class_name(&self) -> &str {
        &self.class.type_name
    }

    fn is_instance_of(&self, type_name: &str) -> bool {
        type_name == self.class.type_name
            || self.class.catalog.is_subtype(self.class.target.name(), type_name)
    }

    fn responds_to(&self, method: &str) -> bool {
        self.class.methods.contains_key(method)
    }

    fn call(&self, method: &str, args: Vec<Value>) -> CallResult {
        match self.class.methods.get(method) {
            Some(synthesized) if synthesized.intercepted => {
                self.intercept(method, Some(&synthesized.descriptor), args)
            }
            // final and private methods always run their original body
            Some(_) => self.call_original(method, args),
            None if self.class.catch_all.is_some()
                && self.class.stores.registry.contains(self.class.id, method) =>
            {
                self.intercept(method, None, args)
            }
            None => self.call_original(method, args),
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name)
    }

    fn set_property(&self, name: &str, value: Value) {
        self.properties.set(name, value);
    }
}

/// Handle given to wrap functions: the mock as late-bound receiver plus
/// access to the un-mocked implementations of its methods
#[derive(Clone, Debug)]
pub struct Original {
    mock: Arc<MockObject>,
}

impl Original {
    /// The mock itself; calls through it are intercepted as usual
    pub fn this(&self) -> ObjectRef {
        self.mock.clone()
    }

    /// Calls the original implementation of `method`, bypassing interception
    pub fn call(&self, method: &str, args: Vec<Value>) -> CallResult {
        self.mock.call_original(method, args)
    }

    pub fn mock_id(&self) -> MockId {
        self.mock.id()
    }
}
