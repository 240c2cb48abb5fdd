use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, PoisonError, RwLock, Weak},
};

use crate::{
    CallError, CallResult, Value,
    reflect::{CallFrame, TypeCatalog},
};

/// Anything that can receive method calls: plain objects, mocks and wrappers
pub trait Instance: Send + Sync + fmt::Debug {
    fn class_name(&self) -> &str;

    fn is_instance_of(&self, type_name: &str) -> bool;

    /// Whether `method` is declared on the instance's type (catch-all handlers excluded)
    fn responds_to(&self, method: &str) -> bool;

    fn call(&self, method: &str, args: Vec<Value>) -> CallResult;

    fn property(&self, name: &str) -> Option<Value>;

    fn set_property(&self, name: &str, value: Value);
}

pub type ObjectRef = Arc<dyn Instance>;

/// Per-instance property storage
#[derive(Debug, Default)]
pub struct PropertyBag {
    values: RwLock<BTreeMap<String, Value>>,
}

impl PropertyBag {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn set(&self, name: &str, value: Value) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value);
    }
}

/// A plain instance of a catalog type
pub struct Object {
    catalog: Arc<TypeCatalog>,
    class: String,
    properties: PropertyBag,
    this: Weak<Object>,
}

impl Object {
    pub(crate) fn new(catalog: Arc<TypeCatalog>, class: &str) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            catalog,
            class: class.to_string(),
            properties: PropertyBag::default(),
            this: this.clone(),
        })
    }

    fn handle(&self) -> Result<ObjectRef, CallError> {
        let this: ObjectRef = self
            .this
            .upgrade()
            .ok_or_else(|| CallError::InstanceDropped(self.class.clone()))?;
        Ok(this)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("properties", &self.properties)
            .finish()
    }
}

impl Instance for Object {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn is_instance_of(&self, type_name: &str) -> bool {
        self.catalog.is_subtype(&self.class, type_name)
    }

    fn responds_to(&self, method: &str) -> bool {
        self.catalog.find_method(&self.class, method).is_some()
    }

    fn call(&self, method: &str, args: Vec<Value>) -> CallResult {
        let frame = CallFrame::new(self.handle()?, args);
        match self.catalog.find_method(&self.class, method) {
            Some(definition) => match &definition.body {
                Some(body) => body(&frame),
                None => Err(CallError::NoOriginalImplementation {
                    class: self.class.clone(),
                    method: method.to_string(),
                }),
            },
            None => match self.catalog.find_catch_all(&self.class) {
                Some(handler) => handler(&frame, method),
                None => Err(CallError::MethodNotFound {
                    class: self.class.clone(),
                    method: method.to_string(),
                }),
            },
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name)
    }

    fn set_property(&self, name: &str, value: Value) {
        self.properties.set(name, value);
    }
}
