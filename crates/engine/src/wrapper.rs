use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, trace};
use unitmock_common::{CallError, CallResult, Instance, ObjectRef, Value};

use crate::WrapperError;

/// Replacement or added behavior. Receives the wrapped instance and the arguments.
pub type WrapperFn = Arc<dyn Fn(&ObjectRef, Vec<Value>) -> CallResult + Send + Sync>;

/// Wraps one live instance and lets a test override or add methods by name,
/// without synthesizing a mock type. Calls that hit neither table are
/// forwarded to the wrapped instance.
pub struct InstanceWrapper {
    inner: ObjectRef,
    overrides: RwLock<HashMap<String, WrapperFn>>,
    added: RwLock<HashMap<String, WrapperFn>>,
}

impl InstanceWrapper {
    pub fn new(inner: ObjectRef) -> Self {
        Self {
            inner,
            overrides: RwLock::default(),
            added: RwLock::default(),
        }
    }

    pub fn inner(&self) -> &ObjectRef {
        &self.inner
    }

    /// Replaces the behavior of a method the wrapped instance already has
    pub fn override_method<F>(&self, method: &str, behavior: F) -> Result<&Self, WrapperError>
    where
        F: Fn(&ObjectRef, Vec<Value>) -> CallResult + Send + Sync + 'static,
    {
        if !self.inner.responds_to(method) {
            return Err(WrapperError::MissingMethod {
                class: self.inner.class_name().to_string(),
                method: method.to_string(),
            });
        }
        debug!(class = self.inner.class_name(), method, "Overriding wrapped method");
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method.to_string(), Arc::new(behavior));
        Ok(self)
    }

    /// Exposes `behavior` as a new method. Fails if the name is already taken.
    pub fn add_method<F>(&self, method: &str, behavior: F) -> Result<&Self, WrapperError>
    where
        F: Fn(&ObjectRef, Vec<Value>) -> CallResult + Send + Sync + 'static,
    {
        let mut added = self.added.write().unwrap_or_else(PoisonError::into_inner);
        if self.inner.responds_to(method) || added.contains_key(method) {
            return Err(WrapperError::MethodExists {
                class: self.inner.class_name().to_string(),
                method: method.to_string(),
            });
        }
        debug!(class = self.inner.class_name(), method, "Adding method to wrapped instance");
        added.insert(method.to_string(), Arc::new(behavior));
        Ok(self)
    }

    fn lookup(&self, method: &str) -> Option<WrapperFn> {
        let overridden = self
            .overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned();
        overridden.or_else(|| {
            self.added
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(method)
                .cloned()
        })
    }

    pub fn into_object(self) -> ObjectRef {
        Arc::new(self)
    }
}

impl fmt::Debug for InstanceWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<String> = self
            .overrides
            .read()
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default();
        overrides.sort();
        let mut added: Vec<String> = self
            .added
            .read()
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default();
        added.sort();
        f.debug_struct("InstanceWrapper")
            .field("inner", &self.inner.class_name())
            .field("overrides", &overrides)
            .field("added", &added)
            .finish()
    }
}

impl Instance for InstanceWrapper {
    fn class_name(&self) -> &str {
        self.inner.class_name()
    }

    fn is_instance_of(&self, type_name: &str) -> bool {
        self.inner.is_instance_of(type_name)
    }

    fn responds_to(&self, method: &str) -> bool {
        self.inner.responds_to(method)
            || self
                .added
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(method)
    }

    fn call(&self, method: &str, args: Vec<Value>) -> CallResult {
        // the table lock is released before the behavior runs
        if let Some(behavior) = self.lookup(method) {
            trace!(class = self.inner.class_name(), method, "Calling wrapper behavior");
            return behavior(&self.inner, args);
        }
        if self.inner.responds_to(method) {
            return self.inner.call(method, args);
        }
        Err(CallError::MethodNotFound {
            class: self.inner.class_name().to_string(),
            method: method.to_string(),
        })
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.inner.property(name)
    }

    fn set_property(&self, name: &str, value: Value) {
        self.inner.set_property(name, value);
    }
}

#[cfg(test)]
mod tests {
    use unitmock_common::testing::{MAILER, fixture_catalog};

    use super::*;

    fn wrapped_mailer() -> InstanceWrapper {
        let mailer = fixture_catalog().instantiate(MAILER, vec![]).unwrap();
        InstanceWrapper::new(mailer)
    }

    #[test]
    fn test_unwrapped_calls_delegate() {
        let wrapper = wrapped_mailer();
        assert_eq!(
            wrapper.call("getFromEmail", vec![]).unwrap(),
            Value::from("noreply@example.com")
        );
    }

    #[test]
    fn test_override_requires_existing_method() {
        let wrapper = wrapped_mailer();
        wrapper
            .override_method("getFromEmail", |_, _| Ok("override@example.com".into()))
            .unwrap();
        assert_eq!(
            wrapper.call("getFromEmail", vec![]).unwrap(),
            Value::from("override@example.com")
        );

        let error = wrapper.override_method("missing", |_, _| Ok(Value::Null)).unwrap_err();
        assert_eq!(
            error,
            WrapperError::MissingMethod {
                class: MAILER.to_string(),
                method: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_add_rejects_existing_method() {
        let wrapper = wrapped_mailer();
        wrapper
            .add_method("greet", |inner, args| {
                let from = inner.call("getFromEmail", vec![])?;
                let name = args.first().and_then(Value::as_str).unwrap_or_default();
                Ok(format!("{} greets {name}", from.as_str().unwrap_or_default()).into())
            })
            .unwrap();
        assert_eq!(
            wrapper.call("greet", vec!["bob".into()]).unwrap(),
            Value::from("noreply@example.com greets bob")
        );

        assert!(matches!(
            wrapper.add_method("send", |_, _| Ok(Value::Null)),
            Err(WrapperError::MethodExists { .. })
        ));
        assert!(matches!(
            wrapper.add_method("greet", |_, _| Ok(Value::Null)),
            Err(WrapperError::MethodExists { .. })
        ));
    }

    #[test]
    fn test_unknown_method_fails() {
        let wrapper = wrapped_mailer();
        assert!(matches!(
            wrapper.call("nope", vec![]),
            Err(CallError::MethodNotFound { method, .. }) if method == "nope"
        ));
    }
}
