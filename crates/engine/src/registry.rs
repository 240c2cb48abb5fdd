use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, warn};
use unitmock_common::{
    CallResult, Exception, Value,
    reflect::{MethodDescriptor, SourceLocation, TargetTypeDescriptor},
};

use crate::{
    MockError,
    assertion::{ArgumentExpectation, StaticAssertion},
    behavior::MethodBehaviorDescriptor,
    identity::{MockId, MockKey, key},
    mock_object::Original,
};

/// Method behaviors of every mock created from one session, keyed by mock identity
#[derive(Clone, Default)]
pub struct MockRegistry {
    behaviors: Arc<RwLock<HashMap<MockKey, MethodBehaviorDescriptor>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the descriptor on first use, then applies `update` to it
    pub(crate) fn update<F>(&self, id: MockId, method: &str, update: F)
    where
        F: FnOnce(&mut MethodBehaviorDescriptor),
    {
        let mut behaviors = self.behaviors.write().unwrap_or_else(PoisonError::into_inner);
        update(behaviors.entry(key(id, method)).or_default());
    }

    pub fn behavior(&self, id: MockId, method: &str) -> Option<MethodBehaviorDescriptor> {
        self.behaviors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(id, method))
            .cloned()
    }

    pub fn contains(&self, id: MockId, method: &str) -> bool {
        self.behaviors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key(id, method))
    }

    pub fn configured_methods(&self, id: MockId) -> Vec<String> {
        let mut methods: Vec<String> = self
            .behaviors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, method)| method.clone())
            .collect();
        methods.sort();
        methods
    }
}

impl fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .behaviors
            .read()
            .map(|behaviors| behaviors.len())
            .unwrap_or_default();
        f.debug_struct("MockRegistry").field("behaviors", &count).finish()
    }
}

/// Why a configured method can never be intercepted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UninterceptableReason {
    Final,
    Private,
}

impl UninterceptableReason {
    fn of(method: &MethodDescriptor) -> Self {
        if method.is_final() {
            UninterceptableReason::Final
        } else {
            UninterceptableReason::Private
        }
    }
}

impl fmt::Display for UninterceptableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UninterceptableReason::Final => write!(f, "final"),
            UninterceptableReason::Private => write!(f, "private"),
        }
    }
}

/// Configuration attached to a final or private method. It is kept for
/// reporting only: such methods always run their original body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UninterceptableMethodWarning {
    pub mock_id: MockId,
    pub type_name: String,
    pub method: String,
    pub reason: UninterceptableReason,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for UninterceptableMethodWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}() is {} and cannot be mocked; its configuration has no effect",
            self.type_name, self.method, self.reason
        )?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

pub(crate) type UninterceptableLog = Arc<RwLock<Vec<UninterceptableMethodWarning>>>;

#[derive(Debug)]
pub(crate) struct MockBinding {
    pub id: MockId,
    pub target: Arc<TargetTypeDescriptor>,
    pub registry: MockRegistry,
    pub uninterceptable: UninterceptableLog,
    pub warn_on_uninterceptable: bool,
}

/// Entry point for configuring methods of the mock currently being built
#[derive(Clone, Debug, Default)]
pub struct MethodRegistry {
    binding: Option<Arc<MockBinding>>,
}

impl MethodRegistry {
    pub(crate) fn bound(binding: MockBinding) -> Self {
        Self {
            binding: Some(Arc::new(binding)),
        }
    }

    pub fn mock_id(&self) -> Option<MockId> {
        self.binding.as_ref().map(|binding| binding.id)
    }

    /// Creates or fetches the behavior descriptor of `name` on the current mock.
    ///
    /// Fails if no mock is bound or if `name` is neither declared on the
    /// target nor reachable through its catch-all handler. Final and private
    /// methods are accepted but logged, as their configuration cannot apply.
    pub fn method(&self, name: &str) -> Result<MethodConfig, MockError> {
        let binding = self
            .binding
            .clone()
            .ok_or_else(|| MockError::NoMockInstance(name.to_string()))?;

        let descriptor = binding.target.method(name).cloned();
        match &descriptor {
            None if !binding.target.has_catch_all() => {
                return Err(MockError::UnknownMethod {
                    type_name: binding.target.name().to_string(),
                    method: name.to_string(),
                });
            }
            Some(method) if !method.is_interceptable() => {
                Self::log_uninterceptable(&binding, method);
            }
            _ => {}
        }

        binding.registry.update(binding.id, name, |_| {});
        debug!(mock_id = %binding.id, method = name, "Configuring mocked method");

        Ok(MethodConfig {
            binding,
            method: name.to_string(),
            descriptor,
        })
    }

    fn log_uninterceptable(binding: &MockBinding, method: &MethodDescriptor) {
        let warning = UninterceptableMethodWarning {
            mock_id: binding.id,
            type_name: binding.target.name().to_string(),
            method: method.name().to_string(),
            reason: UninterceptableReason::of(method),
            location: method.location().cloned(),
        };
        if binding.warn_on_uninterceptable {
            warn!(mock_id = %binding.id, %warning, "Configured a method that cannot be intercepted");
        }
        let mut log = binding
            .uninterceptable
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !log.contains(&warning) {
            log.push(warning);
        }
    }

    /// Final and private methods that received configuration on this mock
    pub fn uninterceptable_methods(&self) -> Vec<UninterceptableMethodWarning> {
        let Some(binding) = &self.binding else {
            return Vec::new();
        };
        binding
            .uninterceptable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|warning| warning.mock_id == binding.id)
            .cloned()
            .collect()
    }

    /// Final methods that received configuration on this mock
    pub fn final_methods(&self) -> Vec<UninterceptableMethodWarning> {
        self.uninterceptable_methods()
            .into_iter()
            .filter(|warning| warning.reason == UninterceptableReason::Final)
            .collect()
    }

    pub fn has_final_methods(&self) -> bool {
        !self.final_methods().is_empty()
    }
}

/// Fluent configuration of one method. Every call writes straight through
/// to the registry entry of the mock it was created from.
#[derive(Clone, Debug)]
pub struct MethodConfig {
    binding: Arc<MockBinding>,
    method: String,
    descriptor: Option<MethodDescriptor>,
}

impl MethodConfig {
    fn update<F>(self, update: F) -> Self
    where
        F: FnOnce(&mut MethodBehaviorDescriptor),
    {
        self.binding
            .registry
            .update(self.binding.id, &self.method, update);
        self
    }

    pub fn name(&self) -> &str {
        &self.method
    }

    /// Signature of the method, `None` when it is only reachable through a catch-all
    pub fn descriptor(&self) -> Option<&MethodDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn behavior(&self) -> MethodBehaviorDescriptor {
        self.binding
            .registry
            .behavior(self.binding.id, &self.method)
            .unwrap_or_default()
    }

    /// Script the values returned by successive calls. Once the script is
    /// exhausted the first value is returned again.
    pub fn will_return<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.update(|behavior| behavior.return_values = values)
    }

    /// Raise `exception` on every call
    pub fn will_throw(self, exception: Exception) -> Self {
        self.update(|behavior| {
            behavior.throwable = Some(exception);
            behavior.throw_once = false;
        })
    }

    /// Raise `exception` on the first call only
    pub fn will_throw_once(self, exception: Exception) -> Self {
        self.update(|behavior| {
            behavior.throwable = Some(exception);
            behavior.throw_once = true;
        })
    }

    /// Delegate to the original implementation
    pub fn keep_original(self) -> Self {
        self.update(|behavior| behavior.keep_original = true)
    }

    /// Replace the method body with `wrapper`
    pub fn wrap<F>(self, wrapper: F) -> Result<Self, MockError>
    where
        F: Fn(&Original, Vec<Value>) -> CallResult + Send + Sync + 'static,
    {
        if self.binding.target.is_interface() {
            return Err(MockError::WrapOnInterface {
                type_name: self.binding.target.name().to_string(),
                method: self.method.clone(),
            });
        }
        Ok(self.update(|behavior| behavior.wrapper = Some(Arc::new(wrapper))))
    }

    pub fn called(self, times: usize) -> Self {
        self.update(|behavior| behavior.call_count.exact = Some(times))
    }

    pub fn called_at_least(self, times: usize) -> Self {
        self.update(|behavior| behavior.call_count.at_least = Some(times))
    }

    pub fn called_at_most(self, times: usize) -> Self {
        self.update(|behavior| behavior.call_count.at_most = Some(times))
    }

    pub fn has_been_called(self) -> Self {
        self.called_at_least(1)
    }

    /// Expect the first call to receive exactly these leading arguments
    pub fn with_arguments<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_arguments_for_calls([values])
    }

    /// One argument list per call, starting with the first call
    pub fn with_arguments_for_calls<C, I, V>(self, calls: C) -> Self
    where
        C: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let expectations: Vec<ArgumentExpectation> = calls
            .into_iter()
            .enumerate()
            .flat_map(|(call, values)| {
                values
                    .into_iter()
                    .enumerate()
                    .map(move |(position, value)| ArgumentExpectation {
                        call_index: call + 1,
                        position,
                        expected: value.into(),
                    })
            })
            .collect();
        self.update(|behavior| behavior.argument_expectations.extend(expectations))
    }

    /// Expect argument `position` of call `call_index` (1-based) to equal `value`
    pub fn with_argument_at(self, call_index: usize, position: usize, value: impl Into<Value>) -> Self {
        let expectation = ArgumentExpectation {
            call_index,
            position,
            expected: value.into(),
        };
        self.update(|behavior| behavior.argument_expectations.push(expectation))
    }

    fn assert_static(self, assertion: StaticAssertion) -> Self {
        self.update(|behavior| behavior.static_assertions.push(assertion))
    }

    pub fn is_public(self) -> Self {
        self.assert_static(StaticAssertion::IsPublic)
    }

    pub fn is_protected(self) -> Self {
        self.assert_static(StaticAssertion::IsProtected)
    }

    pub fn is_private(self) -> Self {
        self.assert_static(StaticAssertion::IsPrivate)
    }

    pub fn is_static(self) -> Self {
        self.assert_static(StaticAssertion::IsStatic)
    }

    pub fn is_abstract(self) -> Self {
        self.assert_static(StaticAssertion::IsAbstract)
    }

    pub fn is_final(self) -> Self {
        self.assert_static(StaticAssertion::IsFinal)
    }

    pub fn returns_reference(self) -> Self {
        self.assert_static(StaticAssertion::ReturnsReference)
    }

    pub fn has_return_type(self) -> Self {
        self.assert_static(StaticAssertion::HasReturnType)
    }

    pub fn return_type_is(self, declaration: &str) -> Self {
        self.assert_static(StaticAssertion::ReturnTypeIs(declaration.to_string()))
    }

    pub fn has_params(self) -> Self {
        self.assert_static(StaticAssertion::HasParams)
    }

    pub fn params_count(self, count: usize) -> Self {
        self.assert_static(StaticAssertion::ParamsCount(count))
    }

    pub fn has_doc_comment(self) -> Self {
        self.assert_static(StaticAssertion::HasDocComment)
    }

    pub fn param_has_type(self, position: usize) -> Self {
        self.assert_static(StaticAssertion::ParamHasType(position))
    }

    pub fn param_type_is(self, position: usize, declaration: &str) -> Self {
        self.assert_static(StaticAssertion::ParamTypeIs(position, declaration.to_string()))
    }

    pub fn param_has_default(self, position: usize) -> Self {
        self.assert_static(StaticAssertion::ParamHasDefault(position))
    }

    pub fn param_default_is(self, position: usize, value: impl Into<Value>) -> Self {
        self.assert_static(StaticAssertion::ParamDefaultIs(position, value.into()))
    }

    pub fn param_is_optional(self, position: usize) -> Self {
        self.assert_static(StaticAssertion::ParamIsOptional(position))
    }

    pub fn param_is_reference(self, position: usize) -> Self {
        self.assert_static(StaticAssertion::ParamIsReference(position))
    }

    pub fn param_is_variadic(self, position: usize) -> Self {
        self.assert_static(StaticAssertion::ParamIsVariadic(position))
    }
}
