use std::{fmt, sync::Arc};

use unitmock_common::{CallResult, Exception, Value};

use crate::{
    assertion::{ArgumentExpectation, CallCountSpec, StaticAssertion},
    mock_object::Original,
};

/// Replacement body for a mocked method. Receives the original
/// implementation handle and the forwarded arguments.
pub type WrapFn = Arc<dyn Fn(&Original, Vec<Value>) -> CallResult + Send + Sync>;

/// Configured behavior and expectations of one method of one mock
#[derive(Clone, Default)]
pub struct MethodBehaviorDescriptor {
    pub(crate) return_values: Vec<Value>,
    pub(crate) throwable: Option<Exception>,
    pub(crate) throw_once: bool,
    pub(crate) wrapper: Option<WrapFn>,
    pub(crate) keep_original: bool,
    pub(crate) call_count: CallCountSpec,
    pub(crate) argument_expectations: Vec<ArgumentExpectation>,
    pub(crate) static_assertions: Vec<StaticAssertion>,
}

impl MethodBehaviorDescriptor {
    pub fn return_values(&self) -> &[Value] {
        &self.return_values
    }

    pub fn throwable(&self) -> Option<&Exception> {
        self.throwable.as_ref()
    }

    pub fn throws_once(&self) -> bool {
        self.throw_once
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapper.is_some()
    }

    pub fn keeps_original(&self) -> bool {
        self.keep_original
    }

    pub fn call_count(&self) -> &CallCountSpec {
        &self.call_count
    }

    pub fn argument_expectations(&self) -> &[ArgumentExpectation] {
        &self.argument_expectations
    }

    pub fn static_assertions(&self) -> &[StaticAssertion] {
        &self.static_assertions
    }

    /// Whether the configured exception fires on call number `call_index`
    pub(crate) fn raises_on(&self, call_index: usize) -> Option<&Exception> {
        self.throwable
            .as_ref()
            .filter(|_| !self.throw_once || call_index == 1)
    }

    /// Scripted value for call number `call_index`; past the end of the
    /// script the first value is returned again
    pub(crate) fn scripted_value(&self, call_index: usize) -> Option<&Value> {
        call_index
            .checked_sub(1)
            .and_then(|i| self.return_values.get(i))
            .or_else(|| self.return_values.first())
    }
}

impl fmt::Debug for MethodBehaviorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBehaviorDescriptor")
            .field("return_values", &self.return_values)
            .field("throwable", &self.throwable)
            .field("throw_once", &self.throw_once)
            .field("wrapped", &self.wrapper.is_some())
            .field("keep_original", &self.keep_original)
            .field("call_count", &self.call_count)
            .field("argument_expectations", &self.argument_expectations)
            .field("static_assertions", &self.static_assertions)
            .finish()
    }
}
