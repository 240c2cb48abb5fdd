use std::{fmt, sync::Arc};

use tracing::debug;
use unitmock_common::{Value, reflect::TargetTypeDescriptor};

use crate::{
    assertion::Check,
    behavior::MethodBehaviorDescriptor,
    identity::MockId,
    ledger::{InvocationLedger, RecordedCall},
    registry::MockRegistry,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectationKind {
    CallCount,
    Argument,
    Signature,
}

impl fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectationKind::CallCount => write!(f, "call count"),
            ExpectationKind::Argument => write!(f, "argument"),
            ExpectationKind::Signature => write!(f, "signature"),
        }
    }
}

/// Outcome of one configured expectation, with enough detail for a test
/// framework to report a failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectationOutcome {
    pub method: String,
    pub kind: ExpectationKind,
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

impl ExpectationOutcome {
    fn from_check(method: &str, kind: ExpectationKind, check: Check) -> Self {
        Self {
            method: method.to_string(),
            kind,
            description: check.description,
            expected: check.expected,
            actual: check.actual,
            passed: check.passed,
        }
    }
}

impl fmt::Display for ExpectationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "ok" } else { "FAILED" };
        write!(
            f,
            "{}() {}: {} [{status}] (expected {}, actual {})",
            self.method, self.kind, self.description, self.expected, self.actual
        )
    }
}

/// Read access to the recorded calls and configured expectations of one mock
#[derive(Clone, Debug)]
pub struct MockInspector {
    id: MockId,
    target: Arc<TargetTypeDescriptor>,
    registry: MockRegistry,
    ledger: InvocationLedger,
}

impl MockInspector {
    pub(crate) fn new(
        id: MockId,
        target: Arc<TargetTypeDescriptor>,
        registry: MockRegistry,
        ledger: InvocationLedger,
    ) -> Self {
        Self {
            id,
            target,
            registry,
            ledger,
        }
    }

    pub fn mock_id(&self) -> MockId {
        self.id
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.ledger.call_count(self.id, method)
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    /// Arguments of every recorded call, oldest first
    pub fn calls(&self, method: &str) -> Vec<Vec<Value>> {
        self.ledger
            .record(self.id, method)
            .map(|record| record.calls().iter().map(|call| call.args.clone()).collect())
            .unwrap_or_default()
    }

    pub fn last_call(&self, method: &str) -> Option<RecordedCall> {
        self.ledger
            .record(self.id, method)
            .and_then(|record| record.last().cloned())
    }

    pub fn called_methods(&self) -> Vec<String> {
        self.ledger.called_methods(self.id)
    }

    pub fn behavior(&self, method: &str) -> Option<MethodBehaviorDescriptor> {
        self.registry.behavior(self.id, method)
    }

    /// Evaluates every call count, argument and signature expectation
    /// configured on this mock, in method name order
    pub fn verify(&self) -> Vec<ExpectationOutcome> {
        let mut outcomes = Vec::new();
        for method in self.registry.configured_methods(self.id) {
            let Some(behavior) = self.registry.behavior(self.id, &method) else {
                continue;
            };
            let record = self.ledger.record(self.id, &method);
            let count = record.as_ref().map_or(0, |record| record.count());

            outcomes.extend(
                behavior
                    .call_count()
                    .evaluate(count)
                    .into_iter()
                    .map(|check| ExpectationOutcome::from_check(&method, ExpectationKind::CallCount, check)),
            );
            outcomes.extend(behavior.argument_expectations().iter().map(|expectation| {
                ExpectationOutcome::from_check(
                    &method,
                    ExpectationKind::Argument,
                    expectation.evaluate(record.as_ref()),
                )
            }));

            let descriptor = self.target.method(&method);
            outcomes.extend(behavior.static_assertions().iter().map(|assertion| {
                ExpectationOutcome::from_check(&method, ExpectationKind::Signature, assertion.evaluate(descriptor))
            }));
        }

        debug!(
            mock_id = %self.id,
            checks = outcomes.len(),
            failed = outcomes.iter().filter(|outcome| !outcome.passed).count(),
            "Verified mock expectations"
        );
        outcomes
    }

    pub fn failures(&self) -> Vec<ExpectationOutcome> {
        self.verify().into_iter().filter(|outcome| !outcome.passed).collect()
    }

    pub fn is_satisfied(&self) -> bool {
        self.verify().iter().all(|outcome| outcome.passed)
    }
}
