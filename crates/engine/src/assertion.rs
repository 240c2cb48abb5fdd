use std::fmt;

use unitmock_common::{Value, reflect::MethodDescriptor};

use crate::ledger::CallRecord;

/// Expected number of calls. Any combination of bounds may be set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCountSpec {
    pub exact: Option<usize>,
    pub at_least: Option<usize>,
    pub at_most: Option<usize>,
}

impl CallCountSpec {
    pub fn is_empty(&self) -> bool {
        self.exact.is_none() && self.at_least.is_none() && self.at_most.is_none()
    }

    pub(crate) fn evaluate(&self, actual: usize) -> Vec<Check> {
        let mut checks = Vec::new();
        if let Some(expected) = self.exact {
            checks.push(Check::new(
                format!("called exactly {expected} time(s)"),
                expected.to_string(),
                actual.to_string(),
                actual == expected,
            ));
        }
        if let Some(minimum) = self.at_least {
            checks.push(Check::new(
                format!("called at least {minimum} time(s)"),
                format!(">= {minimum}"),
                actual.to_string(),
                actual >= minimum,
            ));
        }
        if let Some(maximum) = self.at_most {
            checks.push(Check::new(
                format!("called at most {maximum} time(s)"),
                format!("<= {maximum}"),
                actual.to_string(),
                actual <= maximum,
            ));
        }
        checks
    }
}

/// Argument `position` of call number `call_index` (1-based) must equal `expected`
#[derive(Clone, Debug, PartialEq)]
pub struct ArgumentExpectation {
    pub call_index: usize,
    pub position: usize,
    pub expected: Value,
}

impl ArgumentExpectation {
    pub(crate) fn evaluate(&self, record: Option<&CallRecord>) -> Check {
        let actual = record
            .and_then(|r| r.arguments(self.call_index))
            .map(|args| args.get(self.position));
        let (actual_text, passed) = match actual {
            None => ("<no such call>".to_string(), false),
            Some(None) => ("<missing argument>".to_string(), false),
            Some(Some(value)) => (value.to_string(), *value == self.expected),
        };
        Check::new(
            format!(
                "argument {} of call {} equals {}",
                self.position, self.call_index, self.expected
            ),
            self.expected.to_string(),
            actual_text,
            passed,
        )
    }
}

/// Checks evaluated against the method's signature only
#[derive(Clone, Debug, PartialEq)]
pub enum StaticAssertion {
    IsPublic,
    IsProtected,
    IsPrivate,
    IsStatic,
    IsAbstract,
    IsFinal,
    ReturnsReference,
    HasReturnType,
    ReturnTypeIs(String),
    HasParams,
    ParamsCount(usize),
    HasDocComment,
    ParamHasType(usize),
    ParamTypeIs(usize, String),
    ParamHasDefault(usize),
    ParamDefaultIs(usize, Value),
    ParamIsOptional(usize),
    ParamIsReference(usize),
    ParamIsVariadic(usize),
}

impl StaticAssertion {
    pub(crate) fn evaluate(&self, method: Option<&MethodDescriptor>) -> Check {
        let Some(method) = method else {
            return Check::new(self.to_string(), "declared method", "<undeclared>", false);
        };
        let flag = |passed: bool| (passed.to_string(), passed);

        let (actual, passed) = match self {
            StaticAssertion::IsPublic => flag(method.is_public()),
            StaticAssertion::IsProtected => flag(method.is_protected()),
            StaticAssertion::IsPrivate => flag(method.is_private()),
            StaticAssertion::IsStatic => flag(method.is_static()),
            StaticAssertion::IsAbstract => flag(method.is_abstract()),
            StaticAssertion::IsFinal => flag(method.is_final()),
            StaticAssertion::ReturnsReference => flag(method.returns_reference()),
            StaticAssertion::HasReturnType => flag(method.return_type().is_some()),
            StaticAssertion::ReturnTypeIs(expected) => match method.return_type() {
                Some(declared) => (declared.to_string(), declared.matches(expected)),
                None => ("<untyped>".to_string(), false),
            },
            StaticAssertion::HasParams => flag(!method.parameters().is_empty()),
            StaticAssertion::ParamsCount(expected) => {
                let count = method.parameters().len();
                (count.to_string(), count == *expected)
            }
            StaticAssertion::HasDocComment => flag(method.doc_comment().is_some()),
            StaticAssertion::ParamHasType(position)
            | StaticAssertion::ParamTypeIs(position, _)
            | StaticAssertion::ParamHasDefault(position)
            | StaticAssertion::ParamDefaultIs(position, _)
            | StaticAssertion::ParamIsOptional(position)
            | StaticAssertion::ParamIsReference(position)
            | StaticAssertion::ParamIsVariadic(position) => match method.parameter(*position) {
                None => ("<no such parameter>".to_string(), false),
                Some(param) => match self {
                    StaticAssertion::ParamHasType(_) => flag(param.declared_type().is_some()),
                    StaticAssertion::ParamTypeIs(_, expected) => match param.declared_type() {
                        Some(declared) => (declared.to_string(), declared.matches(expected)),
                        None => ("<untyped>".to_string(), false),
                    },
                    StaticAssertion::ParamHasDefault(_) => flag(param.has_default()),
                    StaticAssertion::ParamDefaultIs(_, expected) => match param.default_value() {
                        Some(value) => (value.to_string(), value == expected),
                        None => ("<no default>".to_string(), false),
                    },
                    StaticAssertion::ParamIsOptional(_) => flag(param.is_optional()),
                    StaticAssertion::ParamIsReference(_) => flag(param.is_by_reference()),
                    _ => flag(param.is_variadic()),
                },
            },
        };

        Check::new(self.to_string(), self.expected(), actual, passed)
    }

    fn expected(&self) -> String {
        match self {
            StaticAssertion::ReturnTypeIs(t) | StaticAssertion::ParamTypeIs(_, t) => t.clone(),
            StaticAssertion::ParamsCount(n) => n.to_string(),
            StaticAssertion::ParamDefaultIs(_, v) => v.to_string(),
            _ => "true".to_string(),
        }
    }
}

impl fmt::Display for StaticAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticAssertion::IsPublic => write!(f, "is public"),
            StaticAssertion::IsProtected => write!(f, "is protected"),
            StaticAssertion::IsPrivate => write!(f, "is private"),
            StaticAssertion::IsStatic => write!(f, "is static"),
            StaticAssertion::IsAbstract => write!(f, "is abstract"),
            StaticAssertion::IsFinal => write!(f, "is final"),
            StaticAssertion::ReturnsReference => write!(f, "returns by reference"),
            StaticAssertion::HasReturnType => write!(f, "has a return type"),
            StaticAssertion::ReturnTypeIs(t) => write!(f, "return type is {t}"),
            StaticAssertion::HasParams => write!(f, "has parameters"),
            StaticAssertion::ParamsCount(n) => write!(f, "has {n} parameter(s)"),
            StaticAssertion::HasDocComment => write!(f, "has a doc comment"),
            StaticAssertion::ParamHasType(p) => write!(f, "parameter {p} has a type"),
            StaticAssertion::ParamTypeIs(p, t) => write!(f, "parameter {p} type is {t}"),
            StaticAssertion::ParamHasDefault(p) => write!(f, "parameter {p} has a default"),
            StaticAssertion::ParamDefaultIs(p, v) => write!(f, "parameter {p} default is {v}"),
            StaticAssertion::ParamIsOptional(p) => write!(f, "parameter {p} is optional"),
            StaticAssertion::ParamIsReference(p) => write!(f, "parameter {p} is by reference"),
            StaticAssertion::ParamIsVariadic(p) => write!(f, "parameter {p} is variadic"),
        }
    }
}

/// Result of one evaluated check
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Check {
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

impl Check {
    fn new(
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        passed: bool,
    ) -> Self {
        Self {
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
            passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitmock_common::{
        DeclaredType,
        reflect::{ParameterDescriptor, Visibility},
    };

    fn send_email() -> MethodDescriptor {
        MethodDescriptor::new("sendEmail", Visibility::Public)
            .param(ParameterDescriptor::typed("email", DeclaredType::named("string")))
            .param(ParameterDescriptor::new("cc").with_default(Value::Null))
            .returns(DeclaredType::named("string"))
    }

    #[test]
    fn test_call_count_bounds() {
        let spec = CallCountSpec {
            exact: None,
            at_least: Some(1),
            at_most: Some(2),
        };
        assert!(spec.evaluate(1).iter().all(|c| c.passed));
        assert!(spec.evaluate(0).iter().any(|c| !c.passed));
        assert!(spec.evaluate(3).iter().any(|c| !c.passed));
        assert!(CallCountSpec::default().evaluate(10).is_empty());
    }

    #[test]
    fn test_static_assertions() {
        let method = send_email();
        let passes = |assertion: StaticAssertion| assertion.evaluate(Some(&method)).passed;

        assert!(passes(StaticAssertion::IsPublic));
        assert!(!passes(StaticAssertion::IsStatic));
        assert!(passes(StaticAssertion::ReturnTypeIs("string".to_string())));
        assert!(passes(StaticAssertion::ParamsCount(2)));
        assert!(passes(StaticAssertion::ParamHasType(0)));
        assert!(passes(StaticAssertion::ParamTypeIs(0, "string".to_string())));
        assert!(!passes(StaticAssertion::ParamHasType(1)));
        assert!(passes(StaticAssertion::ParamIsOptional(1)));
        assert!(passes(StaticAssertion::ParamDefaultIs(1, Value::Null)));
        assert!(!passes(StaticAssertion::ParamIsVariadic(0)));
        assert!(!passes(StaticAssertion::HasDocComment));
    }

    #[test]
    fn test_static_assertion_on_missing_parameter() {
        let method = send_email();
        let check = StaticAssertion::ParamIsReference(5).evaluate(Some(&method));
        assert!(!check.passed);
        assert_eq!(check.actual, "<no such parameter>");
    }

    #[test]
    fn test_argument_expectation_without_call() {
        let expectation = ArgumentExpectation {
            call_index: 2,
            position: 0,
            expected: Value::from("a@b.com"),
        };
        let check = expectation.evaluate(None);
        assert!(!check.passed);
        assert_eq!(check.actual, "<no such call>");
    }
}
