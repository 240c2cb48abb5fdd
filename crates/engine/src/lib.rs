//! Mock generation engine.
//!
//! A [`MockSession`] extracts the shape of a target type from a
//! [`TypeCatalog`](unitmock_common::reflect::TypeCatalog), lets a test
//! configure its methods and synthesizes an intercepting [`Mock`]. Calls are
//! recorded in the session's [`InvocationLedger`]; configured expectations
//! are read back through [`MockInspector::verify`].

mod assertion;
mod behavior;
mod builder;
mod data_type_mock;
mod error;
mod identity;
mod inspector;
mod ledger;
mod mock;
mod mock_object;
mod registry;
mod session;
mod wrapper;

#[cfg(test)]
mod test_support;

pub use assertion::{ArgumentExpectation, CallCountSpec, StaticAssertion};
pub use behavior::{MethodBehaviorDescriptor, WrapFn};
pub use builder::MockBuilder;
pub use data_type_mock::{DataTypeMock, Synthesized};
pub use error::{MockError, WrapperError};
pub use identity::MockId;
pub use inspector::{ExpectationKind, ExpectationOutcome, MockInspector};
pub use ledger::{CallRecord, InvocationLedger, RecordedCall};
pub use mock::Mock;
pub use mock_object::{MockObject, Original};
pub use registry::{
    MethodConfig, MethodRegistry, MockRegistry, UninterceptableMethodWarning, UninterceptableReason,
};
pub use session::MockSession;
pub use wrapper::{InstanceWrapper, WrapperFn};
