use std::sync::{Arc, PoisonError};

use tracing::info;
use unitmock_common::{CallError, EngineConfig, ObjectRef, Value, reflect::TypeCatalog};

use crate::{
    InstanceWrapper, MockError,
    builder::{MockBuilder, MockStores},
    data_type_mock::DataTypeMock,
    ledger::InvocationLedger,
    mock::Mock,
    registry::{MethodRegistry, MockRegistry, UninterceptableMethodWarning, UninterceptableReason},
};

/// Owns the type catalog and the stores shared by every mock built from it.
///
/// Entries are partitioned by mock identity, so one session can serve any
/// number of tests and mocks without their configuration leaking.
#[derive(Clone, Debug)]
pub struct MockSession {
    catalog: Arc<TypeCatalog>,
    stores: MockStores,
}

impl MockSession {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            stores: MockStores::default(),
        }
    }

    pub fn with_config(catalog: Arc<TypeCatalog>, config: &EngineConfig) -> Result<Self, MockError> {
        config.validate()?;
        let stores = MockStores {
            data_types: DataTypeMock::from_config(config),
            warn_on_uninterceptable: config.warn_on_final_methods,
            ..MockStores::default()
        };
        info!(
            default_values = config.default_values.len(),
            bound_default_values = config.bound_default_values.len(),
            warn_on_final_methods = config.warn_on_final_methods,
            "Created mock session"
        );
        Ok(Self { catalog, stores })
    }

    /// Loads [`EngineConfig`] from the `unitmock` file and `UNITMOCK__*` variables
    pub fn from_environment(catalog: Arc<TypeCatalog>) -> Result<Self, MockError> {
        let config = EngineConfig::load()?;
        Self::with_config(catalog, &config)
    }

    /// Replaces the default value table for mocks built from now on
    pub fn with_default_values(mut self, data_types: DataTypeMock) -> Self {
        self.stores.data_types = data_types;
        self
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn data_types(&self) -> &DataTypeMock {
        &self.stores.data_types
    }

    pub fn registry(&self) -> &MockRegistry {
        &self.stores.registry
    }

    pub fn ledger(&self) -> &InvocationLedger {
        &self.stores.ledger
    }

    pub fn mock_builder(&self, type_name: &str, constructor_args: Vec<Value>) -> Result<MockBuilder, MockError> {
        MockBuilder::with_stores(
            Arc::clone(&self.catalog),
            type_name,
            constructor_args,
            self.stores.clone(),
        )
    }

    /// Configures and builds a mock in one step
    pub fn mock<F>(&self, type_name: &str, constructor_args: Vec<Value>, configure: F) -> Result<Mock, MockError>
    where
        F: FnOnce(&MethodRegistry) -> Result<(), MockError>,
    {
        let builder = self.mock_builder(type_name, constructor_args)?;
        configure(builder.methods())?;
        builder.build()
    }

    /// A plain, non-mocked instance from the session's catalog
    pub fn instantiate(&self, type_name: &str, args: Vec<Value>) -> Result<ObjectRef, CallError> {
        self.catalog.instantiate(type_name, args)
    }

    pub fn wrap(&self, instance: ObjectRef) -> InstanceWrapper {
        InstanceWrapper::new(instance)
    }

    /// Every final or private method configured on any mock of this session
    pub fn uninterceptable_method_warnings(&self) -> Vec<UninterceptableMethodWarning> {
        self.stores
            .uninterceptable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The subset of [`Self::uninterceptable_method_warnings`] caused by final methods
    pub fn final_method_warnings(&self) -> Vec<UninterceptableMethodWarning> {
        self.uninterceptable_method_warnings()
            .into_iter()
            .filter(|warning| warning.reason == UninterceptableReason::Final)
            .collect()
    }

    pub fn has_final_method_warnings(&self) -> bool {
        !self.final_method_warnings().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use unitmock_common::{
        Instance,
        testing::{MAILER, MAILER_INTERFACE, USER_SERVICE, WAREHOUSE, fixture_catalog},
    };

    use super::*;
    use crate::{ExpectationKind, test_support::fixture_session};

    #[test]
    fn test_unknown_method_is_rejected() {
        let result = fixture_session().mock(USER_SERVICE, vec![Value::Null], |methods| {
            methods.method("launchRocket")?.will_return([true]);
            Ok(())
        });
        assert!(matches!(
            result,
            Err(MockError::UnknownMethod { type_name, method })
                if type_name == USER_SERVICE && method == "launchRocket"
        ));
    }

    #[test]
    fn test_wrap_on_interface_is_rejected() {
        let result = fixture_session().mock(MAILER_INTERFACE, vec![], |methods| {
            methods.method("send")?.wrap(|_, _| Ok(Value::Bool(false)))?;
            Ok(())
        });
        assert!(matches!(result, Err(MockError::WrapOnInterface { .. })));
    }

    #[test]
    fn test_builder_and_plain_instances() {
        let session = fixture_session();
        let builder = session.mock_builder(USER_SERVICE, vec![Value::Null]).unwrap();
        assert!(builder.build().is_ok());

        let error = session.instantiate(MAILER_INTERFACE, vec![]).unwrap_err();
        assert!(matches!(error, CallError::NotInstantiable { .. }));
    }

    #[test]
    fn test_verify_reports_call_count_and_arguments() -> anyhow::Result<()> {
        let mock = fixture_session().mock(USER_SERVICE, vec![Value::Null], |methods| {
            methods
                .method("sendEmail")?
                .called(2)
                .with_arguments_for_calls([["a@b.com"], ["c@d.com"]]);
            methods.method("nextId")?.has_been_called();
            Ok(())
        })?;

        mock.call("sendEmail", vec!["a@b.com".into()])?;
        mock.call("sendEmail", vec!["x@y.com".into()])?;

        let outcomes = mock.inspector().verify();
        assert_eq!(outcomes.len(), 4);

        let failures = mock.inspector().failures();
        assert_eq!(failures.len(), 2, "unexpected failures: {failures:?}");
        assert_eq!(failures[0].method, "nextId");
        assert_eq!(failures[0].kind, ExpectationKind::CallCount);
        assert_eq!(failures[0].actual, "0");
        assert_eq!(failures[1].method, "sendEmail");
        assert_eq!(failures[1].kind, ExpectationKind::Argument);
        assert_eq!(failures[1].expected, "\"c@d.com\"");
        assert_eq!(failures[1].actual, "\"x@y.com\"");
        assert!(!mock.inspector().is_satisfied());

        mock.call("nextId", vec![])?;
        assert_eq!(mock.inspector().failures().len(), 1);
        Ok(())
    }

    #[test]
    fn test_verify_reports_signature_checks() -> anyhow::Result<()> {
        let mock = fixture_session().mock(USER_SERVICE, vec![Value::Null], |methods| {
            methods
                .method("sendEmail")?
                .is_public()
                .has_doc_comment()
                .return_type_is("string")
                .params_count(1)
                .param_type_is(0, "string");
            methods
                .method("register")?
                .param_is_optional(1)
                .param_default_is(1, Value::Null)
                .param_is_variadic(2)
                .param_has_default(0);
            methods.method("notify")?.param_is_reference(1).is_static();
            Ok(())
        })?;

        let failures = mock.inspector().failures();
        let failed: Vec<(&str, &str)> = failures
            .iter()
            .map(|outcome| (outcome.method.as_str(), outcome.description.as_str()))
            .collect();
        assert_eq!(
            failed,
            vec![
                ("notify", "is static"),
                ("register", "parameter 0 has a default"),
            ]
        );
        assert!(failures.iter().all(|outcome| outcome.kind == ExpectationKind::Signature));
        Ok(())
    }

    #[test]
    fn test_last_call_is_recorded_with_arguments() -> anyhow::Result<()> {
        let mock = fixture_session().mock(USER_SERVICE, vec![Value::Null], |_| Ok(()))?;
        mock.call("register", vec!["a@b.com".into(), Value::Null, "admin".into()])?;
        mock.call("register", vec!["c@d.com".into()])?;

        let inspector = mock.inspector();
        assert_eq!(inspector.calls("register").len(), 2);
        let last = inspector.last_call("register").expect("register was called");
        assert_eq!(last.args, vec![Value::from("c@d.com")]);
        assert_eq!(inspector.called_methods(), vec!["register".to_string()]);
        assert!(!inspector.was_called("sendEmail"));
        Ok(())
    }

    #[test]
    fn test_config_overrides_defaults() -> anyhow::Result<()> {
        let config = EngineConfig {
            default_values: HashMap::from([("string".to_string(), serde_json::json!("configured"))]),
            bound_default_values: HashMap::from([("label".to_string(), serde_json::json!("bound"))]),
            warn_on_final_methods: false,
        };
        let session = MockSession::with_config(fixture_catalog(), &config)?;
        let mock = session.mock(WAREHOUSE, vec![], |_| Ok(()))?;

        assert_eq!(mock.call("label", vec![])?, Value::from("bound"));
        assert_eq!(mock.call("maybeLabel", vec![])?, Value::from("configured"));
        assert_eq!(mock.call("count", vec![])?, Value::Int(123_456));
        Ok(())
    }

    #[test]
    fn test_camel_case_bound_default_from_file() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("unitmock-session-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("bound.toml");
        std::fs::write(
            &path,
            "[bound_default_values]\ngetFromEmail = \"from-file@example.com\"\n",
        )?;

        let config = EngineConfig::load_from_file(&path.to_string_lossy());
        std::fs::remove_dir_all(&dir)?;
        let session = MockSession::with_config(fixture_catalog(), &config?)?;
        let mock = session.mock(MAILER, vec![], |_| Ok(()))?;

        assert_eq!(
            mock.call("getFromEmail", vec![])?,
            Value::from("from-file@example.com"),
            "config keys are read lowercased and must still match the method"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            default_values: HashMap::from([("void".to_string(), serde_json::json!(1))]),
            ..EngineConfig::default()
        };
        assert!(matches!(
            MockSession::with_config(fixture_catalog(), &config),
            Err(MockError::Config(_))
        ));
    }

    #[test]
    fn test_session_default_values_apply_to_new_mocks() -> anyhow::Result<()> {
        let session = fixture_session()
            .with_default_values(DataTypeMock::new().with_bound_default("getFromEmail", "stub@example.com"));
        let mock = session.mock(MAILER, vec![], |_| Ok(()))?;

        assert_eq!(mock.call("getFromEmail", vec![])?, Value::from("stub@example.com"));
        Ok(())
    }

    #[test]
    fn test_wrap_live_instance() -> anyhow::Result<()> {
        let session = fixture_session();
        let mailer = session.instantiate(MAILER, vec!["ops@example.com".into()])?;
        let wrapper = session.wrap(mailer);
        wrapper.override_method("send", |_, _| Ok(Value::Bool(false)))?;

        let wrapped = wrapper.into_object();
        assert_eq!(wrapped.call("send", vec!["a".into(), "b".into()])?, Value::Bool(false));
        assert_eq!(wrapped.call("getFromEmail", vec![])?, Value::from("ops@example.com"));
        assert!(wrapped.is_instance_of(MAILER_INTERFACE));
        Ok(())
    }
}
