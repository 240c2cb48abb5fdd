use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::{debug, info};
use unitmock_common::{
    CallError, ObjectRef, Value,
    reflect::{TargetTypeDescriptor, TypeCatalog, TypeDescriptorExtractor},
};

use crate::{
    MockError,
    data_type_mock::DataTypeMock,
    identity::MockId,
    inspector::MockInspector,
    ledger::InvocationLedger,
    mock::Mock,
    mock_object::{MockClass, MockObject, SynthesizedMethod},
    registry::{
        MethodConfig, MethodRegistry, MockBinding, MockRegistry, UninterceptableLog,
        UninterceptableMethodWarning,
    },
};

/// Stores shared by every mock of one session
#[derive(Clone, Debug)]
pub(crate) struct MockStores {
    pub registry: MockRegistry,
    pub ledger: InvocationLedger,
    pub data_types: DataTypeMock,
    pub uninterceptable: UninterceptableLog,
    pub warn_on_uninterceptable: bool,
}

impl Default for MockStores {
    fn default() -> Self {
        Self {
            registry: MockRegistry::new(),
            ledger: InvocationLedger::new(),
            data_types: DataTypeMock::new(),
            uninterceptable: Arc::new(RwLock::new(Vec::new())),
            warn_on_uninterceptable: true,
        }
    }
}

/// Builds one mock of a target type.
///
/// The mock identity is assigned up front so that methods can be configured
/// through [`MockBuilder::methods`] before [`MockBuilder::build`] is called.
#[derive(Debug)]
pub struct MockBuilder {
    catalog: Arc<TypeCatalog>,
    target: Arc<TargetTypeDescriptor>,
    id: MockId,
    methods: MethodRegistry,
    stores: MockStores,
}

impl MockBuilder {
    pub fn new(catalog: Arc<TypeCatalog>, type_name: &str, constructor_args: Vec<Value>) -> Result<Self, MockError> {
        Self::with_stores(catalog, type_name, constructor_args, MockStores::default())
    }

    pub(crate) fn with_stores(
        catalog: Arc<TypeCatalog>,
        type_name: &str,
        constructor_args: Vec<Value>,
        stores: MockStores,
    ) -> Result<Self, MockError> {
        let target = Arc::new(TypeDescriptorExtractor::new(&catalog).extract(type_name, constructor_args)?);
        let id = MockId::generate();
        debug!(
            mock_id = %id,
            type_name,
            methods = target.methods().len(),
            "Extracted mock target"
        );

        let methods = MethodRegistry::bound(MockBinding {
            id,
            target: Arc::clone(&target),
            registry: stores.registry.clone(),
            uninterceptable: Arc::clone(&stores.uninterceptable),
            warn_on_uninterceptable: stores.warn_on_uninterceptable,
        });

        Ok(Self {
            catalog,
            target,
            id,
            methods,
            stores,
        })
    }

    pub fn mock_id(&self) -> MockId {
        self.id
    }

    /// Name of the type that will be synthesized
    pub fn type_name(&self) -> String {
        self.id.type_name_for(self.target.name())
    }

    pub fn target(&self) -> &TargetTypeDescriptor {
        &self.target
    }

    /// Replaces the default value table used for unconfigured methods
    pub fn with_default_values(mut self, data_types: DataTypeMock) -> Self {
        self.stores.data_types = data_types;
        self
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

    pub fn has_final_methods(&self) -> bool {
        self.methods.has_final_methods()
    }

    /// Synthesizes the mock type and instantiates it, running the target's
    /// constructor with the constructor arguments given to the builder
    pub fn build(self) -> Result<Mock, MockError> {
        let class = synthesize(&self.catalog, Arc::clone(&self.target), self.id, &self.stores);
        let type_name = class.type_name.clone();
        let intercepted = class.methods.values().filter(|method| method.intercepted).count();

        let object = MockObject::instantiate(class, true).map_err(|source| MockError::Construction {
            type_name: self.target.name().to_string(),
            source,
        })?;

        info!(
            mock_id = %self.id,
            target = self.target.name(),
            %type_name,
            intercepted,
            "Built mock"
        );

        let inspector = MockInspector::new(
            self.id,
            Arc::clone(&self.target),
            self.stores.registry.clone(),
            self.stores.ledger.clone(),
        );
        Ok(Mock::new(object, inspector, self.methods))
    }
}

/// Builds the dispatch table of a mock type: every flattened method of the
/// target, intercepted unless it is final or private
pub(crate) fn synthesize(
    catalog: &Arc<TypeCatalog>,
    target: Arc<TargetTypeDescriptor>,
    id: MockId,
    stores: &MockStores,
) -> Arc<MockClass> {
    let methods: HashMap<String, SynthesizedMethod> = target
        .methods()
        .iter()
        .map(|descriptor| {
            let original = catalog
                .find_method(target.name(), descriptor.name())
                .and_then(|definition| definition.body.clone());
            let method = SynthesizedMethod {
                descriptor: descriptor.clone(),
                original,
                intercepted: descriptor.is_interceptable(),
            };
            (descriptor.name().to_string(), method)
        })
        .collect();

    let constructor = catalog
        .find_constructor(target.name())
        .and_then(|constructor| constructor.body.clone());
    let catch_all = catalog.find_catch_all(target.name()).cloned();

    Arc::new(MockClass {
        id,
        type_name: id.type_name_for(target.name()),
        target,
        catalog: Arc::clone(catalog),
        methods,
        constructor,
        catch_all,
        stores: stores.clone(),
    })
}

/// A fresh, unconfigured mock of `type_name` that skips its constructor.
/// Used as the default value of methods declared to return a known type.
pub(crate) fn synthesize_empty(parent: &MockClass, type_name: &str) -> Result<ObjectRef, CallError> {
    let target = TypeDescriptorExtractor::new(&parent.catalog).extract(type_name, Vec::new())?;
    let class = synthesize(&parent.catalog, Arc::new(target), MockId::generate(), &parent.stores);
    debug!(parent = %parent.id, mock_id = %class.id, type_name, "Synthesized default mock");
    let object: ObjectRef = MockObject::instantiate(class, false)?;
    Ok(object)
}

#[cfg(test)]
mod tests {
    use unitmock_common::testing::{USER_SERVICE, WAREHOUSE, fixture_catalog};

    use super::*;

    #[test]
    fn test_type_name_embeds_target_and_identity() {
        let builder = MockBuilder::new(fixture_catalog(), USER_SERVICE, vec![Value::Null]).unwrap();
        assert_eq!(builder.type_name(), format!("UserService_Mock_{}", builder.mock_id()));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let result = MockBuilder::new(fixture_catalog(), "Nope", Vec::new());
        assert!(matches!(result, Err(MockError::Reflect(_))));
    }

    #[test]
    fn test_final_and_private_methods_are_not_intercepted() {
        let catalog = fixture_catalog();
        let builder = MockBuilder::new(Arc::clone(&catalog), USER_SERVICE, vec![Value::Null]).unwrap();
        let class = synthesize(&catalog, Arc::clone(&builder.target), builder.id, &builder.stores);

        assert!(class.methods["sendEmail"].intercepted);
        assert!(class.methods["formatName"].intercepted);
        assert!(!class.methods["getName"].intercepted);
        assert!(!class.methods["secret"].intercepted);
    }

    #[test]
    fn test_interface_methods_have_no_original_body() {
        let catalog = fixture_catalog();
        let builder = MockBuilder::new(Arc::clone(&catalog), WAREHOUSE, Vec::new()).unwrap();
        let class = synthesize(&catalog, Arc::clone(&builder.target), builder.id, &builder.stores);

        assert!(class.methods.values().all(|method| method.original.is_none()));
        assert!(class.constructor.is_none());
    }
}
