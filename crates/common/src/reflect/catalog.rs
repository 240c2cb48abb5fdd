use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, trace};

use crate::{
    CallError, ReflectError, Value,
    object::{Object, ObjectRef},
    reflect::{
        CatchAllHandler, ClassDefinition, Constructor, MethodDefinition, TypeKind,
    },
};

type Result<T> = std::result::Result<T, ReflectError>;

/// In-process registry of type definitions, the introspection facility
/// consulted when building mocks
#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<String, Arc<ClassDefinition>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type. Parents and interfaces must be registered first.
    pub fn register(&mut self, definition: ClassDefinition) -> Result<()> {
        if self.types.contains_key(&definition.name) {
            return Err(ReflectError::DuplicateType(definition.name));
        }
        self.validate(&definition)?;

        debug!(
            type_name = definition.name,
            kind = %definition.kind,
            methods = definition.methods.len(),
            "Registered type"
        );
        self.types
            .insert(definition.name.clone(), Arc::new(definition));
        Ok(())
    }

    /// Builder-style variant of [`TypeCatalog::register`]
    pub fn with_type(mut self, definition: ClassDefinition) -> Result<Self> {
        self.register(definition)?;
        Ok(self)
    }

    fn validate(&self, definition: &ClassDefinition) -> Result<()> {
        let unknown = |missing: &str| ReflectError::UnknownReference {
            type_name: definition.name.clone(),
            missing: missing.to_string(),
        };

        if let Some(parent) = &definition.parent {
            match self.types.get(parent) {
                Some(p) if p.kind != TypeKind::Interface && definition.kind != TypeKind::Interface => {}
                _ => return Err(unknown(parent)),
            }
        }
        for interface in &definition.interfaces {
            match self.types.get(interface) {
                Some(i) if i.kind == TypeKind::Interface => {}
                _ => return Err(unknown(interface)),
            }
        }

        let mut seen = HashSet::new();
        for method in &definition.methods {
            let name = method.descriptor.name();
            if !seen.insert(name) {
                return Err(ReflectError::DuplicateMethod {
                    type_name: definition.name.clone(),
                    method: name.to_string(),
                });
            }
            if definition.kind == TypeKind::Interface && method.body.is_some() {
                return Err(ReflectError::InterfaceBody {
                    type_name: definition.name.clone(),
                    method: name.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&ClassDefinition> {
        self.types
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| ReflectError::NotFound(name.to_string()))
    }

    /// The type itself followed by its parent chain, then every interface
    /// reachable from any of them. Each type appears once.
    pub fn lineage(&self, name: &str) -> Vec<&ClassDefinition> {
        let mut chain = Vec::new();
        let mut current = self.types.get(name);
        while let Some(definition) = current {
            chain.push(definition.as_ref());
            current = definition
                .parent
                .as_ref()
                .and_then(|parent| self.types.get(parent));
        }

        let mut seen: HashSet<&str> = chain.iter().map(|d| d.name.as_str()).collect();
        let mut pending: Vec<&str> = chain
            .iter()
            .flat_map(|d| d.interfaces.iter().map(String::as_str))
            .collect();
        let mut index = 0;
        while index < pending.len() {
            let interface = pending[index];
            index += 1;
            if !seen.insert(interface) {
                continue;
            }
            if let Some(definition) = self.types.get(interface) {
                chain.push(definition.as_ref());
                pending.extend(definition.interfaces.iter().map(String::as_str));
            }
        }
        chain
    }

    /// Resolves a method by walking the lineage; concrete bodies win over
    /// abstract declarations further up
    pub fn find_method(&self, type_name: &str, method: &str) -> Option<&MethodDefinition> {
        let mut declaration = None;
        for definition in self.lineage(type_name) {
            if let Some(found) = definition.own_method(method) {
                if found.body.is_some() {
                    return Some(found);
                }
                declaration.get_or_insert(found);
            }
        }
        declaration
    }

    pub fn find_constructor(&self, type_name: &str) -> Option<&Constructor> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|definition| definition.constructor.as_ref())
    }

    pub fn find_catch_all(&self, type_name: &str) -> Option<&CatchAllHandler> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|definition| definition.catch_all.as_ref())
    }

    pub fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        self.lineage(type_name)
            .iter()
            .any(|definition| definition.name == ancestor)
    }

    /// Creates a plain, non-mocked instance and runs its constructor
    pub fn instantiate(self: &Arc<Self>, name: &str, args: Vec<Value>) -> std::result::Result<ObjectRef, CallError> {
        let definition = self.get(name)?;
        if !definition.kind.is_instantiable() {
            return Err(CallError::NotInstantiable {
                class: name.to_string(),
                kind: definition.kind.to_string(),
            });
        }

        trace!(type_name = name, args = args.len(), "Instantiating type");
        let object = Object::new(Arc::clone(self), name);
        let this: ObjectRef = object;
        if let Some(body) = self
            .find_constructor(name)
            .and_then(|constructor| constructor.body.as_ref())
        {
            body(&crate::reflect::CallFrame::new(Arc::clone(&this), args))?;
        }
        Ok(this)
    }
}
