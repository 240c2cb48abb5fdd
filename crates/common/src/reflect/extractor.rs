use std::collections::HashSet;

use tracing::debug;

use crate::{
    ReflectError, Value,
    reflect::{TargetTypeDescriptor, TypeCatalog},
};

/// Reads a [`TargetTypeDescriptor`] out of a [`TypeCatalog`]
#[derive(Clone, Copy, Debug)]
pub struct TypeDescriptorExtractor<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> TypeDescriptorExtractor<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Flattens the type's lineage into one ordered method list: own methods
    /// in declaration order, then inherited ones that were not overridden.
    /// Abstract declarations are replaced by the first concrete body found.
    pub fn extract(
        &self,
        type_name: &str,
        constructor_args: Vec<Value>,
    ) -> Result<TargetTypeDescriptor, ReflectError> {
        let definition = self.catalog.get(type_name)?;

        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        for ancestor in self.catalog.lineage(type_name) {
            for method in ancestor.methods() {
                let name = method.descriptor.name();
                if seen.insert(name) {
                    let resolved = self
                        .catalog
                        .find_method(type_name, name)
                        .map_or(&method.descriptor, |found| &found.descriptor);
                    methods.push(resolved.clone());
                }
            }
        }

        let constructor_parameters = self
            .catalog
            .find_constructor(type_name)
            .map(|constructor| constructor.parameters.clone())
            .unwrap_or_default();

        debug!(
            type_name,
            kind = %definition.kind(),
            methods = methods.len(),
            "Extracted type descriptor"
        );

        Ok(TargetTypeDescriptor {
            name: type_name.to_string(),
            kind: definition.kind(),
            constructor_parameters,
            constructor_args,
            methods,
            has_catch_all: self.catalog.find_catch_all(type_name).is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DeclaredType,
        reflect::{ClassDefinition, MethodDescriptor},
    };

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with_type(
                ClassDefinition::interface("Greeter")
                    .abstract_method(MethodDescriptor::public("greet"))
                    .abstract_method(MethodDescriptor::public("farewell")),
            )
            .unwrap()
            .with_type(
                ClassDefinition::class("Base")
                    .implements("Greeter")
                    .method(MethodDescriptor::public("greet"), |_| Ok("hi".into()))
                    .method(
                        MethodDescriptor::public("id").as_final().returns(DeclaredType::named("int")),
                        |_| Ok(1.into()),
                    ),
            )
            .unwrap()
            .with_type(
                ClassDefinition::class("Child")
                    .extends("Base")
                    .method(MethodDescriptor::public("extra"), |_| Ok(Value::Null))
                    .method(MethodDescriptor::public("greet"), |_| Ok("hello".into())),
            )
            .unwrap()
    }

    #[test]
    fn test_extract_flattens_hierarchy() {
        let catalog = catalog();
        let descriptor = TypeDescriptorExtractor::new(&catalog)
            .extract("Child", vec![])
            .unwrap();

        let names: Vec<_> = descriptor.methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["extra", "greet", "id", "farewell"]);
        assert_eq!(descriptor.method("greet").unwrap().declaring_type(), "Child");
        assert_eq!(descriptor.method("id").unwrap().declaring_type(), "Base");
        assert!(descriptor.method("farewell").unwrap().is_abstract());
        assert!(!descriptor.is_interface());
    }

    #[test]
    fn test_extract_separates_final_methods() {
        let catalog = catalog();
        let descriptor = TypeDescriptorExtractor::new(&catalog)
            .extract("Child", vec![])
            .unwrap();

        let finals: Vec<_> = descriptor.final_methods().map(|m| m.name()).collect();
        assert_eq!(finals, vec!["id"]);
        assert_eq!(descriptor.interceptable_methods().count(), 3);
    }

    #[test]
    fn test_extract_interface() {
        let catalog = catalog();
        let descriptor = TypeDescriptorExtractor::new(&catalog)
            .extract("Greeter", vec![])
            .unwrap();
        assert!(descriptor.is_interface());
        assert!(descriptor.methods().iter().all(|m| m.is_abstract()));
    }

    #[test]
    fn test_extract_unknown_type() {
        let catalog = catalog();
        let result = TypeDescriptorExtractor::new(&catalog).extract("Unknown", vec![]);
        assert_eq!(result.unwrap_err(), ReflectError::NotFound("Unknown".to_string()));
    }
}
