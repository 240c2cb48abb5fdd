use std::collections::HashMap;

use unitmock_common::{Callable, DeclaredType, EngineConfig, ResourceHandle, Value};

/// Outcome of default-value synthesis for a declared return type
#[derive(Clone, Debug, PartialEq)]
pub enum Synthesized {
    /// The method returns nothing
    Void,
    Value(Value),
    /// The receiver itself, or a fresh instance of it for static calls
    SelfInstance,
    /// A minimal empty stand-in for the named type, when the type is known
    Subtype(String),
}

/// Maps declared types to deterministic default values.
///
/// Lookup order: `void`/`never`, then a default bound to the method name,
/// then a custom default for the type name, then the built-in sentinel.
#[derive(Clone, Debug)]
pub struct DataTypeMock {
    custom: HashMap<String, Value>,
    bound: HashMap<String, Value>,
    callable: Callable,
}

impl Default for DataTypeMock {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTypeMock {
    pub fn new() -> Self {
        Self {
            custom: HashMap::new(),
            bound: HashMap::new(),
            callable: Callable::new(|_| Ok(Value::from("called"))),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut data_types = Self::new();
        for (type_name, value) in config.default_value_overrides() {
            data_types = data_types.with_custom_default(type_name, value);
        }
        for (method, value) in config.bound_default_overrides() {
            data_types = data_types.with_bound_default(method, value);
        }
        data_types
    }

    /// Replaces the default for every method returning `type_name`
    pub fn with_custom_default(mut self, type_name: &str, value: impl Into<Value>) -> Self {
        self.custom.insert(normalize(type_name), value.into());
        self
    }

    /// Replaces the default for one method name, whatever its return type.
    /// Method names match case-insensitively.
    pub fn with_bound_default(mut self, method: &str, value: impl Into<Value>) -> Self {
        self.bound.insert(method.to_ascii_lowercase(), value.into());
        self
    }

    /// Default for a declared return type. Untyped methods produce null.
    pub fn value_for(&self, declared: Option<&DeclaredType>, method: Option<&str>) -> Synthesized {
        match declared {
            Some(declared) => self.value_for_name(declared.primary_name(), method),
            None => self.value_for_name("mixed", method),
        }
    }

    pub fn value_for_name(&self, type_name: &str, method: Option<&str>) -> Synthesized {
        let normalized = normalize(type_name);
        if matches!(normalized.as_str(), "void" | "never") {
            return Synthesized::Void;
        }
        if let Some(value) = method.and_then(|m| self.bound.get(&m.to_ascii_lowercase())) {
            return Synthesized::Value(value.clone());
        }
        if let Some(value) = self.custom.get(&normalized) {
            return Synthesized::Value(value.clone());
        }
        self.builtin(type_name, &normalized)
    }

    fn builtin(&self, type_name: &str, normalized: &str) -> Synthesized {
        let value = match normalized {
            "int" | "integer" => Value::Int(123_456),
            "float" | "double" => Value::Float(123.456),
            "string" => Value::from("mockString"),
            "bool" | "boolean" | "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "array" | "list" => Value::List(vec![Value::from("item")]),
            "map" | "object" | "stdclass" => Value::Map(Default::default()),
            "resource" => Value::Resource(ResourceHandle::memory_stream()),
            "callable" | "closure" => Value::Callable(self.callable.clone()),
            "iterable" => Value::List(vec![Value::from("a"), Value::from("b")]),
            "null" | "mixed" => Value::Null,
            "self" | "static" => return Synthesized::SelfInstance,
            _ => return Synthesized::Subtype(type_name.trim_start_matches('\\').to_string()),
        };
        Synthesized::Value(value)
    }
}

fn normalize(type_name: &str) -> String {
    type_name.trim().trim_start_matches('\\').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(text: &str) -> DeclaredType {
        text.parse().unwrap()
    }

    #[test]
    fn test_builtin_sentinels() {
        let data_types = DataTypeMock::new();
        let value = |t: &str| data_types.value_for_name(t, None);

        assert_eq!(value("int"), Synthesized::Value(Value::Int(123_456)));
        assert_eq!(value("float"), Synthesized::Value(Value::Float(123.456)));
        assert_eq!(value("string"), Synthesized::Value(Value::from("mockString")));
        assert_eq!(value("bool"), Synthesized::Value(Value::Bool(true)));
        assert_eq!(value("false"), Synthesized::Value(Value::Bool(false)));
        assert_eq!(value("array"), Synthesized::Value(Value::List(vec!["item".into()])));
        assert_eq!(value("map"), Synthesized::Value(Value::Map(Default::default())));
        assert_eq!(
            value("resource"),
            Synthesized::Value(Value::Resource(ResourceHandle::memory_stream()))
        );
        assert_eq!(
            value("iterable"),
            Synthesized::Value(Value::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(value("mixed"), Synthesized::Value(Value::Null));
        assert_eq!(value("void"), Synthesized::Void);
        assert_eq!(value("static"), Synthesized::SelfInstance);
        assert_eq!(value("\\App\\Mailer"), Synthesized::Subtype("App\\Mailer".to_string()));
    }

    #[test]
    fn test_callable_default_is_stable() {
        let data_types = DataTypeMock::new();
        let first = data_types.value_for_name("callable", None);
        let second = data_types.value_for_name("callable", None);
        assert_eq!(first, second);

        let Synthesized::Value(Value::Callable(callable)) = first else {
            panic!("expected a callable default");
        };
        assert_eq!(callable.invoke(vec![]).unwrap(), Value::from("called"));
    }

    #[test]
    fn test_declared_type_resolution() {
        let data_types = DataTypeMock::new();
        assert_eq!(
            data_types.value_for(Some(&declared("string|int")), None),
            Synthesized::Value(Value::from("mockString"))
        );
        assert_eq!(
            data_types.value_for(Some(&declared("?int")), None),
            Synthesized::Value(Value::Int(123_456))
        );
        assert_eq!(
            data_types.value_for(Some(&declared("Countable&Traversable")), None),
            Synthesized::Subtype("Countable".to_string())
        );
        assert_eq!(data_types.value_for(None, None), Synthesized::Value(Value::Null));
    }

    #[test]
    fn test_bound_default_wins_over_custom() {
        let data_types = DataTypeMock::new()
            .with_custom_default("string", "global")
            .with_bound_default("getName", "bound");

        assert_eq!(
            data_types.value_for_name("string", Some("getName")),
            Synthesized::Value(Value::from("bound"))
        );
        assert_eq!(
            data_types.value_for_name("String", Some("other")),
            Synthesized::Value(Value::from("global"))
        );
        // void never produces a value, even with a bound default
        assert_eq!(data_types.value_for_name("void", Some("getName")), Synthesized::Void);
    }

    #[test]
    fn test_bound_default_ignores_method_name_case() {
        let data_types = DataTypeMock::new().with_bound_default("getfromemail", "lowered");

        assert_eq!(
            data_types.value_for_name("string", Some("getFromEmail")),
            Synthesized::Value(Value::from("lowered"))
        );
        assert_eq!(
            data_types.value_for_name("string", Some("GETFROMEMAIL")),
            Synthesized::Value(Value::from("lowered"))
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = EngineConfig::default();
        config
            .default_values
            .insert("int".to_string(), serde_json::json!(42));
        config
            .bound_default_values
            .insert("label".to_string(), serde_json::json!("from-config"));

        let data_types = DataTypeMock::from_config(&config);
        assert_eq!(data_types.value_for_name("int", None), Synthesized::Value(Value::Int(42)));
        assert_eq!(
            data_types.value_for_name("string", Some("label")),
            Synthesized::Value(Value::from("from-config"))
        );
    }
}
