use std::sync::Arc;

use crate::{
    CallFrame, DeclaredType, Exception, Value,
    reflect::{ClassDefinition, MethodDescriptor, ParameterDescriptor, TypeCatalog},
};

pub const MAILER_INTERFACE: &str = "MailerInterface";
pub const MAILER: &str = "Mailer";
pub const USER_SERVICE: &str = "UserService";
pub const LOGGER_INTERFACE: &str = "LoggerInterface";
pub const SHAPE: &str = "Shape";
pub const DYNAMIC_PROXY: &str = "DynamicProxy";
pub const WAREHOUSE: &str = "Warehouse";

fn ty(name: &str) -> DeclaredType {
    DeclaredType::named(name)
}

fn parsed(declaration: &str) -> DeclaredType {
    declaration
        .parse()
        .expect("fixture type declarations are valid")
}

fn mailer_interface() -> ClassDefinition {
    ClassDefinition::interface(MAILER_INTERFACE)
        .abstract_method(
            MethodDescriptor::public("send")
                .param(ParameterDescriptor::typed("to", ty("string")))
                .param(ParameterDescriptor::typed("body", ty("string")))
                .returns(ty("bool")),
        )
        .abstract_method(MethodDescriptor::public("getFromEmail").returns(ty("string")))
}

fn mailer() -> ClassDefinition {
    ClassDefinition::class(MAILER)
        .implements(MAILER_INTERFACE)
        .constructor(
            vec![ParameterDescriptor::typed("from", ty("string")).with_default("noreply@example.com")],
            |frame| {
                let from = match frame.arg(0) {
                    Value::Null => Value::from("noreply@example.com"),
                    from => from,
                };
                frame.this.set_property("from", from);
                frame.this.set_property("sent", Value::List(vec![]));
                Ok(())
            },
        )
        .method(
            MethodDescriptor::public("send")
                .param(ParameterDescriptor::typed("to", ty("string")))
                .param(ParameterDescriptor::typed("body", ty("string")))
                .returns(ty("bool")),
            |frame| {
                let mut sent = match frame.this.property("sent") {
                    Some(Value::List(items)) => items,
                    _ => Vec::new(),
                };
                sent.push(frame.arg(0));
                frame.this.set_property("sent", Value::List(sent));
                Ok(true.into())
            },
        )
        .method(MethodDescriptor::public("getFromEmail").returns(ty("string")), |frame| {
            Ok(frame.this.property("from").unwrap_or_default())
        })
        .method(
            MethodDescriptor::public("addFromEmail")
                .param(ParameterDescriptor::typed("email", ty("string")))
                .param(ParameterDescriptor::typed("name", ty("string")).with_default(""))
                .returns(ty("self")),
            |frame| {
                frame.this.set_property("from", frame.arg(0));
                Ok(Value::Object(frame.this.clone()))
            },
        )
        .method(
            MethodDescriptor::public("shared").as_static().returns(ty("self")),
            |frame| Ok(Value::Object(frame.this.clone())),
        )
}

fn user_service() -> ClassDefinition {
    ClassDefinition::class(USER_SERVICE)
        .constructor(
            vec![ParameterDescriptor::typed("mailer", ty(MAILER_INTERFACE))],
            |frame| {
                frame.this.set_property("mailer", frame.arg(0));
                frame.this.set_property("next_id", Value::Int(1));
                Ok(())
            },
        )
        .method(
            MethodDescriptor::public("sendEmail")
                .param(ParameterDescriptor::typed("email", ty("string")))
                .returns(ty("string"))
                .doc("/** Sends a message to the given address */")
                .at("src/UserService.php", 24),
            |frame| {
                let email = frame.arg(0);
                if !frame.call_this("isValidEmail", vec![email.clone()])?.is_truthy() {
                    return Err(Exception::new("InvalidArgumentException", "Invalid email").into());
                }
                Ok(format!("email:{}", email.as_str().unwrap_or_default()).into())
            },
        )
        .method(
            MethodDescriptor::public("isValidEmail")
                .param(ParameterDescriptor::typed("email", ty("string")))
                .returns(ty("bool"))
                .at("src/UserService.php", 36),
            |frame| {
                let email = frame.arg(0);
                let valid = email
                    .as_str()
                    .and_then(|e| e.split_once('@'))
                    .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
                Ok(valid.into())
            },
        )
        .method(
            MethodDescriptor::public("getName").as_final().returns(ty("string")),
            |_| Ok("user-service".into()),
        )
        .method(
            MethodDescriptor::public("getMailer").returns(ty(MAILER_INTERFACE)),
            |frame| Ok(frame.this.property("mailer").unwrap_or_default()),
        )
        .method(
            MethodDescriptor::public("register")
                .param(ParameterDescriptor::typed("email", ty("string")))
                .param(ParameterDescriptor::typed("name", parsed("?string")).with_default(Value::Null))
                .param(ParameterDescriptor::typed("tags", ty("string")).variadic())
                .returns(ty("array")),
            |frame| Ok(Value::List(frame.args.clone())),
        )
        .method(
            MethodDescriptor::public("notify")
                .param(ParameterDescriptor::typed("message", ty("string")))
                .param(ParameterDescriptor::typed("delivered", ty("bool")).by_reference())
                .returns(ty("void")),
            |frame| {
                frame.this.set_property("last_notice", frame.arg(0));
                Ok(Value::Null)
            },
        )
        .method(MethodDescriptor::public("nextId").returns(ty("int")), |frame| {
            let id = frame.this.property("next_id").and_then(|v| v.as_int()).unwrap_or(1);
            frame.this.set_property("next_id", Value::Int(id + 1));
            Ok(Value::Int(id))
        })
        .method(
            MethodDescriptor::protected("formatName")
                .param(ParameterDescriptor::typed("name", ty("string")))
                .returns(ty("string")),
            |frame| Ok(frame.arg(0).as_str().unwrap_or_default().to_uppercase().into()),
        )
        .method(MethodDescriptor::private("secret").returns(ty("string")), |_| {
            Ok("s3cret".into())
        })
}

fn logger_interface() -> ClassDefinition {
    ClassDefinition::interface(LOGGER_INTERFACE)
        .abstract_method(
            MethodDescriptor::public("log")
                .param(ParameterDescriptor::typed("message", ty("string")))
                .param(ParameterDescriptor::typed("context", ty("array")).with_default(Value::List(vec![])))
                .returns(ty("void")),
        )
        .abstract_method(
            MethodDescriptor::public("withContext")
                .param(ParameterDescriptor::typed("context", ty("array")))
                .returns(ty("static")),
        )
        .abstract_method(MethodDescriptor::public("level").returns(parsed("?string")))
}

fn shape() -> ClassDefinition {
    ClassDefinition::abstract_class(SHAPE)
        .abstract_method(MethodDescriptor::public("area").returns(ty("float")))
        .method(MethodDescriptor::public("describe").returns(ty("string")), |frame| {
            let area = frame.call_this("area", vec![])?;
            Ok(format!("shape with area {area}").into())
        })
}

fn dynamic_proxy() -> ClassDefinition {
    ClassDefinition::class(DYNAMIC_PROXY)
        .method(MethodDescriptor::public("describe").returns(ty("string")), |_| {
            Ok("dynamic".into())
        })
        .catch_all(|frame: &CallFrame, name: &str| {
            Ok(format!("dynamic:{name}({})", frame.args.len()).into())
        })
}

fn warehouse() -> ClassDefinition {
    let returning = |name: &str, declaration: &str| {
        MethodDescriptor::public(name).returns(parsed(declaration))
    };
    ClassDefinition::interface(WAREHOUSE)
        .abstract_method(returning("count", "int|string"))
        .abstract_method(returning("ratio", "float"))
        .abstract_method(returning("label", "string"))
        .abstract_method(returning("isOpen", "bool"))
        .abstract_method(returning("isClosed", "false"))
        .abstract_method(returning("items", "array"))
        .abstract_method(returning("snapshot", "map"))
        .abstract_method(returning("meta", "object"))
        .abstract_method(returning("handle", "resource"))
        .abstract_method(returning("filter", "callable"))
        .abstract_method(returning("cursor", "iterable"))
        .abstract_method(returning("nothing", "null"))
        .abstract_method(returning("anything", "mixed"))
        .abstract_method(returning("reset", "void"))
        .abstract_method(returning("halt", "never"))
        .abstract_method(returning("supplier", MAILER_INTERFACE))
        .abstract_method(returning("vendor", "Vendor\\Missing"))
        .abstract_method(returning("collection", "Countable&Traversable"))
        .abstract_method(returning("maybeLabel", "?string"))
        .abstract_method(MethodDescriptor::public("untyped"))
}

/// Catalog holding every fixture type
pub fn fixture_catalog() -> Arc<TypeCatalog> {
    let catalog = TypeCatalog::new()
        .with_type(mailer_interface())
        .and_then(|c| c.with_type(mailer()))
        .and_then(|c| c.with_type(user_service()))
        .and_then(|c| c.with_type(logger_interface()))
        .and_then(|c| c.with_type(shape()))
        .and_then(|c| c.with_type(dynamic_proxy()))
        .and_then(|c| c.with_type(warehouse()))
        .expect("fixture types register cleanly");
    Arc::new(catalog)
}
