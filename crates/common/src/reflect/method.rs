use std::fmt;

use crate::{DeclaredType, reflect::ParameterDescriptor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Where a method was declared, kept for diagnostics
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Signature and modifiers of a single method
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDescriptor {
    name: String,
    declaring_type: String,
    visibility: Visibility,
    is_static: bool,
    is_abstract: bool,
    is_final: bool,
    returns_reference: bool,
    return_type: Option<DeclaredType>,
    parameters: Vec<ParameterDescriptor>,
    doc_comment: Option<String>,
    location: Option<SourceLocation>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            declaring_type: String::new(),
            visibility,
            is_static: false,
            is_abstract: false,
            is_final: false,
            returns_reference: false,
            return_type: None,
            parameters: Vec::new(),
            doc_comment: None,
            location: None,
        }
    }

    pub fn public(name: impl Into<String>) -> Self {
        Self::new(name, Visibility::Public)
    }

    pub fn protected(name: impl Into<String>) -> Self {
        Self::new(name, Visibility::Protected)
    }

    pub fn private(name: impl Into<String>) -> Self {
        Self::new(name, Visibility::Private)
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub(crate) fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn returning_reference(mut self) -> Self {
        self.returns_reference = true;
        self
    }

    pub fn returns(mut self, return_type: DeclaredType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Appends a parameter at the next position
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        let position = self.parameters.len();
        self.parameters.push(parameter.at_position(position));
        self
    }

    pub fn doc(mut self, comment: impl Into<String>) -> Self {
        self.doc_comment = Some(comment.into());
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }

    pub(crate) fn declared_by(mut self, type_name: &str) -> Self {
        self.declaring_type = type_name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_protected(&self) -> bool {
        self.visibility == Visibility::Protected
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn returns_reference(&self) -> bool {
        self.returns_reference
    }

    pub fn return_type(&self) -> Option<&DeclaredType> {
        self.return_type.as_ref()
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.as_ref().is_some_and(DeclaredType::is_void)
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn parameter(&self, position: usize) -> Option<&ParameterDescriptor> {
        self.parameters.get(position)
    }

    pub fn required_parameter_count(&self) -> usize {
        self.parameters.iter().filter(|p| !p.is_optional()).count()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Final and private methods keep their original body on a mock
    pub fn is_interceptable(&self) -> bool {
        !self.is_final && self.visibility != Visibility::Private
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_final {
            f.write_str("final ")?;
        }
        if self.is_abstract {
            f.write_str("abstract ")?;
        }
        write!(f, "{} ", self.visibility)?;
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str("function ")?;
        if self.returns_reference {
            f.write_str("&")?;
        }
        write!(f, "{}::{}(", self.declaring_type, self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parameter}")?;
        }
        f.write_str(")")?;
        if let Some(return_type) = &self.return_type {
            write!(f, ": {return_type}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_are_positioned_in_order() {
        let method = MethodDescriptor::public("register")
            .param(ParameterDescriptor::typed("email", DeclaredType::named("string")))
            .param(ParameterDescriptor::new("name").with_default(crate::Value::Null))
            .param(ParameterDescriptor::new("tags").variadic());

        let positions: Vec<_> = method.parameters().iter().map(|p| p.position()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(method.required_parameter_count(), 1);
        assert!(method.parameter(2).unwrap().is_optional());
    }

    #[test]
    fn test_display_signature() {
        let method = MethodDescriptor::public("sendEmail")
            .declared_by("UserService")
            .param(ParameterDescriptor::typed("email", DeclaredType::named("string")))
            .returns(DeclaredType::named("string"));

        assert_eq!(
            method.to_string(),
            "public function UserService::sendEmail(string $email): string"
        );
    }

    #[test]
    fn test_interceptable() {
        assert!(MethodDescriptor::public("a").is_interceptable());
        assert!(MethodDescriptor::protected("b").is_interceptable());
        assert!(!MethodDescriptor::private("c").is_interceptable());
        assert!(!MethodDescriptor::public("d").as_final().is_interceptable());
    }
}
