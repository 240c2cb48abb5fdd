use std::{fmt, str::FromStr};

use crate::ReflectError;

/// A declared parameter or return type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    Named(String),
    Nullable(Box<DeclaredType>),
    Union(Vec<DeclaredType>),
    Intersection(Vec<DeclaredType>),
}

impl DeclaredType {
    pub fn named(name: impl Into<String>) -> Self {
        DeclaredType::Named(name.into())
    }

    /// The concrete type name used when synthesizing a default value.
    /// Unions and intersections resolve to their first declared member,
    /// a nullable modifier resolves to the wrapped type.
    pub fn primary_name(&self) -> &str {
        match self {
            DeclaredType::Named(name) => name,
            DeclaredType::Nullable(inner) => inner.primary_name(),
            DeclaredType::Union(members) | DeclaredType::Intersection(members) => members
                .first()
                .map(DeclaredType::primary_name)
                .unwrap_or("mixed"),
        }
    }

    pub fn allows_null(&self) -> bool {
        match self {
            DeclaredType::Named(name) => {
                matches!(name.to_ascii_lowercase().as_str(), "null" | "mixed")
            }
            DeclaredType::Nullable(_) => true,
            DeclaredType::Union(members) => members.iter().any(DeclaredType::allows_null),
            DeclaredType::Intersection(_) => false,
        }
    }

    /// `void` and `never` both produce no value
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            DeclaredType::Named(name)
                if name.eq_ignore_ascii_case("void") || name.eq_ignore_ascii_case("never")
        )
    }

    /// Compares against a textual declaration after normalizing both sides
    pub fn matches(&self, declaration: &str) -> bool {
        match declaration.parse::<DeclaredType>() {
            Ok(other) => self.to_string().eq_ignore_ascii_case(&other.to_string()),
            Err(_) => false,
        }
    }

    fn parse_single(text: &str) -> Result<Self, ReflectError> {
        let name = text.trim();
        if let Some(inner) = name.strip_prefix('?') {
            return Ok(DeclaredType::Nullable(Box::new(Self::parse_single(inner)?)));
        }
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\');
        if !valid {
            return Err(ReflectError::InvalidTypeDeclaration(text.to_string()));
        }
        Ok(DeclaredType::Named(name.to_string()))
    }
}

impl FromStr for DeclaredType {
    type Err = ReflectError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.contains('|') {
            let members = text
                .split('|')
                .map(Self::parse_single)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(DeclaredType::Union(members));
        }
        if text.contains('&') {
            let members = text
                .split('&')
                .map(Self::parse_single)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(DeclaredType::Intersection(members));
        }
        Self::parse_single(text)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Named(name) => f.write_str(name),
            DeclaredType::Nullable(inner) => write!(f, "?{inner}"),
            DeclaredType::Union(members) | DeclaredType::Intersection(members) => {
                let separator = if matches!(self, DeclaredType::Union(_)) {
                    "|"
                } else {
                    "&"
                };
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("int".parse::<DeclaredType>().unwrap(), DeclaredType::named("int"));
        assert_eq!(
            "?string".parse::<DeclaredType>().unwrap(),
            DeclaredType::Nullable(Box::new(DeclaredType::named("string")))
        );
        assert_eq!(
            "int|string".parse::<DeclaredType>().unwrap(),
            DeclaredType::Union(vec![DeclaredType::named("int"), DeclaredType::named("string")])
        );
        assert_eq!(
            "Countable&Traversable".parse::<DeclaredType>().unwrap(),
            DeclaredType::Intersection(vec![
                DeclaredType::named("Countable"),
                DeclaredType::named("Traversable")
            ])
        );
        assert!("int|".parse::<DeclaredType>().is_err());
        assert!("in t".parse::<DeclaredType>().is_err());
    }

    #[test]
    fn test_primary_name_resolution() {
        let union: DeclaredType = "float|int".parse().unwrap();
        assert_eq!(union.primary_name(), "float");

        let intersection: DeclaredType = "Countable&Traversable".parse().unwrap();
        assert_eq!(intersection.primary_name(), "Countable");

        // Nullable adds null as eligible but keeps the concrete default
        let nullable: DeclaredType = "?bool".parse().unwrap();
        assert_eq!(nullable.primary_name(), "bool");
        assert!(nullable.allows_null());
    }

    #[test]
    fn test_void_and_never_produce_no_value() {
        assert!(DeclaredType::named("void").is_void());
        assert!(DeclaredType::named("never").is_void());
        assert!(DeclaredType::named("Never").is_void());
        assert!(!DeclaredType::named("null").is_void());
        assert!(!"?string".parse::<DeclaredType>().unwrap().is_void());
    }

    #[test]
    fn test_allows_null() {
        assert!("int|null".parse::<DeclaredType>().unwrap().allows_null());
        assert!("mixed".parse::<DeclaredType>().unwrap().allows_null());
        assert!(!"int".parse::<DeclaredType>().unwrap().allows_null());
    }

    #[test]
    fn test_matches_normalizes() {
        let declared: DeclaredType = "?String".parse().unwrap();
        assert!(declared.matches("?string"));
        assert!(declared.matches(" ?string "));
        assert!(!declared.matches("string"));
    }
}
