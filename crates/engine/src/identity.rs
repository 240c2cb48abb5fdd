use std::fmt;

use uuid::Uuid;

/// Unique identity of one synthesized mock type. Every registry and ledger
/// entry is keyed by it, so two mocks of the same target never share state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockId(Uuid);

impl MockId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Name of the synthesized type for `target`
    pub fn type_name_for(&self, target: &str) -> String {
        format!("{}_Mock_{}", target.replace('\\', "_"), self.0.simple())
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

pub(crate) type MockKey = (MockId, String);

pub(crate) fn key(id: MockId, method: &str) -> MockKey {
    (id, method.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let first = MockId::generate();
        let second = MockId::generate();
        assert_ne!(first, second);
        assert_ne!(first.type_name_for("UserService"), second.type_name_for("UserService"));
    }

    #[test]
    fn test_type_name_is_namespace_safe() {
        let id = MockId::generate();
        let name = id.type_name_for("App\\Service\\Mailer");
        assert!(name.starts_with("App_Service_Mailer_Mock_"));
        assert!(name.ends_with(&id.to_string()));
    }
}
